// Re-export modules
pub mod archive;
pub mod classify;
pub mod config;
pub mod encoding;
pub mod error;
pub mod fetchers;
pub mod parsers;
pub mod registry;
pub mod resolver;
pub mod utils;
pub mod walker;

// Re-export commonly used types for convenience
pub use archive::{Container, MimePart, PartKind};
pub use config::{ArchiveConfig, FailurePolicy, UrlResolution};
pub use error::{ArchiveError, Result};
pub use fetchers::{Fetched, Fetcher, HttpFetcher};

use std::path::{Path, PathBuf};
use std::sync::Arc;
use walker::Session;

/// A saved archive together with what was left out of it
#[derive(Debug)]
pub struct Retrieval {
    pub container: Container,
    /// Subsidiary resources that could not be fetched
    pub failed: Vec<String>,
}

/// Main builder for saving a page as a single MIME-HTML file
pub struct Snapshot {
    config: ArchiveConfig,
    fetcher: Option<Arc<dyn Fetcher>>,
}

impl Snapshot {
    /// Create a new Snapshot builder for the given page URL
    pub fn new(url: &str) -> Self {
        Self {
            config: ArchiveConfig::new(url),
            fetcher: None,
        }
    }

    /// Replace the configuration, keeping the current URL if the new one has none
    pub fn with_config(mut self, mut config: ArchiveConfig) -> Self {
        if config.url.is_empty() {
            config.url = std::mem::take(&mut self.config.url);
        }
        self.config = config;
        self
    }

    /// Load configuration from a file
    pub fn with_config_file(self, path: impl AsRef<Path>) -> Result<Self> {
        let config = ArchiveConfig::from_file(path)?;
        Ok(self.with_config(config))
    }

    /// Load configuration from a string
    pub fn with_config_str(self, config_str: &str) -> Result<Self> {
        let config = ArchiveConfig::from_json(config_str)?;
        Ok(self.with_config(config))
    }

    /// Set the maximum number of concurrent fetches
    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.config.max_concurrency = max_concurrency;
        self
    }

    /// Limit how deep references are followed below the root page
    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.config.max_depth = max_depth;
        self
    }

    /// Limit how many distinct resources are saved
    pub fn with_max_resources(mut self, max_resources: Option<usize>) -> Self {
        self.config.max_resources = max_resources;
        self
    }

    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.config.on_error = policy;
        self
    }

    pub fn with_url_resolution(mut self, resolution: UrlResolution) -> Self {
        self.config.url_resolution = resolution;
        self
    }

    /// Set the request timeout (`None` waits forever)
    pub fn with_timeout(mut self, timeout_seconds: Option<u64>) -> Self {
        self.config.request_timeout_secs = timeout_seconds;
        self
    }

    /// Write the archive to this path instead of `<title>.mht`
    pub fn with_output(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.output = Some(path.into());
        self
    }

    /// Use a custom fetcher instead of HTTP
    pub fn with_fetcher(mut self, fetcher: Arc<dyn Fetcher>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    pub fn config(&self) -> &ArchiveConfig {
        &self.config
    }

    /// Walk the page and collect every part, without writing anything
    pub async fn retrieve(self) -> Result<Retrieval> {
        let fetcher: Arc<dyn Fetcher> = match self.fetcher {
            Some(fetcher) => fetcher,
            None => Arc::new(HttpFetcher::new(&self.config)?),
        };

        let session = Session::new(self.config, fetcher);
        let container = session.retrieve().await?;
        let failed = session.failed_urls().await;
        Ok(Retrieval { container, failed })
    }

    /// Walk the page and write the archive, returning where it was written
    pub async fn save(self) -> Result<(PathBuf, Retrieval)> {
        let output = self.config.output.clone();
        let url = self.config.url.clone();
        let retrieval = self.retrieve().await?;

        let path = output
            .unwrap_or_else(|| utils::default_output_path(retrieval.container.title(), &url));
        retrieval.container.write_to(&path)?;
        Ok((path, retrieval))
    }
}
