use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

/// What to do when a subsidiary resource cannot be fetched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Log the failure, leave the resource out of the archive and keep walking
    #[default]
    Skip,
    /// Abandon the whole retrieval
    Abort,
}

/// How relative references are turned into absolute URLs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UrlResolution {
    /// Standard URL joining against the referencing resource
    #[default]
    Join,
    /// Document base URL and raw reference glued together as strings
    Concat,
}

/// Configuration for a single page retrieval
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiveConfig {
    /// URL of the page to save
    #[serde(default)]
    pub url: String,

    /// Where to write the archive (defaults to `<title>.mht`)
    #[serde(default)]
    pub output: Option<PathBuf>,

    /// Maximum number of requests in flight
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,

    /// Maximum reference depth below the root document
    #[serde(default)]
    pub max_depth: Option<usize>,

    /// Maximum number of distinct subsidiary resources
    #[serde(default)]
    pub max_resources: Option<usize>,

    /// Behaviour on a failed subsidiary fetch
    #[serde(default)]
    pub on_error: FailurePolicy,

    /// Relative reference resolution strategy
    #[serde(default)]
    pub url_resolution: UrlResolution,

    /// Per-request timeout in seconds, `None` waits forever
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: Option<u64>,

    /// User agent sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

/// Default value for max_concurrency
fn default_max_concurrency() -> usize {
    4
}

/// Default value for request_timeout_secs
fn default_request_timeout() -> Option<u64> {
    Some(30)
}

/// Default value for user_agent
fn default_user_agent() -> String {
    format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
}

impl ArchiveConfig {
    /// Create a new configuration with default values
    pub fn new(url: &str) -> Self {
        Self {
            url: url.to_string(),
            output: None,
            max_concurrency: default_max_concurrency(),
            max_depth: None,
            max_resources: None,
            on_error: FailurePolicy::default(),
            url_resolution: UrlResolution::default(),
            request_timeout_secs: default_request_timeout(),
            user_agent: default_user_agent(),
        }
    }

    /// Load configuration from a file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut file = File::open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;

        Self::from_json(&contents)
    }

    /// Load configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        Ok(config)
    }

    /// Number of concurrent fetches, never below one
    pub fn effective_concurrency(&self) -> usize {
        self.max_concurrency.max(1)
    }
}
