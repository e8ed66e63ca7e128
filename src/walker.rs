use crate::archive::{Container, MimePart};
use crate::classify;
use crate::config::{ArchiveConfig, FailurePolicy, UrlResolution};
use crate::error::{ArchiveError, Result};
use crate::fetchers::{Fetched, Fetcher};
use crate::parsers::{self, Extractor, MarkupType, Reference, ReferenceKind};
use crate::registry::{Admission, VisitedSet};
use crate::resolver;
use futures::FutureExt;
use futures::future::{BoxFuture, join_all};
use std::sync::Arc;
use tokio::sync::{Mutex, Semaphore};
use url::Url;

/// State of one retrieval: configuration, fetcher, visited URLs and fetch permits
pub struct Session {
    config: ArchiveConfig,
    fetcher: Arc<dyn Fetcher>,
    visited: VisitedSet,
    permits: Semaphore,
    failures: Mutex<Vec<String>>,
}

/// Base URLs in effect while scanning one resource
#[derive(Debug, Clone)]
struct Scope {
    /// URL of the nearest enclosing HTML document
    document: String,
    /// URL references in the current resource are joined against
    resource: String,
}

impl Scope {
    fn document(url: &str) -> Self {
        Self {
            document: url.to_string(),
            resource: url.to_string(),
        }
    }

    fn stylesheet(&self, url: &str) -> Self {
        Self {
            document: self.document.clone(),
            resource: url.to_string(),
        }
    }

    /// Base for relative references under the given resolution mode
    fn base(&self, mode: UrlResolution) -> &str {
        match mode {
            UrlResolution::Join => &self.resource,
            UrlResolution::Concat => &self.document,
        }
    }
}

impl Session {
    pub fn new(config: ArchiveConfig, fetcher: Arc<dyn Fetcher>) -> Self {
        let visited = VisitedSet::with_limit(config.max_resources);
        let permits = Semaphore::new(config.effective_concurrency());
        Self {
            config,
            fetcher,
            visited,
            permits,
            failures: Mutex::new(Vec::new()),
        }
    }

    pub fn config(&self) -> &ArchiveConfig {
        &self.config
    }

    /// URLs left out of the archive because they could not be fetched
    pub async fn failed_urls(&self) -> Vec<String> {
        self.failures.lock().await.clone()
    }

    /// Fetches the root page and everything it transitively references.
    ///
    /// Failing to fetch the root page is always fatal.
    pub async fn retrieve(&self) -> Result<Container> {
        let root_url = Url::parse(&self.config.url)
            .map_err(|e| ArchiveError::InvalidUrl(format!("{}: {}", self.config.url, e)))?;
        let root_url = resolver::normalize_url(&root_url).to_string();

        ::log::info!("Saving page {}", root_url);
        let start_time = std::time::Instant::now();

        let root = self.fetch(&root_url).await?;
        self.visited.mark_if_new(&root.url).await;

        let title = parsers::decode_markup(&root.url, &root.bytes, root.charset())
            .ok()
            .and_then(|text| parsers::html::title(&text))
            .unwrap_or_default();

        let parts = self.walk_document(root, 0).await?;

        let mut container = Container::new(title);
        container.extend(parts);

        ::log::info!(
            "Collected {} parts in {:.2} seconds",
            container.len(),
            start_time.elapsed().as_secs_f64()
        );
        Ok(container)
    }

    /// Attaches an HTML document, then everything it references
    fn walk_document(&self, fetched: Fetched, depth: usize) -> BoxFuture<'_, Result<Vec<MimePart>>> {
        async move {
            let scope = Scope::document(&fetched.url);
            let references = Extractor::extract_from_bytes(
                &fetched.url,
                &fetched.bytes,
                fetched.charset(),
                MarkupType::Html,
            );
            ::log::info!("Found {} references in {}", references.len(), fetched.url);

            let mut parts = vec![classify::classify_document(fetched)];
            parts.extend(self.dispatch_all(&scope, references, depth + 1).await?);
            Ok(parts)
        }
        .boxed()
    }

    /// Admits the references of one resource, then fetches them concurrently.
    ///
    /// Parts come back in discovery order, each followed by its own subtree.
    async fn dispatch_all(
        &self,
        scope: &Scope,
        references: Vec<Reference>,
        depth: usize,
    ) -> Result<Vec<MimePart>> {
        if references.is_empty() {
            return Ok(Vec::new());
        }

        if let Some(max_depth) = self.config.max_depth {
            if depth > max_depth {
                ::log::info!(
                    "Depth limit {} reached, skipping {} references from {}",
                    max_depth,
                    references.len(),
                    scope.resource
                );
                return Ok(Vec::new());
            }
        }

        let mode = self.config.url_resolution;
        let mut admitted = Vec::new();
        for reference in references {
            let Some(url) = resolver::resolve(scope.base(mode), &reference.url, mode) else {
                continue;
            };

            match self.visited.admit(&url).await {
                Admission::New => admitted.push((reference.kind, url)),
                Admission::Seen => {
                    ::log::debug!("Skipping already scheduled resource: {}", url);
                }
                Admission::LimitReached => {
                    ::log::warn!("Resource limit reached, not saving {}", url);
                }
            }
        }

        let subtrees = join_all(
            admitted
                .into_iter()
                .map(|(kind, url)| self.dispatch(scope, kind, url, depth)),
        )
        .await;

        let mut parts = Vec::new();
        for subtree in subtrees {
            parts.extend(subtree?);
        }
        Ok(parts)
    }

    /// Fetches one admitted resource and hands it to the matching classifier
    fn dispatch<'a>(
        &'a self,
        scope: &'a Scope,
        kind: ReferenceKind,
        url: String,
        depth: usize,
    ) -> BoxFuture<'a, Result<Vec<MimePart>>> {
        async move {
            let fetched = match self.fetch(&url).await {
                Ok(fetched) => fetched,
                Err(e) => return self.handle_failure(e).await,
            };

            match kind {
                ReferenceKind::Image => Ok(vec![classify::classify_image(fetched)]),
                ReferenceKind::Script => Ok(vec![classify::classify_script(fetched)]),
                ReferenceKind::Stylesheet => {
                    let (part, css) = classify::classify_stylesheet(fetched);
                    let nested = Extractor::extract(&css, MarkupType::Css);
                    let scope = scope.stylesheet(part.location());

                    let mut parts = vec![part];
                    parts.extend(self.dispatch_all(&scope, nested, depth + 1).await?);
                    Ok(parts)
                }
                ReferenceKind::Frame => self.walk_document(fetched, depth).await,
            }
        }
        .boxed()
    }

    /// Fetches under a concurrency permit, released before any recursion
    async fn fetch(&self, url: &str) -> Result<Fetched> {
        let _permit = self.permits.acquire().await.map_err(|e| ArchiveError::Fetch {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        ::log::info!("Fetching {}", url);
        self.fetcher.fetch(url).await
    }

    /// Applies the failure policy to a subsidiary resource error
    async fn handle_failure(&self, error: ArchiveError) -> Result<Vec<MimePart>> {
        match self.config.on_error {
            FailurePolicy::Abort => {
                ::log::error!("{}; aborting retrieval", error);
                Err(error)
            }
            FailurePolicy::Skip => {
                ::log::warn!("{}; leaving it out of the archive", error);
                if let ArchiveError::Fetch { url, .. } | ArchiveError::Status { url, .. } = &error {
                    self.failures.lock().await.push(url.clone());
                }
                Ok(Vec::new())
            }
        }
    }
}
