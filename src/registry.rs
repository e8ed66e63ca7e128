use std::collections::HashSet;
use tokio::sync::Mutex;

/// Outcome of offering a URL to the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// First sighting, the caller owns fetching it
    New,
    /// Already scheduled by someone else
    Seen,
    /// Resource cap reached, the URL was not recorded
    LimitReached,
}

/// Set of absolute URLs already scheduled for fetch-and-attach.
///
/// Check-and-mark happens under one lock so concurrent walkers never
/// schedule the same URL twice.
#[derive(Debug, Default)]
pub struct VisitedSet {
    seen: Mutex<HashSet<String>>,
    limit: Option<usize>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry that refuses new URLs once `limit` have been admitted
    pub fn with_limit(limit: Option<usize>) -> Self {
        Self {
            seen: Mutex::new(HashSet::new()),
            limit,
        }
    }

    /// Records the URL and returns true the first time it is offered
    pub async fn mark_if_new(&self, url: &str) -> bool {
        self.admit(url).await == Admission::New
    }

    /// Checks the URL and marks it as visited if it is new and under the cap
    pub async fn admit(&self, url: &str) -> Admission {
        let mut seen = self.seen.lock().await;
        if seen.contains(url) {
            ::log::trace!("Skipping already scheduled: {}", url);
            return Admission::Seen;
        }
        if let Some(limit) = self.limit {
            if seen.len() >= limit {
                ::log::debug!("Resource limit of {} reached, dropping {}", limit, url);
                return Admission::LimitReached;
            }
        }
        seen.insert(url.to_string());
        Admission::New
    }

    pub async fn contains(&self, url: &str) -> bool {
        self.seen.lock().await.contains(url)
    }

    pub async fn len(&self) -> usize {
        self.seen.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.seen.lock().await.is_empty()
    }
}
