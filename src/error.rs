use thiserror::Error;

/// Errors raised while building a page archive
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// The resource could not be retrieved (connection, timeout, body read)
    #[error("failed to fetch {url}: {reason}")]
    Fetch { url: String, reason: String },

    /// The server answered with a non-success status
    #[error("fetching {url} returned status {status}")]
    Status { url: String, status: u16 },

    /// A URL could not be parsed or resolved
    #[error("invalid URL {0}")]
    InvalidUrl(String),

    /// Markup could not be scanned for references
    #[error("could not parse {url}: {reason}")]
    Parse { url: String, reason: String },

    /// A resource could not be given a MIME type
    #[error("could not classify {0}")]
    Classification(String),

    /// Configuration could not be loaded
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ArchiveError {
    /// Whether this error came from retrieving a single resource
    pub fn is_fetch_failure(&self) -> bool {
        matches!(self, ArchiveError::Fetch { .. } | ArchiveError::Status { .. })
    }
}

impl From<serde_json::Error> for ArchiveError {
    fn from(e: serde_json::Error) -> Self {
        ArchiveError::Config(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ArchiveError>;
