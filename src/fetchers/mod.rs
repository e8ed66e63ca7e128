pub mod http;

use crate::error::Result;
use async_trait::async_trait;

pub use http::HttpFetcher;

/// Raw bytes retrieved for one URL
#[derive(Debug, Clone)]
pub struct Fetched {
    /// URL the bytes were requested from
    pub url: String,
    /// Response body
    pub bytes: Vec<u8>,
    /// Content-Type declared by the server, if any
    pub content_type: Option<String>,
}

impl Fetched {
    pub fn new(url: impl Into<String>, bytes: Vec<u8>, content_type: Option<String>) -> Self {
        Self {
            url: url.into(),
            bytes,
            content_type,
        }
    }

    /// The `charset` parameter of the declared content type
    pub fn charset(&self) -> Option<&str> {
        let content_type = self.content_type.as_deref()?;
        content_type.split(';').skip(1).find_map(|param| {
            let (name, value) = param.split_once('=')?;
            if name.trim().eq_ignore_ascii_case("charset") {
                Some(value.trim().trim_matches('"'))
            } else {
                None
            }
        })
    }

    /// The declared media type without parameters, lowercased
    pub fn media_type(&self) -> Option<String> {
        let content_type = self.content_type.as_deref()?;
        let essence = content_type.split(';').next()?.trim();
        if essence.is_empty() {
            None
        } else {
            Some(essence.to_ascii_lowercase())
        }
    }
}

/// Retrieves resources for the archive walk
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch a single absolute URL, one attempt only
    async fn fetch(&self, url: &str) -> Result<Fetched>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_parameters() {
        let fetched = Fetched::new(
            "https://example.com/",
            Vec::new(),
            Some("Text/HTML; Charset=\"ISO-8859-1\"".to_string()),
        );
        assert_eq!(fetched.media_type().as_deref(), Some("text/html"));
        assert_eq!(fetched.charset(), Some("ISO-8859-1"));

        let bare = Fetched::new("https://example.com/a.png", Vec::new(), None);
        assert!(bare.media_type().is_none());
        assert!(bare.charset().is_none());
    }
}
