pub mod css;
pub mod html;
pub mod stylesheet;

#[cfg(test)]
mod tests;

use crate::error::{ArchiveError, Result};
use encoding_rs::{Encoding, UTF_16BE, UTF_16LE, UTF_8};
use std::borrow::Cow;

/// How many leading bytes are inspected when sniffing for binary content
const SNIFF_LEN: usize = 1024;

/// Kind of subsidiary resource a reference points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReferenceKind {
    /// `<img src>` or CSS `background-image`
    Image,
    /// `<link href>` or CSS `@import`
    Stylesheet,
    /// `<iframe src>`
    Frame,
    /// `<script src>`
    Script,
}

/// A reference discovered in markup, not yet resolved
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Reference {
    pub kind: ReferenceKind,
    /// The attribute or `url(...)` value exactly as written
    pub url: String,
}

impl Reference {
    pub fn new(kind: ReferenceKind, url: impl Into<String>) -> Self {
        Self {
            kind,
            url: url.into(),
        }
    }
}

/// Source language of a document being scanned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkupType {
    Html,
    Css,
}

/// Encoding named by a `charset` label, if the label is known
pub fn encoding_for(charset: Option<&str>) -> Option<&'static Encoding> {
    charset.and_then(|label| Encoding::for_label_no_replacement(label.trim().as_bytes()))
}

/// Decodes fetched bytes into text suitable for reference scanning.
///
/// Uses the declared charset (UTF-8 when absent or unknown), honours a BOM and
/// replaces malformed sequences. Content that looks binary is rejected.
pub fn decode_markup<'a>(
    url: &str,
    bytes: &'a [u8],
    charset: Option<&str>,
) -> Result<Cow<'a, str>> {
    let encoding = encoding_for(charset).unwrap_or(UTF_8);
    let head = &bytes[..bytes.len().min(SNIFF_LEN)];
    if encoding != UTF_16LE && encoding != UTF_16BE && head.contains(&0) {
        return Err(ArchiveError::Parse {
            url: url.to_string(),
            reason: "content looks binary".to_string(),
        });
    }
    let (text, _, _) = encoding.decode(bytes);
    Ok(text)
}

/// Reference extractor that delegates to the HTML or CSS scanner
pub struct Extractor;

impl Extractor {
    /// Extract references from already decoded text
    pub fn extract(text: &str, markup: MarkupType) -> Vec<Reference> {
        match markup {
            MarkupType::Html => html::extract_references(text),
            MarkupType::Css => css::extract_references(text),
        }
    }

    /// Extract references from fetched bytes, degrading to nothing on parse failure
    pub fn extract_from_bytes(
        url: &str,
        bytes: &[u8],
        charset: Option<&str>,
        markup: MarkupType,
    ) -> Vec<Reference> {
        match decode_markup(url, bytes, charset) {
            Ok(text) => Self::extract(&text, markup),
            Err(e) => {
                ::log::warn!("{}; no references extracted", e);
                Vec::new()
            }
        }
    }
}
