//! Pattern-based reference scanning for stylesheets.
//!
//! This is not a CSS parser. Only `@import url(...)` and
//! `background-image: url(...)` are recognised, and URL values are limited to
//! letters, digits and `-.:"/`. A value containing anything else (`?`, `#`,
//! `%`, `_`, `=`, whitespace, single quotes) is cut short at that character or
//! missed entirely, and `@import "x.css"` without `url()` is not seen at all.

use crate::parsers::{Reference, ReferenceKind};
use regex::Regex;
use std::sync::LazyLock;

static IMPORT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"@import\s*url\(([-":.0-9A-Za-z/]*)\)"#).unwrap());

static BACKGROUND_IMAGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"background-image:\s*url\(([-":.0-9A-Za-z/]*)\)"#).unwrap());

/// Extracts `@import` stylesheets followed by `background-image` images
pub fn extract_references(css: &str) -> Vec<Reference> {
    let mut references: Vec<Reference> = capture_urls(&IMPORT_RE, css)
        .map(|url| Reference::new(ReferenceKind::Stylesheet, url))
        .collect();

    references.extend(
        capture_urls(&BACKGROUND_IMAGE_RE, css)
            .map(|url| Reference::new(ReferenceKind::Image, url)),
    );

    ::log::debug!("CSS scanner found {} references", references.len());
    references
}

/// URLs captured by `re`, quotes stripped, empties dropped
fn capture_urls<'a>(re: &'a Regex, css: &'a str) -> impl Iterator<Item = &'a str> + 'a {
    re.captures_iter(css)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim_matches('"'))
        .filter(|url| !url.is_empty())
}
