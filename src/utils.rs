use std::path::PathBuf;
use url::Url;

/// Extension given to saved archives
pub const ARCHIVE_EXTENSION: &str = "mht";

/// Longest file stem produced from a page title, in characters
const MAX_STEM_CHARS: usize = 100;

/// Convert a page title to a sanitized file stem
pub fn sanitize_filename(title: &str) -> String {
    let name: String = title
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .take(MAX_STEM_CHARS)
        .collect();

    // leading dots would hide the file
    name.trim().trim_start_matches('.').trim().to_string()
}

/// Default archive path for a page: `<title>.mht`, falling back to the host name
pub fn default_output_path(title: &str, page_url: &str) -> PathBuf {
    let mut stem = sanitize_filename(title);
    if stem.is_empty() {
        stem = Url::parse(page_url)
            .ok()
            .and_then(|url| url.host_str().map(sanitize_filename))
            .filter(|host| !host.is_empty())
            .unwrap_or_else(|| "page".to_string());
    }
    PathBuf::from(format!("{stem}.{ARCHIVE_EXTENSION}"))
}
