use crate::config::UrlResolution;
use url::Url;

/// Schemes that never point at a fetchable resource
const NON_FETCHABLE_PREFIXES: [&str; 4] = ["data:", "javascript:", "about:", "mailto:"];

/// Turns a reference found in a document into an absolute URL.
///
/// Returns `None` for empty or non-fetchable references.
pub fn resolve(base: &str, reference: &str, mode: UrlResolution) -> Option<String> {
    let reference = reference.trim();
    if reference.is_empty() || reference.starts_with('#') {
        return None;
    }

    let lower = reference.to_ascii_lowercase();
    if NON_FETCHABLE_PREFIXES
        .iter()
        .any(|prefix| lower.starts_with(prefix))
    {
        ::log::trace!("Not resolving non-fetchable reference {}", reference);
        return None;
    }

    match mode {
        UrlResolution::Join => join(base, reference),
        UrlResolution::Concat => Some(concat(base, reference)),
    }
}

/// Standard resolution, fragment removed
fn join(base: &str, reference: &str) -> Option<String> {
    match Url::parse(base).and_then(|base| base.join(reference)) {
        Ok(resolved) => Some(normalize_url(&resolved).to_string()),
        Err(e) => {
            ::log::debug!("Cannot resolve {} against {}: {}", reference, base, e);
            None
        }
    }
}

/// Legacy resolution: absolute references verbatim, everything else appended to the base
fn concat(base: &str, reference: &str) -> String {
    if Url::parse(reference).is_ok() {
        reference.to_string()
    } else {
        format!("{base}{reference}")
    }
}

/// Create a normalized version of the URL (e.g., removing fragments)
pub fn normalize_url(url: &Url) -> Url {
    let mut normalized = url.clone();
    normalized.set_fragment(None);
    normalized
}
