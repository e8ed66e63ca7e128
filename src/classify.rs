//! Turns fetched resources into typed MIME parts.

use crate::archive::{MimePart, PartKind};
use crate::error::{ArchiveError, Result};
use crate::fetchers::Fetched;
use crate::parsers::{self, stylesheet};
use encoding_rs::UTF_8;

/// Image subtypes recognised by file extension
const IMAGE_EXTENSIONS: [(&str, &str); 8] = [
    ("jpg", "jpeg"),
    ("jpeg", "jpeg"),
    ("png", "png"),
    ("gif", "gif"),
    ("svg", "svg+xml"),
    ("webp", "webp"),
    ("ico", "x-icon"),
    ("bmp", "bmp"),
];

/// Image subtype for a URL, decided by its path suffix (case-insensitive)
pub fn image_subtype_from_url(url: &str) -> Option<&'static str> {
    let path = url.split(['?', '#']).next().unwrap_or(url).to_ascii_lowercase();
    IMAGE_EXTENSIONS
        .iter()
        .find(|(ext, _)| {
            path.strip_suffix(*ext)
                .is_some_and(|stem| stem.ends_with('.'))
        })
        .map(|(_, subtype)| *subtype)
}

/// Image subtype by extension, then by the server's declared `image/*` type
pub fn image_subtype(fetched: &Fetched) -> Result<String> {
    if let Some(subtype) = image_subtype_from_url(&fetched.url) {
        return Ok(subtype.to_string());
    }

    fetched
        .media_type()
        .and_then(|media| media.strip_prefix("image/").map(|s| s.to_string()))
        .filter(|subtype| !subtype.is_empty())
        .ok_or_else(|| ArchiveError::Classification(fetched.url.clone()))
}

/// Image part, attached as `application/octet-stream` when its type is unknown
pub fn classify_image(fetched: Fetched) -> MimePart {
    let kind = match image_subtype(&fetched) {
        Ok(subtype) => PartKind::Image(subtype),
        Err(e) => {
            ::log::warn!("{}; attaching as application/octet-stream", e);
            PartKind::Binary
        }
    };
    MimePart::new(kind, fetched.url, fetched.bytes)
}

/// Stylesheet part plus the normalized text that is scanned for references.
///
/// The normalized text is written back in the charset it was decoded from;
/// the part is relabelled when that differs from the declared charset.
pub fn classify_stylesheet(fetched: Fetched) -> (MimePart, String) {
    let declared = parsers::encoding_for(fetched.charset());
    let (raw, decoded_as, _) = declared.unwrap_or(UTF_8).decode(&fetched.bytes);
    let css = format!(
        "{}{}",
        stylesheet::PROVENANCE_COMMENT,
        stylesheet::normalize(&raw)
    );

    let (body, written_as, _) = decoded_as.encode(&css);
    let charset = match (fetched.charset(), declared) {
        (Some(label), Some(declared)) if declared == written_as => Some(label.to_string()),
        (None, _) if written_as == UTF_8 => None,
        _ => Some(written_as.name().to_ascii_lowercase()),
    };

    let part = MimePart::new(PartKind::Css, &fetched.url, body.into_owned())
        .with_charset(charset.as_deref());
    (part, css)
}

/// Script part, never scanned further
pub fn classify_script(fetched: Fetched) -> MimePart {
    let charset = fetched.charset().map(|c| c.to_string());
    MimePart::new(PartKind::Script, fetched.url, fetched.bytes).with_charset(charset.as_deref())
}

/// HTML document part, for the root page and nested frames alike
pub fn classify_document(fetched: Fetched) -> MimePart {
    let charset = fetched.charset().map(|c| c.to_string());
    MimePart::new(PartKind::Html, fetched.url, fetched.bytes).with_charset(charset.as_deref())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fetched(url: &str, bytes: &[u8], content_type: Option<&str>) -> Fetched {
        Fetched::new(url, bytes.to_vec(), content_type.map(|s| s.to_string()))
    }

    #[test]
    fn test_image_subtype_by_extension() {
        let cases = [
            ("https://example.com/photo.JPG", Some("jpeg")),
            ("https://example.com/a.jpeg", Some("jpeg")),
            ("https://example.com/logo.png?v=3", Some("png")),
            ("https://example.com/anim.Gif", Some("gif")),
            ("https://example.com/icon.svg", Some("svg+xml")),
            ("https://example.com/pixel", None),
            ("https://example.com/image.tiff", None),
            ("https://example.com/api/svg", None),
            ("https://example.com/thumbsgif", None),
            ("https://example.com/pic.png/", None),
        ];
        for (url, expected) in cases {
            assert_eq!(image_subtype_from_url(url), expected, "url: {url}");
        }
    }

    #[test]
    fn test_image_falls_back_to_server_type() {
        let part = classify_image(fetched(
            "https://example.com/avatar?id=1",
            b"RIFF",
            Some("image/webp"),
        ));
        assert_eq!(part.kind(), &PartKind::Image("webp".to_string()));
        assert_eq!(part.location(), "https://example.com/avatar?id=1");
    }

    #[test]
    fn test_unknown_image_attached_as_binary() {
        let part = classify_image(fetched(
            "https://example.com/blob",
            b"\x00\x01",
            Some("application/octet-stream"),
        ));
        assert_eq!(part.kind(), &PartKind::Binary);
        assert_eq!(part.content_type(), "application/octet-stream");
        assert_eq!(part.body(), b"\x00\x01");
    }

    #[test]
    fn test_stylesheet_prefixed_and_normalized() {
        let (part, css) = classify_stylesheet(fetched(
            "https://example.com/site.css",
            b"/* banner */\nbody {\n  margin: 0;\n}\n",
            Some("text/css; charset=utf-8"),
        ));
        assert_eq!(
            css,
            "/* Effective stylesheet produced by snapshot save */\r\n body { margin: 0; }\n"
        );
        assert_eq!(part.body(), css.as_bytes());
        assert_eq!(part.content_type(), "text/css; charset=\"utf-8\"");
    }

    #[test]
    fn test_latin1_stylesheet_keeps_its_bytes() {
        let (part, css) = classify_stylesheet(fetched(
            "https://example.com/s.css",
            b"a{content:\"caf\xe9\"}",
            Some("text/css; charset=iso-8859-1"),
        ));
        assert!(css.ends_with("a{content:\"caf\u{e9}\"}\n"));
        assert!(part.body().ends_with(b"caf\xe9\"}\n"));
        assert_eq!(part.content_type(), "text/css; charset=\"iso-8859-1\"");
    }

    #[test]
    fn test_stylesheet_relabelled_when_charset_unknown() {
        let (part, _) = classify_stylesheet(fetched(
            "https://example.com/s.css",
            "a{content:\"caf\u{e9}\"}".as_bytes(),
            Some("text/css; charset=x-unknown"),
        ));
        assert!(part.body().ends_with("caf\u{e9}\"}\n".as_bytes()));
        assert_eq!(part.content_type(), "text/css; charset=\"utf-8\"");
    }

    #[test]
    fn test_script_and_document_keep_bytes() {
        let script = classify_script(fetched("https://example.com/a.js", b"alert(1);", None));
        assert_eq!(script.kind(), &PartKind::Script);
        assert_eq!(script.body(), b"alert(1);");

        let doc = classify_document(fetched("https://example.com/", b"<html></html>", None));
        assert_eq!(doc.kind(), &PartKind::Html);
        assert_eq!(doc.content_type(), "text/html");
    }
}
