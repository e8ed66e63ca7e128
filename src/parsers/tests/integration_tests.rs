use crate::parsers::{Extractor, MarkupType, ReferenceKind, decode_markup, stylesheet};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_with_markup_type() {
        let html = r#"<img src="x.png"><link type="text/css" href="y.css">"#;
        let refs = Extractor::extract(html, MarkupType::Html);
        assert_eq!(refs.len(), 2);

        let css = ".a{background-image: url(x.png);}";
        let refs = Extractor::extract(css, MarkupType::Css);
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].kind, ReferenceKind::Image);
    }

    #[test]
    fn test_commented_out_import_not_followed_after_normalize() {
        let css = "/* @import url(old.css); */\n@import url(new.css);";
        let normalized = stylesheet::normalize(css);
        let refs = Extractor::extract(&normalized, MarkupType::Css);
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].url, "new.css");
    }

    #[test]
    fn test_binary_content_yields_no_references() {
        let bytes = b"\x89PNG\r\n\x1a\n\x00\x00\x00\rIHDR<img src=\"x.png\">";
        assert!(decode_markup("https://example.com/x", bytes, None).is_err());
        assert!(Extractor::extract_from_bytes("https://example.com/x", bytes, None, MarkupType::Html)
                .is_empty());
    }

    #[test]
    fn test_invalid_utf8_is_decoded_lossily() {
        let bytes = b"<p>caf\xe9</p><img src=\"menu.png\">";
        let refs =
            Extractor::extract_from_bytes("https://example.com/", bytes, None, MarkupType::Html);
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].url, "menu.png");
    }

    #[test]
    fn test_declared_charset_used_for_decoding() {
        let bytes = b"<title>Caf\xe9</title>";
        let text = decode_markup("https://example.com/", bytes, Some("ISO-8859-1")).unwrap();
        assert_eq!(text, "<title>Caf\u{e9}</title>");

        // unknown labels fall back to UTF-8
        let text = decode_markup("https://example.com/", b"caf\xc3\xa9", Some("x-bogus")).unwrap();
        assert_eq!(text, "caf\u{e9}");
    }

    #[test]
    fn test_utf16_is_not_mistaken_for_binary() {
        let bytes = b"<\x00p\x00>\x00";
        let text = decode_markup("https://example.com/", bytes, Some("utf-16le")).unwrap();
        assert_eq!(text, "<p>");
    }
}
