use crate::encoding::{self, MAX_LINE_LEN};
use chrono::{DateTime, Local, TimeZone};
use std::fmt::Display;
use std::fs;
use std::path::Path;

/// Preamble written before the first part
pub const PREAMBLE: &str = "This is a multi-part message in MIME format.";

const CRLF: &str = "\r\n";

/// Kind of resource held by a part
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PartKind {
    Html,
    Css,
    Script,
    /// Image with its MIME subtype (`png`, `jpeg`, ...)
    Image(String),
    /// Anything that could not be classified
    Binary,
}

impl PartKind {
    /// Full media type for the part header
    pub fn media_type(&self) -> String {
        match self {
            PartKind::Html => "text/html".to_string(),
            PartKind::Css => "text/css".to_string(),
            PartKind::Script => "text/javascript".to_string(),
            PartKind::Image(subtype) => format!("image/{subtype}"),
            PartKind::Binary => "application/octet-stream".to_string(),
        }
    }

    /// Text parts are quoted-printable, everything else base64
    pub fn transfer_encoding(&self) -> TransferEncoding {
        match self {
            PartKind::Html | PartKind::Css | PartKind::Script => TransferEncoding::QuotedPrintable,
            PartKind::Image(_) | PartKind::Binary => TransferEncoding::Base64,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferEncoding {
    QuotedPrintable,
    Base64,
}

impl Display for TransferEncoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransferEncoding::QuotedPrintable => write!(f, "quoted-printable"),
            TransferEncoding::Base64 => write!(f, "base64"),
        }
    }
}

/// One archived resource. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MimePart {
    kind: PartKind,
    location: String,
    charset: Option<String>,
    body: Vec<u8>,
}

impl MimePart {
    /// Create a part from the resource's final bytes
    pub fn new(kind: PartKind, location: impl Into<String>, body: Vec<u8>) -> Self {
        Self {
            kind,
            location: location.into(),
            charset: None,
            body,
        }
    }

    /// Declare the charset of a text part
    pub fn with_charset(mut self, charset: Option<&str>) -> Self {
        self.charset = charset.map(|c| c.to_string());
        self
    }

    pub fn kind(&self) -> &PartKind {
        &self.kind
    }

    /// Source URL, written as `Content-Location`
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Unencoded content
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// `Content-Type` header value
    pub fn content_type(&self) -> String {
        match (&self.charset, self.kind.transfer_encoding()) {
            (Some(charset), TransferEncoding::QuotedPrintable) => {
                format!("{}; charset=\"{}\"", self.kind.media_type(), charset)
            }
            _ => self.kind.media_type(),
        }
    }

    /// Content with the transfer encoding applied
    pub fn encoded_body(&self) -> String {
        match self.kind.transfer_encoding() {
            TransferEncoding::QuotedPrintable => encoding::encode_quoted_printable(&self.body),
            TransferEncoding::Base64 => encoding::encode_base64(&self.body),
        }
    }

    fn write_to(&self, out: &mut String) {
        push_header(out, "Content-Type", &self.content_type());
        push_header(out, "MIME-Version", "1.0");
        push_header(
            out,
            "Content-Transfer-Encoding",
            &self.kind.transfer_encoding().to_string(),
        );
        push_header(out, "Content-Location", &self.location);
        out.push_str(CRLF);
        // the CRLF before the next delimiter belongs to the delimiter
        out.push_str(&self.encoded_body());
    }
}

/// Ordered collection of parts making up one archive
#[derive(Debug, Clone)]
pub struct Container {
    title: String,
    boundary: String,
    parts: Vec<MimePart>,
}

impl Container {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            boundary: format!("===============_{}==", uuid::Uuid::new_v4().simple()),
            parts: Vec::new(),
        }
    }

    /// Use a fixed boundary instead of a random one
    pub fn with_boundary(mut self, boundary: impl Into<String>) -> Self {
        self.boundary = boundary.into();
        self
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    pub fn attach(&mut self, part: MimePart) {
        ::log::trace!("Attaching {} ({})", part.location(), part.content_type());
        self.parts.push(part);
    }

    pub fn extend(&mut self, parts: impl IntoIterator<Item = MimePart>) {
        for part in parts {
            self.attach(part);
        }
    }

    pub fn parts(&self) -> &[MimePart] {
        &self.parts
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Serializes the archive with the given `Date:` header
    pub fn to_mht<Tz>(&self, date: &DateTime<Tz>) -> String
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        let mut out = String::new();
        push_header(
            &mut out,
            "From",
            &format!(
                "<Saved by {} {}>",
                env!("CARGO_PKG_NAME"),
                env!("CARGO_PKG_VERSION")
            ),
        );
        push_header(&mut out, "Subject", &encoding::encode_header_text(&self.title));
        push_header(&mut out, "Date", &date.to_rfc2822());
        push_header(&mut out, "MIME-Version", "1.0");
        push_header(
            &mut out,
            "Content-Type",
            &format!(
                "multipart/related; type=\"text/html\"; boundary=\"{}\"",
                self.boundary
            ),
        );
        out.push_str(CRLF);
        out.push_str(PREAMBLE);
        out.push_str(CRLF);

        for part in &self.parts {
            out.push_str(CRLF);
            out.push_str("--");
            out.push_str(&self.boundary);
            out.push_str(CRLF);
            part.write_to(&mut out);
        }

        out.push_str(CRLF);
        out.push_str("--");
        out.push_str(&self.boundary);
        out.push_str("--");
        out.push_str(CRLF);
        out
    }

    /// Writes the archive to `path`, dated now
    pub fn write_to(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        let path = path.as_ref();
        let mht = self.to_mht(&Local::now());
        fs::write(path, mht)?;
        ::log::info!(
            "Wrote {} parts to {}",
            self.parts.len(),
            path.display()
        );
        Ok(())
    }
}

fn push_header(out: &mut String, name: &str, value: &str) {
    out.push_str(name);
    out.push_str(": ");
    out.push_str(value);
    out.push_str(CRLF);
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};

    fn sample_date() -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc2822("Fri, 16 Mar 2012 11:13:53 +0100").unwrap()
    }

    #[test]
    fn test_text_part_quoted_printable_round_trip() {
        let body = "<p>caf\u{e9} = 10\u{20ac}</p>\r\nline with trailing space \r\n\tand a tab\n"
            .repeat(20)
            .into_bytes();
        let part = MimePart::new(PartKind::Html, "https://example.com/", body.clone());

        let decoded = encoding::decode_quoted_printable(&part.encoded_body()).unwrap();
        assert_eq!(decoded, body);
        assert!(part.encoded_body().lines().all(|l| l.len() <= MAX_LINE_LEN));
    }

    #[test]
    fn test_image_part_base64() {
        let part = MimePart::new(
            PartKind::Image("png".into()),
            "https://example.com/a.png",
            vec![0x89, b'P', b'N', b'G'],
        );
        assert_eq!(part.encoded_body(), "iVBORw==");
        assert_eq!(part.content_type(), "image/png");
        assert_eq!(part.kind().transfer_encoding(), TransferEncoding::Base64);
    }

    #[test]
    fn test_charset_only_on_text_parts() {
        let css = MimePart::new(PartKind::Css, "https://example.com/s.css", Vec::new())
            .with_charset(Some("utf-8"));
        assert_eq!(css.content_type(), "text/css; charset=\"utf-8\"");

        let img = MimePart::new(PartKind::Image("gif".into()), "https://example.com/a.gif", Vec::new())
            .with_charset(Some("utf-8"));
        assert_eq!(img.content_type(), "image/gif");
    }

    #[test]
    fn test_serialized_layout() {
        let mut container = Container::new("Example Page").with_boundary("BOUNDARY");
        container.attach(MimePart::new(
            PartKind::Html,
            "https://example.com/",
            b"<html></html>".to_vec(),
        ));
        container.attach(MimePart::new(
            PartKind::Script,
            "https://example.com/app.js",
            b"run();".to_vec(),
        ));

        let mht = container.to_mht(&sample_date());
        let expected_head = "From: <Saved by save-page 0.1.0>\r\n\
            Subject: Example Page\r\n\
            Date: Fri, 16 Mar 2012 11:13:53 +0100\r\n\
            MIME-Version: 1.0\r\n\
            Content-Type: multipart/related; type=\"text/html\"; boundary=\"BOUNDARY\"\r\n\
            \r\n\
            This is a multi-part message in MIME format.\r\n";
        assert!(mht.starts_with(expected_head), "{mht}");
        assert!(mht.contains(
            "--BOUNDARY\r\n\
             Content-Type: text/html\r\n\
             MIME-Version: 1.0\r\n\
             Content-Transfer-Encoding: quoted-printable\r\n\
             Content-Location: https://example.com/\r\n\
             \r\n\
             <html></html>\r\n"
        ));
        assert!(mht.contains("Content-Location: https://example.com/app.js\r\n"));
        assert!(mht.ends_with("\r\n--BOUNDARY--\r\n"));
        assert_eq!(mht.matches("\r\n--BOUNDARY\r\n").count(), 2);
    }

    #[test]
    fn test_non_ascii_subject_encoded() {
        let container = Container::new("Caf\u{e9}").with_boundary("B");
        let mht = container.to_mht(&Utc::now());
        assert!(mht.contains("Subject: =?utf-8?b?Q2Fmw6k=?=\r\n"));
    }

    #[test]
    fn test_random_boundaries_differ() {
        let a = Container::new("a");
        let b = Container::new("b");
        assert_ne!(a.boundary(), b.boundary());
        assert!(a.is_empty());
    }
}
