//! Content transfer encodings used by archive parts.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::fmt::Write;

/// Longest encoded line allowed by RFC 2045, CRLF excluded
pub const MAX_LINE_LEN: usize = 76;

const CRLF: &str = "\r\n";

/// Quoted-printable encoding (RFC 2045 section 6.7).
///
/// CRLF pairs become hard line breaks; every other control byte, including
/// a lone CR or LF, is escaped so decoding returns the input unchanged.
pub fn encode_quoted_printable(input: &[u8]) -> String {
    let mut out = String::with_capacity(input.len() + input.len() / 8);
    let mut line_len = 0;
    let mut i = 0;

    while i < input.len() {
        let byte = input[i];
        if byte == b'\r' && input.get(i + 1) == Some(&b'\n') {
            out.push_str(CRLF);
            line_len = 0;
            i += 2;
            continue;
        }

        let ends_line = match input.get(i + 1) {
            None => true,
            Some(b'\r') => input.get(i + 2) == Some(&b'\n'),
            Some(_) => false,
        };
        let literal = match byte {
            // whitespace at a line end would be stripped in transport
            b' ' | b'\t' => !ends_line,
            b'=' => false,
            33..=126 => true,
            _ => false,
        };

        let token_len = if literal { 1 } else { 3 };
        // leave room for the soft break marker
        if line_len + token_len > MAX_LINE_LEN - 1 {
            out.push('=');
            out.push_str(CRLF);
            line_len = 0;
        }

        if literal {
            out.push(byte as char);
        } else {
            let _ = write!(out, "={byte:02X}");
        }
        line_len += token_len;
        i += 1;
    }

    out
}

/// Reverses [`encode_quoted_printable`]; `None` on a malformed escape
pub fn decode_quoted_printable(input: &str) -> Option<Vec<u8>> {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b'=' {
            out.push(bytes[i]);
            i += 1;
            continue;
        }

        match bytes.get(i + 1..i + 3) {
            Some(b"\r\n") => i += 3,
            Some([b'\n', ..]) => i += 2,
            Some(hex) => {
                let hex = std::str::from_utf8(hex).ok()?;
                out.push(u8::from_str_radix(hex, 16).ok()?);
                i += 3;
            }
            None if bytes.get(i + 1) == Some(&b'\n') => i += 2,
            None => return None,
        }
    }

    Some(out)
}

/// Base64 with CRLF line breaks every [`MAX_LINE_LEN`] characters
pub fn encode_base64(input: &[u8]) -> String {
    let encoded = STANDARD.encode(input);
    // base64 output is ASCII, so byte chunks are char boundaries
    encoded
        .as_bytes()
        .chunks(MAX_LINE_LEN)
        .map(String::from_utf8_lossy)
        .collect::<Vec<_>>()
        .join(CRLF)
}

/// RFC 2047 encoded word for non-ASCII header text
pub fn encode_header_text(text: &str) -> String {
    if text.is_ascii() && !text.contains(['\r', '\n']) {
        text.to_string()
    } else {
        format!("=?utf-8?b?{}?=", STANDARD.encode(text.as_bytes()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_unchanged() {
        assert_eq!(encode_quoted_printable(b"<p>Hello</p>"), "<p>Hello</p>");
        assert_eq!(encode_quoted_printable(b""), "");
    }

    #[test]
    fn test_escapes() {
        assert_eq!(encode_quoted_printable(b"a=b"), "a=3Db");
        assert_eq!(encode_quoted_printable("caf\u{e9}".as_bytes()), "caf=C3=A9");
        assert_eq!(encode_quoted_printable(b"x\ny"), "x=0Ay");
        assert_eq!(encode_quoted_printable(b"x\r\ny"), "x\r\ny");
        assert_eq!(encode_quoted_printable(b"end \r\nnext\t"), "end=20\r\nnext=09");
    }

    #[test]
    fn test_soft_breaks_keep_lines_short() {
        let input = "=".repeat(100) + &"a".repeat(200);
        let encoded = encode_quoted_printable(input.as_bytes());
        assert!(encoded.split(CRLF).all(|line| line.len() <= MAX_LINE_LEN));
        // escapes are never split across a soft break
        assert!(encoded.split(CRLF).all(|line| {
            let body = line.strip_suffix('=').unwrap_or(line);
            !body.ends_with("=3") && !body.ends_with('=')
        }));
    }

    #[test]
    fn test_round_trip_arbitrary_bytes() {
        let inputs: Vec<Vec<u8>> = vec![
            (0..=255u8).collect(),
            b"line one\r\nline two \r\n\r\n\ttabbed\n\rmixed\r".to_vec(),
            "snow \u{2603} and caf\u{e9}\r\n".repeat(40).into_bytes(),
            b" ".repeat(200),
        ];
        for input in inputs {
            let encoded = encode_quoted_printable(&input);
            assert_eq!(decode_quoted_printable(&encoded).unwrap(), input);
        }
    }

    #[test]
    fn test_decode_rejects_bad_escape() {
        assert!(decode_quoted_printable("a=ZZb").is_none());
        assert!(decode_quoted_printable("trailing=").is_none());
    }

    #[test]
    fn test_base64_wrapped() {
        let body: Vec<u8> = (0..=255u8).cycle().take(1000).collect();
        let encoded = encode_base64(&body);
        assert!(encoded.split(CRLF).all(|l| l.len() <= MAX_LINE_LEN));
        let joined: String = encoded.split(CRLF).collect();
        assert_eq!(STANDARD.decode(joined).unwrap(), body);
    }

    #[test]
    fn test_header_text() {
        assert_eq!(encode_header_text("Plain Title"), "Plain Title");
        assert_eq!(encode_header_text("Caf\u{e9}"), "=?utf-8?b?Q2Fmw6k=?=");
    }
}
