use std::iter::Peekable;
use std::str::Chars;

/// Header prepended to every archived stylesheet
pub const PROVENANCE_COMMENT: &str = "/* Effective stylesheet produced by snapshot save */\r\n";

/// Normalizes stylesheet text before it is archived and scanned
///
/// This function:
/// - Removes `/* ... */` comments, leaving quoted strings untouched
/// - Collapses every whitespace run into a single space
/// - Puts a newline after each closing brace
pub fn normalize(css: &str) -> String {
    let stripped = remove_comments(css);
    normalize_whitespace(&stripped)
}

/// Lexical mode of the comment scanner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Code,
    Comment,
    Quoted(char),
}

/// Removes C-style comments while keeping string literals verbatim.
///
/// Escapes inside strings are honoured, so `"\"/*"` stays a string. An
/// unterminated comment swallows the rest of the input; an unterminated
/// string is kept as-is.
pub fn remove_comments(css: &str) -> String {
    let mut out = String::with_capacity(css.len());
    let mut chars = css.chars().peekable();
    let mut mode = Mode::Code;

    while let Some(c) = chars.next() {
        mode = match mode {
            Mode::Code => scan_code(c, &mut chars, &mut out),
            Mode::Comment => {
                if c == '*' && chars.peek() == Some(&'/') {
                    chars.next();
                    // keep `/` + comment + `*` from forming a new opener
                    if out.ends_with('/') && chars.peek() == Some(&'*') {
                        out.push(' ');
                    }
                    Mode::Code
                } else {
                    Mode::Comment
                }
            }
            Mode::Quoted(quote) => {
                out.push(c);
                if c == '\\' {
                    if let Some(escaped) = chars.next() {
                        out.push(escaped);
                    }
                    Mode::Quoted(quote)
                } else if c == quote {
                    Mode::Code
                } else {
                    Mode::Quoted(quote)
                }
            }
        };
    }

    out
}

fn scan_code(c: char, chars: &mut Peekable<Chars<'_>>, out: &mut String) -> Mode {
    match c {
        '/' if chars.peek() == Some(&'*') => {
            chars.next();
            Mode::Comment
        }
        '"' | '\'' => {
            out.push(c);
            Mode::Quoted(c)
        }
        _ => {
            out.push(c);
            Mode::Code
        }
    }
}

/// Collapses whitespace runs to one space and breaks the line after each `}`
pub fn normalize_whitespace(css: &str) -> String {
    let mut out = String::with_capacity(css.len());
    let mut chars = css.chars().peekable();

    while let Some(c) = chars.next() {
        if c.is_whitespace() {
            while chars.peek().is_some_and(|next| next.is_whitespace()) {
                chars.next();
            }
            out.push(' ');
        } else if c == '}' {
            out.push('}');
            out.push('\n');
            // the break replaces the whitespace run that follows
            while chars.peek().is_some_and(|next| next.is_whitespace()) {
                chars.next();
            }
        } else {
            out.push(c);
        }
    }

    out
}
