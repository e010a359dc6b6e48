//! Utility parsers shared by the other parser modules

use nom::{bytes::complete::tag, error::ErrorKind, sequence::preceded, IResult, Parser};

/// Reserved words that cannot be used as identifiers
pub(crate) const KEYWORDS: &[&str] = &[
    "var", "let", "const", "function", "return", "if", "else", "while", "for", "of", "break",
    "continue", "throw", "try", "catch", "finally", "true", "false", "null", "undefined",
    "typeof", "this", "new", "in",
];

/// Remaining native stack below which parsing moves to a new segment
pub(crate) const STACK_RED_ZONE: usize = 128 * 1024;

/// Size of each heap-allocated stack segment
pub(crate) const STACK_SEGMENT: usize = 2 * 1024 * 1024;

/// Byte offset of the first `(`, `[` or `{` nested deeper than `max_depth`
///
/// Brackets inside string literals and comments are ignored.
pub(crate) fn nesting_overflow(input: &str, max_depth: usize) -> Option<usize> {
    let bytes = input.as_bytes();
    let mut depth = 0usize;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'(' | b'[' | b'{' => {
                depth += 1;
                if depth > max_depth {
                    return Some(i);
                }
            }
            b')' | b']' | b'}' => depth = depth.saturating_sub(1),
            quote @ (b'"' | b'\'') => {
                i += 1;
                while i < bytes.len() && bytes[i] != quote {
                    if bytes[i] == b'\\' {
                        i += 1;
                    }
                    i += 1;
                }
            }
            b'/' if bytes.get(i + 1) == Some(&b'/') => {
                while i < bytes.len() && bytes[i] != b'\n' {
                    i += 1;
                }
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                i += 2;
                while i + 1 < bytes.len() && !(bytes[i] == b'*' && bytes[i + 1] == b'/') {
                    i += 1;
                }
                i += 1;
            }
            _ => {}
        }
        i += 1;
    }
    None
}

/// Characters that may continue an identifier
pub(crate) fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

/// Characters that may start an identifier
pub(crate) fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

/// Skip whitespace and comments
pub(crate) fn ws(input: &str) -> IResult<&str, ()> {
    let mut rest = input;
    loop {
        let trimmed = rest.trim_start();
        if let Some(after) = trimmed.strip_prefix("//") {
            rest = after.find('\n').map_or("", |i| &after[i..]);
        } else if let Some(after) = trimmed.strip_prefix("/*") {
            match after.find("*/") {
                Some(i) => rest = &after[i + 2..],
                None => {
                    return Err(nom::Err::Failure(nom::error::Error::new(
                        trimmed,
                        ErrorKind::TakeUntil,
                    )))
                }
            }
        } else {
            return Ok((trimmed, ()));
        }
    }
}

/// Punctuation token preceded by optional whitespace
pub(crate) fn punct<'a>(p: &'static str) -> impl FnMut(&'a str) -> IResult<&'a str, &'a str> {
    move |input: &'a str| preceded(ws, tag(p)).parse(input)
}

/// Operator token that must not be directly followed by any of `excluded`
///
/// Keeps `=` from matching the start of `==` or `=>`, `+` from matching `+=`, etc.
pub(crate) fn operator<'a>(
    op: &'static str,
    excluded: &'static str,
) -> impl FnMut(&'a str) -> IResult<&'a str, &'a str> {
    move |input: &'a str| {
        let (rest, matched) = preceded(ws, tag(op)).parse(input)?;
        if rest.starts_with(|c: char| excluded.contains(c)) {
            return Err(nom::Err::Error(nom::error::Error::new(
                input,
                ErrorKind::Tag,
            )));
        }
        Ok((rest, matched))
    }
}

/// Keyword parser that requires a word boundary after the keyword
pub(crate) fn keyword<'a>(kw: &'static str) -> impl FnMut(&'a str) -> IResult<&'a str, &'a str> {
    move |input: &'a str| {
        let (rest, matched) = preceded(ws, tag(kw)).parse(input)?;
        if rest.starts_with(is_ident_char) {
            return Err(nom::Err::Error(nom::error::Error::new(
                input,
                ErrorKind::Tag,
            )));
        }
        Ok((rest, matched))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ws_skips_comments() {
        let (rest, ()) = ws("  // line\n /* block */ x").unwrap();
        assert_eq!(rest, "x");
    }

    #[test]
    fn test_ws_reports_unterminated_comment() {
        assert!(matches!(ws("/* open"), Err(nom::Err::Failure(_))));
    }

    #[test]
    fn test_keyword_boundary() {
        assert!(keyword("for")("for (").is_ok());
        assert!(keyword("for")("format").is_err());
    }

    #[test]
    fn test_operator_exclusion() {
        assert!(operator("=", "=>")("= 1").is_ok());
        assert!(operator("=", "=>")("== 1").is_err());
        assert!(operator("=", "=>")("=> 1").is_err());
    }
}
