//! Literal value parsing
//!
//! This module contains parsers for literal values including strings, numbers,
//! booleans, `null` and `undefined`.

use nom::{
    branch::alt,
    bytes::complete::take_while1,
    character::complete::{char, digit1, one_of},
    combinator::{map, opt, recognize},
    error::ErrorKind,
    sequence::preceded,
    IResult, Parser,
};

use crate::ast::{Expr, Literal};

use super::utils::{keyword, ws};

/// Parse literals
pub(crate) fn parse_literal(input: &str) -> IResult<&str, Expr> {
    map(
        alt((
            parse_string,
            parse_number,
            map(keyword("true"), |_| Literal::Bool(true)),
            map(keyword("false"), |_| Literal::Bool(false)),
            map(alt((keyword("null"), keyword("undefined"))), |_| {
                Literal::Null
            }),
        )),
        Expr::Literal,
    )
    .parse(input)
}

/// Parse a string literal
pub(crate) fn parse_string(input: &str) -> IResult<&str, Literal> {
    map(parse_quoted, Literal::String).parse(input)
}

/// Parse a quoted string in either quote style, returning its unescaped text
pub(crate) fn parse_quoted(input: &str) -> IResult<&str, String> {
    let (input, ()) = ws(input)?;
    let Some(quote) = input.chars().next().filter(|c| *c == '"' || *c == '\'') else {
        return Err(nom::Err::Error(nom::error::Error::new(
            input,
            ErrorKind::Char,
        )));
    };

    let body = &input[1..];
    let mut result = String::new();
    let mut chars = body.char_indices();
    while let Some((i, ch)) = chars.next() {
        match ch {
            c if c == quote => return Ok((&body[i + 1..], result)),
            '\n' => break,
            '\\' => {
                let Some((_, esc)) = chars.next() else { break };
                match esc {
                    'n' => result.push('\n'),
                    't' => result.push('\t'),
                    'r' => result.push('\r'),
                    'b' => result.push('\x08'),
                    'f' => result.push('\x0c'),
                    'v' => result.push('\x0b'),
                    '0' => result.push('\0'),
                    '\n' => {}
                    'u' => {
                        let hex: String = chars.by_ref().take(4).map(|(_, c)| c).collect();
                        match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                            Some(c) if hex.len() == 4 => result.push(c),
                            _ => {
                                return Err(nom::Err::Failure(nom::error::Error::new(
                                    &body[i..],
                                    ErrorKind::HexDigit,
                                )))
                            }
                        }
                    }
                    other => result.push(other),
                }
            }
            other => result.push(other),
        }
    }

    Err(nom::Err::Failure(nom::error::Error::new(
        input,
        ErrorKind::Escaped,
    )))
}

/// Parse a number: integers become `Int`, fractions and exponents `Float`
pub(crate) fn parse_number(input: &str) -> IResult<&str, Literal> {
    let (rest, text) = preceded(
        ws,
        recognize((
            digit1,
            opt((char('.'), digit1)),
            opt((one_of("eE"), opt(one_of("+-")), digit1)),
        )),
    )
    .parse(input)?;

    // `1abc` is not a number followed by an identifier
    if rest.starts_with(|c: char| c.is_alphabetic() || c == '_' || c == '$') {
        return Err(nom::Err::Error(nom::error::Error::new(
            input,
            ErrorKind::Digit,
        )));
    }

    let literal = if text.contains(['.', 'e', 'E']) {
        Literal::Float(text.parse().unwrap_or(f64::NAN))
    } else {
        match text.parse::<i64>() {
            Ok(i) => Literal::Int(i),
            Err(_) => Literal::Float(text.parse().unwrap_or(f64::INFINITY)),
        }
    };
    Ok((rest, literal))
}

/// Parse a bare property key: identifier name, keyword, string or number
pub(crate) fn parse_property_key(input: &str) -> IResult<&str, String> {
    alt((
        parse_quoted,
        map(preceded(ws, take_while1(super::utils::is_ident_char)), |s: &str| {
            s.to_string()
        }),
    ))
    .parse(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numbers() {
        assert_eq!(parse_number("42").unwrap().1, Literal::Int(42));
        assert_eq!(parse_number("1.5").unwrap().1, Literal::Float(1.5));
        assert_eq!(parse_number("2e3").unwrap().1, Literal::Float(2000.0));
        assert_eq!(
            parse_number("99999999999999999999").unwrap().1,
            Literal::Float(1e20)
        );
        assert!(parse_number("1abc").is_err());
    }

    #[test]
    fn test_strings() {
        assert_eq!(
            parse_string(r#""a\"b\n""#).unwrap().1,
            Literal::String("a\"b\n".to_string())
        );
        assert_eq!(
            parse_string("'it\\'s'").unwrap().1,
            Literal::String("it's".to_string())
        );
        assert_eq!(
            parse_string("'\\u0041'").unwrap().1,
            Literal::String("A".to_string())
        );
    }

    #[test]
    fn test_unterminated_string_is_a_failure() {
        assert!(matches!(parse_string("'open"), Err(nom::Err::Failure(_))));
    }
}
