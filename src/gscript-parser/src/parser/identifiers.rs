//! Identifier parsing

use nom::{
    bytes::complete::{take_while, take_while_m_n},
    combinator::{recognize, verify},
    sequence::preceded,
    IResult, Parser,
};

use super::utils::{is_ident_char, is_ident_start, ws, KEYWORDS};

/// Parse an identifier name, reserved words included (property names)
pub(crate) fn parse_identifier_name(input: &str) -> IResult<&str, String> {
    let (rest, name) = preceded(
        ws,
        recognize((
            take_while_m_n(1, 1, is_ident_start),
            take_while(is_ident_char),
        )),
    )
    .parse(input)?;
    Ok((rest, name.to_string()))
}

/// Parse an identifier that is not a reserved word
pub(crate) fn parse_identifier(input: &str) -> IResult<&str, String> {
    verify(parse_identifier_name, |name: &str| !is_keyword(name)).parse(input)
}

/// Whether `name` is a reserved word
pub(crate) fn is_keyword(name: &str) -> bool {
    KEYWORDS.contains(&name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifiers() {
        assert_eq!(parse_identifier("  $el_1 rest").unwrap(), (" rest", "$el_1".to_string()));
        assert!(parse_identifier("1abc").is_err());
        assert!(parse_identifier("return").is_err());
        assert_eq!(
            parse_identifier_name("return").unwrap().1,
            "return".to_string()
        );
    }
}
