//! Error types for the graphscript parser

use std::fmt;

/// Errors that can occur during parsing
#[derive(Debug, Clone, PartialEq)]
pub enum ParseError {
    /// Unexpected token encountered
    UnexpectedToken {
        /// The unexpected text, truncated to the first token
        found: String,
        /// Byte offset in the input
        position: usize,
        /// 1-based line
        line: usize,
        /// 1-based column
        column: usize,
    },

    /// Input ended in the middle of a construct
    UnexpectedEnd {
        /// Byte offset in the input
        position: usize,
        /// 1-based line
        line: usize,
        /// 1-based column
        column: usize,
    },

    /// Unterminated string literal
    UnterminatedString {
        /// Byte offset where the string starts
        position: usize,
        /// 1-based line
        line: usize,
        /// 1-based column
        column: usize,
    },

    /// Unterminated block comment
    UnterminatedComment {
        /// Byte offset where the comment starts
        position: usize,
        /// 1-based line
        line: usize,
        /// 1-based column
        column: usize,
    },

    /// Left side of an assignment is not a variable, member or index
    InvalidAssignmentTarget {
        /// Byte offset of the assignment operator
        position: usize,
        /// 1-based line
        line: usize,
        /// 1-based column
        column: usize,
    },

    /// Brackets nested deeper than the parser allows
    NestingTooDeep {
        /// Configured limit
        max_depth: usize,
        /// Byte offset of the first bracket past the limit
        position: usize,
        /// 1-based line
        line: usize,
        /// 1-based column
        column: usize,
    },

    /// Empty input where an expression was required
    EmptyInput,

    /// General parsing error
    General {
        /// Error message
        message: String,
    },
}

impl ParseError {
    /// Build a positioned error from a nom failure on `source`
    pub(crate) fn at(source: &str, err: &nom::Err<nom::error::Error<&str>>) -> Self {
        use nom::error::ErrorKind;

        let e = match err {
            nom::Err::Error(e) | nom::Err::Failure(e) => e,
            nom::Err::Incomplete(_) => {
                return ParseError::General {
                    message: "Incomplete input".to_string(),
                }
            }
        };

        let position = source.len().saturating_sub(e.input.len());
        let (line, column) = line_column(source, position);
        let rest = e.input.trim_start();

        match e.code {
            ErrorKind::Escaped => {
                ParseError::UnterminatedString {
                    position,
                    line,
                    column,
                }
            }
            ErrorKind::TakeUntil => ParseError::UnterminatedComment {
                position,
                line,
                column,
            },
            ErrorKind::Verify if rest.starts_with(['=', '+', '-', '*', '/', '%']) => {
                ParseError::InvalidAssignmentTarget {
                    position,
                    line,
                    column,
                }
            }
            _ if rest.is_empty() => {
                let position = source.trim_end().len();
                let (line, column) = line_column(source, position);
                ParseError::UnexpectedEnd {
                    position,
                    line,
                    column,
                }
            }
            _ => {
                let skipped = e.input.len() - rest.len();
                let position = position + skipped;
                let (line, column) = line_column(source, position);
                ParseError::UnexpectedToken {
                    found: first_token(rest),
                    position,
                    line,
                    column,
                }
            }
        }
    }

    pub(crate) fn nesting_too_deep(source: &str, position: usize, max_depth: usize) -> Self {
        let (line, column) = line_column(source, position);
        ParseError::NestingTooDeep {
            max_depth,
            position,
            line,
            column,
        }
    }

    /// 1-based line and column, when the error carries a position
    #[must_use]
    pub fn location(&self) -> Option<(usize, usize)> {
        match self {
            ParseError::UnexpectedToken { line, column, .. }
            | ParseError::UnexpectedEnd { line, column, .. }
            | ParseError::UnterminatedString { line, column, .. }
            | ParseError::UnterminatedComment { line, column, .. }
            | ParseError::InvalidAssignmentTarget { line, column, .. }
            | ParseError::NestingTooDeep { line, column, .. } => Some((*line, *column)),
            ParseError::EmptyInput | ParseError::General { .. } => None,
        }
    }
}

fn line_column(source: &str, position: usize) -> (usize, usize) {
    let before = &source[..position.min(source.len())];
    let line = before.matches('\n').count() + 1;
    let column = before
        .rfind('\n')
        .map_or(before.chars().count(), |i| before[i + 1..].chars().count())
        + 1;
    (line, column)
}

fn first_token(rest: &str) -> String {
    let mut chars = rest.chars();
    let Some(first) = chars.next() else {
        return String::new();
    };
    if first.is_alphanumeric() || first == '_' || first == '$' {
        rest.chars()
            .take_while(|c| c.is_alphanumeric() || *c == '_' || *c == '$')
            .take(24)
            .collect()
    } else {
        first.to_string()
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::UnexpectedToken {
                found,
                line,
                column,
                ..
            } => write!(f, "Unexpected token '{}' at {}:{}", found, line, column),
            ParseError::UnexpectedEnd { line, column, .. } => {
                write!(f, "Unexpected end of input at {}:{}", line, column)
            }
            ParseError::UnterminatedString { line, column, .. } => {
                write!(f, "Unterminated string literal starting at {}:{}", line, column)
            }
            ParseError::UnterminatedComment { line, column, .. } => {
                write!(f, "Unterminated comment starting at {}:{}", line, column)
            }
            ParseError::InvalidAssignmentTarget { line, column, .. } => {
                write!(f, "Invalid assignment target at {}:{}", line, column)
            }
            ParseError::NestingTooDeep {
                max_depth,
                line,
                column,
                ..
            } => write!(
                f,
                "Nesting deeper than {} levels at {}:{}",
                max_depth, line, column
            ),
            ParseError::EmptyInput => write!(f, "Empty input"),
            ParseError::General { message } => write!(f, "{}", message),
        }
    }
}

impl std::error::Error for ParseError {}

/// Result type for parsing operations
pub type Result<T> = std::result::Result<T, ParseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_column() {
        let src = "a\nbc\n  d";
        assert_eq!(line_column(src, 0), (1, 1));
        assert_eq!(line_column(src, 3), (2, 2));
        assert_eq!(line_column(src, 7), (3, 3));
    }

    #[test]
    fn test_first_token() {
        assert_eq!(first_token("syntax ("), "syntax");
        assert_eq!(first_token("(foo"), "(");
        assert_eq!(first_token(""), "");
    }
}
