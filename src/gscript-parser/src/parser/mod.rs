//! Parser implementation for graphscript
//!
//! This module contains the main parser that converts script source into
//! AST representations using nom parser combinators.

use nom::{
    combinator::all_consuming,
    multi::many0,
    sequence::terminated,
    IResult, Parser,
};

use crate::ast::{Expr, Program};
use crate::error::{ParseError, Result};

mod expressions;
mod identifiers;
mod literals;
mod operators;
mod statements;
mod utils;

use statements::parse_statement;
use utils::{nesting_overflow, ws};

pub(crate) use identifiers::is_keyword;
pub(crate) use utils::{is_ident_char, is_ident_start};

/// Default limit on bracket nesting
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Main parser for graphscript source
#[derive(Debug, Clone)]
pub struct ScriptParser {
    /// Maximum nesting of `(`, `[` and `{`
    max_depth: usize,
}

impl ScriptParser {
    /// Create a new parser instance
    pub fn new() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Create a parser with a custom nesting limit
    pub fn with_max_depth(max_depth: usize) -> Self {
        Self { max_depth }
    }

    /// Nesting limit in use
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    fn check_nesting(&self, input: &str) -> Result<()> {
        match nesting_overflow(input, self.max_depth) {
            Some(position) => Err(ParseError::nesting_too_deep(input, position, self.max_depth)),
            None => Ok(()),
        }
    }

    /// Parse a script into a program; empty input is an empty program
    pub fn parse(&self, input: &str) -> Result<Program> {
        self.check_nesting(input)?;
        match all_consuming(parse_program).parse(input) {
            Ok((_, program)) => Ok(program),
            Err(e) => Err(ParseError::at(input, &e)),
        }
    }

    /// Parse a single expression
    pub fn parse_expression(&self, input: &str) -> Result<Expr> {
        if input.trim().is_empty() {
            return Err(ParseError::EmptyInput);
        }
        self.check_nesting(input)?;

        match all_consuming(terminated(expressions::parse_expression, ws)).parse(input) {
            Ok((_, expr)) => Ok(expr),
            Err(e) => Err(ParseError::at(input, &e)),
        }
    }
}

/// Parse a complete program
fn parse_program(input: &str) -> IResult<&str, Program> {
    let (rest, body) = terminated(many0(parse_statement), ws).parse(input)?;
    Ok((rest, Program { body }))
}

impl Default for ScriptParser {
    fn default() -> Self {
        Self::new()
    }
}
