//! gscript-parser: Parser for the graphscript language
//!
//! This crate converts script source into an Abstract Syntax Tree using the
//! nom parser combinator library. The language is a small JavaScript-like
//! subset: functions and closures, `var`/`let`/`const`, the usual control
//! flow statements, array and object literals, and arrow functions.
//!
//! # Quick Start
//!
//! ```rust
//! use gscript_parser::{ScriptParser, Stmt};
//!
//! let parser = ScriptParser::new();
//! let program = parser.parse("function hello(who) { return 'Hello ' + who }")?;
//! assert!(matches!(program.body[0], Stmt::Function(_)));
//! # Ok::<(), gscript_parser::ParseError>(())
//! ```
//!
//! # Error Handling
//!
//! Parse errors carry a byte offset and a 1-based line and column:
//!
//! ```rust
//! use gscript_parser::{ScriptParser, ParseError};
//!
//! let parser = ScriptParser::new();
//! match parser.parse("function(){ not valid syntax ( }") {
//!     Ok(_) => {}
//!     Err(ParseError::UnexpectedToken { found, line, column, .. }) => {
//!         eprintln!("Unexpected '{}' at {}:{}", found, line, column);
//!     }
//!     Err(e) => eprintln!("Parse error: {}", e),
//! }
//! ```

#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    clippy::similar_names,
    clippy::too_many_lines
)]

pub mod ast;
pub mod error;
mod parser;

// Re-export main types
pub use ast::*;
pub use error::{ParseError, Result};
pub use parser::{ScriptParser, DEFAULT_MAX_DEPTH};

/// Whether `name` is a valid, non-reserved identifier
#[must_use]
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if parser::is_ident_start(first) => {
            chars.all(parser::is_ident_char) && !parser::is_keyword(name)
        }
        _ => false,
    }
}
