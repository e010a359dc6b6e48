//! gscript-engine: Interpreter for the graphscript language
//!
//! A small tree-walking interpreter over the AST produced by
//! `gscript-parser`. Each [`Interpreter`] owns a global scope; host code
//! binds values into it, evaluates source, and calls script functions
//! through the [`ScriptEngine`] trait.
//!
//! # Quick Start
//!
//! ```rust
//! use gscript_engine::{Interpreter, ScriptEngine};
//! use gscript_shared::Value;
//!
//! let interp = Interpreter::default();
//! interp.eval("function add(a, b) { return a + b }")?;
//! let sum = interp.invoke("add", &[Value::Int(2), Value::Int(3)])?;
//! assert_eq!(sum, Value::Int(5));
//! # Ok::<(), gscript_engine::EvalError>(())
//! ```
//!
//! Natives (`JSON`, `Math`, array and string methods, `apply`/`call`) are
//! collected at startup from `inventory` registrations.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    clippy::similar_names,
    clippy::too_many_lines,
    clippy::must_use_candidate,
    clippy::doc_markdown,
    clippy::uninlined_format_args,
    clippy::unnecessary_wraps
)]

mod builtin;
pub mod config;
pub mod error;
mod function;
pub mod interpreter;
mod ops;
mod scope;

pub use config::EngineConfig;
pub use error::{EvalError, Result};
pub use interpreter::{Interpreter, ScriptEngine};
