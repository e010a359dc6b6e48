//! gscript-shared: Shared types and utilities for graphscript crates
//!
//! This crate contains the dynamic value type that flows between the script
//! interpreter and its host, the trait host handles implement to be visible
//! from scripts, and the label / relationship-type handles every interpreter
//! can construct.
//!
//! # Features
//!
//! - **Common Result Type**: Standardized Result type alias for host calls
//! - **Dynamic Values**: [`value::Value`] with JSON conversion and serde support
//! - **Host Objects**: [`host::HostObject`] and the lazy [`host::HostIterator`]
//! - **Graph Handles**: [`graph::Label`] and [`graph::RelationshipType`]

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
    clippy::type_complexity,
    clippy::uninlined_format_args,
    clippy::manual_let_else
)]

/// Result type alias for host-side operations
pub type Result<T> = anyhow::Result<T>;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Common error handling utilities
pub mod error {
    /// Create a generic operation error
    pub fn operation_error(msg: impl Into<String>) -> anyhow::Error {
        anyhow::anyhow!("Operation error: {}", msg.into())
    }

    /// Create an argument error for a host method call
    pub fn argument_error(method: &str, msg: impl Into<String>) -> anyhow::Error {
        anyhow::anyhow!("Invalid argument to {}: {}", method, msg.into())
    }
}

/// Dynamic values exchanged with scripts
pub mod value;

/// Host objects exposed to scripts
pub mod host;

/// Graph handle types constructed by scripts
pub mod graph;

pub use graph::{Label, RelationshipType};
pub use host::{HostIterator, HostObject};
pub use value::{is_truthy, Callable, Value};

/// Common constants
pub mod constants {
    /// Default maximum call depth for script execution
    pub const DEFAULT_MAX_CALL_DEPTH: usize = 256;

    /// Default number of compiled functions kept per interpreter
    pub const DEFAULT_COMPILED_CACHE_SIZE: usize = 64;

    /// Maximum nesting depth when converting values to JSON or text
    pub const MAX_VALUE_NESTING: usize = 128;
}
