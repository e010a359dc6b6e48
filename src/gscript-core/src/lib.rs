//! gscript-core: Stored script functions for an embedded graph database
//!
//! Operators register named functions as script source; the source is kept
//! in the database's property store and compiled into a per-context
//! interpreter each time the function runs. Results come back as a lazy
//! stream of `{ value }` records.
//!
//! # Architecture
//!
//! - [`FunctionStore`](gscript_store::FunctionStore) persists `name → source`
//! - [`pool::InterpreterPool`] keeps one bootstrapped interpreter per context
//! - [`binder`] binds the stored source as a global function
//! - [`invoker`] binds `db` and `log` and calls the function
//! - [`normalize`] turns the returned value into [`Records`]
//!
//! [`Scripts`] ties these together.
//!
//! # Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use gscript_core::{ContextId, MemoryGraph, Scripts, ScriptsConfig};
//! use gscript_shared::Value;
//! use gscript_store::MemoryPropertyStore;
//!
//! let mut scripts = Scripts::new(
//!     Arc::new(MemoryPropertyStore::new()),
//!     Arc::new(MemoryGraph::new()),
//!     ScriptsConfig::default(),
//! );
//!
//! let status = scripts.register("nums", "function() { return [1, 2, 3] }")?;
//! assert_eq!(status.message, "Added Function nums");
//!
//! let values: Vec<Value> = scripts
//!     .run(ContextId(1), "nums", None)?
//!     .map(|record| record.map(|r| r.value))
//!     .collect::<Result<_, _>>()?;
//! assert_eq!(values, vec![Value::Int(1), Value::Int(2), Value::Int(3)]);
//! # Ok::<(), gscript_core::ScriptError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::doc_markdown,
    clippy::uninlined_format_args
)]

pub mod binder;
pub mod config;
pub mod error;
pub mod graph;
pub mod handles;
pub mod invoker;
pub mod logger;
pub mod normalize;
pub mod pool;
mod scripts;

pub use config::ScriptsConfig;
pub use error::{Result, ScriptError};
pub use graph::{GraphDatabase, GraphSeed, MemoryGraph, NodeRecord, RelationshipRecord};
pub use handles::{DatabaseHandle, NodeHandle, RelationshipHandle};
pub use logger::ScriptLogger;
pub use normalize::{normalize, Records, ResultRecord, Returned, StatusRecord};
pub use pool::{ContextId, InterpreterPool};
pub use scripts::Scripts;
