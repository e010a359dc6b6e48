//! graphscript
//!
//! Named script functions stored alongside an embedded graph. Functions
//! are registered as source text, compiled into per-context interpreters
//! on demand and run with the graph bound as `db`. Results stream back as
//! `{ value }` records.
//!
//! ```
//! use std::sync::Arc;
//!
//! use graphscript::store::MemoryPropertyStore;
//! use graphscript::{ContextId, MemoryGraph, Scripts, ScriptsConfig, Value};
//!
//! let mut scripts = Scripts::new(
//!     Arc::new(MemoryPropertyStore::new()),
//!     Arc::new(MemoryGraph::new()),
//!     ScriptsConfig::default(),
//! );
//! scripts.register("range", "function(n) { r = []; for (var i = 0; i < n; i++) { r.push(i) } return r }")?;
//!
//! let values: Vec<Value> = scripts
//!     .run(ContextId(1), "range", Some(vec![Value::Int(3)]))?
//!     .map(|record| record.map(|r| r.value))
//!     .collect::<Result<_, _>>()?;
//! assert_eq!(values, vec![Value::Int(0), Value::Int(1), Value::Int(2)]);
//! # Ok::<(), graphscript::ScriptError>(())
//! ```

pub use gscript_core::*;
pub use gscript_shared::Value;

/// Script parser
pub use gscript_parser as parser;

/// Interpreter
pub use gscript_engine as engine;

/// Property stores and the function store
pub use gscript_store as store;

/// Shared value and graph types
pub use gscript_shared as shared;
