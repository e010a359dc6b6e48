//! gscript-store: Durable key/value storage for graphscript
//!
//! The database exposes a flat property store: string keys mapping to string
//! values, with point reads and single-key writes. This crate defines that
//! interface ([`PropertyStore`]), two reference implementations, and the
//! [`FunctionStore`] that keeps script function sources in it.
//!
//! # Examples
//!
//! ```rust
//! use std::sync::Arc;
//! use gscript_store::{FunctionStore, MemoryPropertyStore};
//!
//! let store = FunctionStore::new(Arc::new(MemoryPropertyStore::new()));
//! assert!(!store.put("answer", "function() { return 42 }")?);
//! assert!(store.put("answer", "function() { return 43 }")?);
//! assert_eq!(store.list()?.collect::<Vec<_>>(), vec!["answer"]);
//! # Ok::<(), gscript_store::StoreError>(())
//! ```

#![warn(missing_docs)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]

pub mod file;
pub mod functions;
pub mod memory;

pub use file::FilePropertyStore;
pub use functions::{FunctionStore, FUNCTION_KEY_PREFIX};
pub use memory::MemoryPropertyStore;

/// Result type for store operations
pub type Result<T> = std::result::Result<T, StoreError>;

/// Store error type
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Reading or writing the backing file failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// The backing file is not a JSON object of strings
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    /// The store cannot be used, e.g. a poisoned lock
    #[error("Property store unavailable: {0}")]
    Unavailable(String),
}

/// Durable string-keyed property storage shared by every registry
///
/// Implementations are shared across threads behind an `Arc`; each call is
/// a single atomic read or write, with no transactions spanning calls.
pub trait PropertyStore: Send + Sync {
    /// Read a property, `None` when absent
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write a property, replacing any previous value
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove a property; removing a missing key is not an error
    fn remove(&self, key: &str) -> Result<()>;

    /// Whether a property exists
    fn contains(&self, key: &str) -> Result<bool> {
        Ok(self.get(key)?.is_some())
    }

    /// All keys, in the store's iteration order
    fn keys(&self) -> Result<Vec<String>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = StoreError::Unavailable("lock poisoned".to_string());
        assert_eq!(err.to_string(), "Property store unavailable: lock poisoned");

        let err: StoreError = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert_eq!(err.to_string(), "IO error: gone");
    }

    #[test]
    fn test_default_contains_uses_get() {
        let store = MemoryPropertyStore::new();
        store.set("k", "v").unwrap();
        assert!(store.contains("k").unwrap());
        assert!(!store.contains("missing").unwrap());
    }
}
