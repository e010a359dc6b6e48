//! CLI error type

use gscript_core::ScriptError;
use gscript_store::StoreError;

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors reported by the `gscript` binary
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid or unreadable configuration
    #[error("Configuration error: {0}")]
    Config(String),
    /// A registry operation failed
    #[error(transparent)]
    Script(#[from] ScriptError),
    /// Opening the property store failed
    #[error(transparent)]
    Store(#[from] StoreError),
    /// Loading the graph failed
    #[error("Graph error: {0}")]
    Graph(anyhow::Error),
    /// Terminal or file I/O failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// Output serialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Build a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }
}
