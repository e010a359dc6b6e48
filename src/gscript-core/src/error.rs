//! Error types for the function registry

use gscript_engine::EvalError;
use gscript_store::StoreError;
use thiserror::Error;

/// Result type alias for registry operations
pub type Result<T> = std::result::Result<T, ScriptError>;

/// Errors surfaced by registering, binding and running script functions
#[derive(Debug, Error)]
pub enum ScriptError {
    /// No stored definition under this name
    #[error("Function {name} not defined, use register('name', 'code')")]
    DefinitionNotFound {
        /// Requested function name
        name: String,
    },

    /// Source failed to compile or evaluate while registering or binding
    #[error("Compile error in function {name}: {source}")]
    Compile {
        /// Function (or bootstrap) being compiled
        name: String,
        /// Underlying evaluation error
        source: EvalError,
    },

    /// The user function raised an error while running
    #[error("Error invoking function {name}: {source}")]
    Invocation {
        /// Function being invoked
        name: String,
        /// Underlying evaluation error
        source: EvalError,
    },

    /// The property store failed
    #[error("Store access error: {0}")]
    StoreAccess(#[from] StoreError),

    /// Registration with a name that is not a valid identifier
    #[error("Invalid function name '{0}'")]
    InvalidName(String),
}

impl ScriptError {
    /// Build a compile error for `name`
    pub fn compile(name: impl Into<String>, source: EvalError) -> Self {
        ScriptError::Compile {
            name: name.into(),
            source,
        }
    }

    /// Build an invocation error for `name`
    pub fn invocation(name: impl Into<String>, source: EvalError) -> Self {
        ScriptError::Invocation {
            name: name.into(),
            source,
        }
    }

    /// Whether this is a compile-class failure
    ///
    /// An invalid name counts: registration rejects it before compiling.
    pub fn is_compile_error(&self) -> bool {
        matches!(
            self,
            ScriptError::Compile { .. } | ScriptError::InvalidName(_)
        )
    }

    /// Value thrown by the script, when the failure was an uncaught `throw`
    pub fn thrown_value(&self) -> Option<&serde_json::Value> {
        match self {
            ScriptError::Invocation {
                source: EvalError::Thrown { value, .. },
                ..
            } => Some(value),
            _ => None,
        }
    }
}
