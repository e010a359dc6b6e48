//! Error types for script evaluation

use gscript_parser::ParseError;
use gscript_shared::Value;
use serde_json::Value as JsonValue;
use thiserror::Error;

/// Errors raised while compiling or running script code
#[derive(Debug, Error)]
pub enum EvalError {
    /// Source failed to parse
    #[error("SyntaxError: {0}")]
    Syntax(#[from] ParseError),

    /// Read of an undeclared name
    #[error("ReferenceError: {0} is not defined")]
    Reference(String),

    /// Operation applied to a value of the wrong kind
    #[error("TypeError: {0}")]
    Type(String),

    /// Uncaught `throw`; the thrown value is kept as JSON
    #[error("{message}")]
    Thrown {
        /// Message of the thrown value
        message: String,
        /// The thrown value
        value: JsonValue,
    },

    /// A host object method failed
    #[error("{0}")]
    Host(anyhow::Error),

    /// Call depth exceeded the configured limit
    #[error("RangeError: maximum call depth of {0} exceeded")]
    RecursionLimit(usize),
}

impl EvalError {
    /// Build a type error
    pub fn type_error(msg: impl Into<String>) -> Self {
        EvalError::Type(msg.into())
    }

    /// Statement that only makes sense inside a loop or function
    pub(crate) fn misplaced(what: &str) -> Self {
        EvalError::Syntax(ParseError::General {
            message: format!("Illegal {} statement", what),
        })
    }

    /// Whether the error came out of the parser
    #[must_use]
    pub fn is_syntax(&self) -> bool {
        matches!(self, EvalError::Syntax(_))
    }
}

/// Abrupt completion of a statement or expression
///
/// `Throw` carries the script value so `catch` sees exactly what was thrown;
/// it becomes [`EvalError::Thrown`] only when it escapes to the host.
#[derive(Debug)]
pub(crate) enum Control {
    Error(EvalError),
    Throw(Value),
    Return(Value),
    Break,
    Continue,
}

impl From<EvalError> for Control {
    fn from(err: EvalError) -> Self {
        Control::Error(err)
    }
}

impl Control {
    /// Convert an abrupt completion that escaped to the host
    pub(crate) fn into_error(self) -> EvalError {
        match self {
            Control::Error(err) => err,
            Control::Throw(value) => EvalError::Thrown {
                message: thrown_message(&value),
                value: value.to_json_lossy(),
            },
            Control::Return(_) => EvalError::misplaced("return"),
            Control::Break => EvalError::misplaced("break"),
            Control::Continue => EvalError::misplaced("continue"),
        }
    }
}

/// Message of a thrown value: `message` property of objects, text otherwise
pub(crate) fn thrown_message(value: &Value) -> String {
    if let Some(obj) = value.as_object() {
        let message = obj.borrow().get("message").map(ToString::to_string);
        if let Some(message) = message {
            return message;
        }
    }
    value.to_string()
}

/// Result of evaluating script code inside the interpreter
pub(crate) type Exec<T> = std::result::Result<T, Control>;

/// Result type for evaluation at the host boundary
pub type Result<T> = std::result::Result<T, EvalError>;
