//! Turning a returned value into a stream of result records
//!
//! Whatever a function returns is classified once:
//!
//! - an array fans out into one record per element, in index order;
//! - an iterable (a host iterator, or an object with callable `hasNext` and
//!   `next`) fans out lazily, one pull per record;
//! - anything else becomes a single record.
//!
//! Nested arrays are not flattened.

use std::fmt;

use log::trace;
use serde::{Deserialize, Serialize};

use gscript_engine::{EvalError, Interpreter};
use gscript_shared::{is_truthy, Value};

use crate::error::{Result, ScriptError};

/// A single streamed result: `{ value }`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultRecord {
    /// The wrapped value
    pub value: Value,
}

/// Outcome of an administrative call: `{ message }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusRecord {
    /// Human-readable status
    pub message: String,
}

impl StatusRecord {
    /// Build a status record
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for StatusRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Shape of a raw returned value
#[derive(Debug)]
pub enum Returned {
    /// Emitted as one record
    Scalar(Value),
    /// Elements snapshotted at classification time
    ArrayOf(Vec<Value>),
    /// Pulled lazily through `hasNext` / `next`
    IterableOf(Value),
}

impl Returned {
    /// Classify a returned value
    pub fn classify(interpreter: &Interpreter, value: Value) -> Self {
        match value {
            Value::Array(items) => {
                let snapshot = items.borrow().clone();
                Returned::ArrayOf(snapshot)
            }
            Value::Host(ref host) if host.as_iterator().is_some() => Returned::IterableOf(value),
            Value::Object(_)
                if interpreter.has_method(&value, "hasNext")
                    && interpreter.has_method(&value, "next") =>
            {
                Returned::IterableOf(value)
            }
            other => Returned::Scalar(other),
        }
    }
}

enum Source {
    Items { items: Vec<Value>, position: usize },
    Iterable(Value),
}

/// Lazy sequence of [`ResultRecord`]s
///
/// After an error item the sequence ends. Array and scalar results can be
/// replayed with [`Records::rewind`]; iterables cannot.
pub struct Records {
    name: String,
    interpreter: Interpreter,
    source: Source,
    finished: bool,
}

impl fmt::Debug for Records {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Records")
            .field("name", &self.name)
            .field("rewindable", &self.is_rewindable())
            .field("finished", &self.finished)
            .finish_non_exhaustive()
    }
}

impl Records {
    /// Records for the value `name` returned
    pub fn new(interpreter: Interpreter, name: impl Into<String>, returned: Returned) -> Self {
        let source = match returned {
            Returned::Scalar(value) => Source::Items {
                items: vec![value],
                position: 0,
            },
            Returned::ArrayOf(items) => Source::Items { items, position: 0 },
            Returned::IterableOf(value) => Source::Iterable(value),
        };
        Self {
            name: name.into(),
            interpreter,
            source,
            finished: false,
        }
    }

    /// Function that produced these records
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether [`Records::rewind`] can restart the sequence
    pub fn is_rewindable(&self) -> bool {
        matches!(self.source, Source::Items { .. })
    }

    /// Restart from the first record; returns `false` for lazy iterables
    pub fn rewind(&mut self) -> bool {
        match &mut self.source {
            Source::Items { position, .. } => {
                *position = 0;
                self.finished = false;
                true
            }
            Source::Iterable(_) => false,
        }
    }

    fn fail(&mut self, err: EvalError) -> Option<Result<ResultRecord>> {
        self.finished = true;
        Some(Err(ScriptError::invocation(self.name.clone(), err)))
    }

    fn pull(&mut self) -> Option<Result<ResultRecord>> {
        let iterable = match &mut self.source {
            Source::Items { items, position } => {
                let value = items.get(*position).cloned();
                *position += 1;
                return value.map(|value| Ok(ResultRecord { value }));
            }
            Source::Iterable(value) => value.clone(),
        };

        if let Some(it) = iterable.as_host().and_then(|h| h.as_iterator()) {
            return match it.next_value()? {
                Ok(value) => Some(Ok(ResultRecord { value })),
                Err(e) => self.fail(EvalError::Host(e)),
            };
        }

        match self.interpreter.call_method(&iterable, "hasNext", &[]) {
            Ok(more) if is_truthy(&more) => {}
            Ok(_) => return None,
            Err(e) => return self.fail(e),
        }
        match self.interpreter.call_method(&iterable, "next", &[]) {
            Ok(value) => Some(Ok(ResultRecord { value })),
            Err(e) => self.fail(e),
        }
    }
}

impl Iterator for Records {
    type Item = Result<ResultRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        let item = self.pull();
        if item.is_none() {
            self.finished = true;
        }
        trace!(
            "Pulled record from '{}' ({})",
            self.name,
            match &item {
                Some(Ok(_)) => "value",
                Some(Err(_)) => "error",
                None => "end",
            }
        );
        item
    }
}

/// Classify `value` and wrap it as records
pub fn normalize(interpreter: &Interpreter, name: &str, value: Value) -> Records {
    let returned = Returned::classify(interpreter, value);
    Records::new(interpreter.clone(), name, returned)
}
