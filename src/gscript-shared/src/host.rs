//! Host objects
//!
//! Anything the host hands to a script (the database handle, the logger,
//! nodes, iterators over query results) implements [`HostObject`]. Scripts
//! see host objects as opaque values with properties and methods.

use serde_json::{json, Value as JsonValue};
use std::any::Any;
use std::cell::RefCell;
use std::fmt;

use crate::value::Value;
use crate::Result;

/// A host-provided value visible to scripts
pub trait HostObject: fmt::Debug {
    /// Type name reported by `typeof`-style introspection and errors
    fn type_name(&self) -> &'static str;

    /// Read a property; `None` when the property does not exist
    fn get(&self, _name: &str) -> Option<Value> {
        None
    }

    /// Invoke a method; `None` when the object has no such method
    fn call_method(&self, name: &str, args: &[Value]) -> Option<Result<Value>>;

    /// Host-level equality, used when two handles are not the same allocation
    fn equals(&self, _other: &dyn HostObject) -> bool {
        false
    }

    /// JSON representation used for output
    fn to_json(&self) -> JsonValue {
        json!({ "type": self.type_name() })
    }

    /// Text representation used for string conversion
    fn display(&self) -> String {
        format!("[{}]", self.type_name())
    }

    /// Iterator view, for handles that produce a sequence
    fn as_iterator(&self) -> Option<&HostIterator> {
        None
    }

    /// Downcasting support
    fn as_any(&self) -> &dyn Any;
}

type ValueIter = Box<dyn Iterator<Item = Result<Value>>>;

/// A single-pass, lazily pulled sequence of values handed to scripts
///
/// Scripts consume it with `hasNext()` / `next()`; the result normalizer pulls
/// it directly through [`HostIterator::next_value`].
pub struct HostIterator {
    name: &'static str,
    source: RefCell<ValueIter>,
    peeked: RefCell<Option<Result<Value>>>,
}

impl HostIterator {
    /// Wrap a fallible iterator
    pub fn new<I>(name: &'static str, source: I) -> Self
    where
        I: Iterator<Item = Result<Value>> + 'static,
    {
        Self {
            name,
            source: RefCell::new(Box::new(source)),
            peeked: RefCell::new(None),
        }
    }

    /// Wrap an infallible iterator
    pub fn from_values<I>(name: &'static str, values: I) -> Self
    where
        I: IntoIterator<Item = Value>,
        I::IntoIter: 'static,
    {
        Self::new(name, values.into_iter().map(Ok))
    }

    /// Whether another element is available; pulls one element ahead
    pub fn has_next(&self) -> bool {
        let mut peeked = self.peeked.borrow_mut();
        if peeked.is_none() {
            *peeked = self.source.borrow_mut().next();
        }
        peeked.is_some()
    }

    /// Take the next element, or `None` once exhausted
    pub fn next_value(&self) -> Option<Result<Value>> {
        if let Some(item) = self.peeked.borrow_mut().take() {
            return Some(item);
        }
        self.source.borrow_mut().next()
    }
}

impl fmt::Debug for HostIterator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostIterator")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl HostObject for HostIterator {
    fn type_name(&self) -> &'static str {
        self.name
    }

    fn call_method(&self, name: &str, _args: &[Value]) -> Option<Result<Value>> {
        match name {
            "hasNext" => Some(Ok(Value::Bool(self.has_next()))),
            "next" => Some(self.next_value().unwrap_or_else(|| {
                Err(crate::error::operation_error(format!(
                    "{} has no more elements",
                    self.name
                )))
            })),
            _ => None,
        }
    }

    fn as_iterator(&self) -> Option<&HostIterator> {
        Some(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_next_does_not_consume() {
        let it = HostIterator::from_values("Numbers", vec![Value::Int(1), Value::Int(2)]);
        assert!(it.has_next());
        assert!(it.has_next());
        assert_eq!(it.next_value().unwrap().unwrap(), Value::Int(1));
        assert_eq!(it.next_value().unwrap().unwrap(), Value::Int(2));
        assert!(!it.has_next());
        assert!(it.next_value().is_none());
    }

    #[test]
    fn test_script_methods() {
        let it = HostIterator::from_values("Numbers", vec![Value::Int(7)]);
        let has_next = it.call_method("hasNext", &[]).unwrap().unwrap();
        assert_eq!(has_next, Value::Bool(true));
        let next = it.call_method("next", &[]).unwrap().unwrap();
        assert_eq!(next, Value::Int(7));
        assert!(it.call_method("next", &[]).unwrap().is_err());
        assert!(it.call_method("remove", &[]).is_none());
    }

    #[test]
    fn test_errors_are_yielded_in_place() {
        let source = vec![
            Ok(Value::Int(1)),
            Err(crate::error::operation_error("cursor closed")),
        ];
        let it = HostIterator::new("Cursor", source.into_iter());
        assert!(it.next_value().unwrap().is_ok());
        assert!(it.next_value().unwrap().is_err());
    }
}
