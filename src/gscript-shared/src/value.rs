//! Value types for graphscript
//!
//! This module provides the dynamic [`Value`] enum that represents everything
//! a script can compute, pass to a host handle, or return to the caller.
//! Arrays and objects are shared and mutable, the way a dynamic language
//! aliases them; functions and host handles are opaque reference types.

use indexmap::IndexMap;
use serde_json::{Number as JsonNumber, Value as JsonValue};
use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::constants::MAX_VALUE_NESTING;
use crate::host::HostObject;

/// Shared, mutable array storage
pub type Array = Rc<RefCell<Vec<Value>>>;

/// Shared, mutable, insertion-ordered object storage
pub type Object = Rc<RefCell<IndexMap<String, Value>>>;

/// A function value as seen from outside the interpreter
///
/// The interpreter owns the concrete representations (closures, natives) and
/// recovers them through [`Callable::as_any`].
pub trait Callable: fmt::Debug {
    /// Function name, empty for anonymous functions
    fn name(&self) -> &str;

    /// Number of declared parameters
    fn arity(&self) -> usize;

    /// Downcasting support
    fn as_any(&self) -> &dyn Any;
}

/// A dynamically typed script value
#[derive(Clone)]
pub enum Value {
    /// Null (also what `undefined` evaluates to)
    Null,
    /// Boolean value
    Bool(bool),
    /// Integer value (i64)
    Int(i64),
    /// Float value (f64)
    Float(f64),
    /// String value
    String(String),
    /// Array of values
    Array(Array),
    /// Object (key-value pairs, insertion ordered)
    Object(Object),
    /// Callable function
    Function(Rc<dyn Callable>),
    /// Opaque host handle (node, label, iterator, database, logger, ...)
    Host(Rc<dyn HostObject>),
}

impl Value {
    /// Create a new string value
    pub fn string(s: impl Into<String>) -> Self {
        Value::String(s.into())
    }

    /// Create a new array value
    #[must_use]
    pub fn array(arr: Vec<Value>) -> Self {
        Value::Array(Rc::new(RefCell::new(arr)))
    }

    /// Create a new object value
    #[must_use]
    pub fn object(obj: IndexMap<String, Value>) -> Self {
        Value::Object(Rc::new(RefCell::new(obj)))
    }

    /// Wrap a host handle
    pub fn host<H: HostObject + 'static>(handle: H) -> Self {
        Value::Host(Rc::new(handle))
    }
}

impl Value {
    /// Check if value is null
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Check if value is callable
    #[must_use]
    pub fn is_function(&self) -> bool {
        matches!(self, Value::Function(_))
    }

    /// Borrow the string payload
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Integer view of a number; floats qualify only when integral
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            Value::Float(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => Some(*f as i64),
            _ => None,
        }
    }

    /// Float view of a number
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Shared handle to the array payload
    #[must_use]
    pub fn as_array(&self) -> Option<Array> {
        match self {
            Value::Array(a) => Some(Rc::clone(a)),
            _ => None,
        }
    }

    /// Shared handle to the object payload
    #[must_use]
    pub fn as_object(&self) -> Option<Object> {
        match self {
            Value::Object(o) => Some(Rc::clone(o)),
            _ => None,
        }
    }

    /// Borrow the host handle
    #[must_use]
    pub fn as_host(&self) -> Option<&Rc<dyn HostObject>> {
        match self {
            Value::Host(h) => Some(h),
            _ => None,
        }
    }

    /// Downcast a host handle to its concrete type
    #[must_use]
    pub fn downcast_host<T: 'static>(&self) -> Option<&T> {
        match self {
            Value::Host(h) => h.as_any().downcast_ref::<T>(),
            _ => None,
        }
    }

    /// Get the type name of this value
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Int(_) | Value::Float(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
            Value::Function(_) => "function",
            Value::Host(h) => h.type_name(),
        }
    }

    /// Convert to JSON, failing on values with no data representation
    pub fn to_json(&self) -> crate::Result<JsonValue> {
        self.to_json_at(0)
    }

    fn to_json_at(&self, depth: usize) -> crate::Result<JsonValue> {
        if depth > MAX_VALUE_NESTING {
            return Err(crate::error::operation_error(
                "value nesting too deep for JSON conversion",
            ));
        }
        match self {
            Value::Null => Ok(JsonValue::Null),
            Value::Bool(b) => Ok(JsonValue::Bool(*b)),
            Value::Int(i) => Ok(JsonValue::Number(JsonNumber::from(*i))),
            Value::Float(f) => JsonNumber::from_f64(*f)
                .map(JsonValue::Number)
                .ok_or_else(|| crate::error::operation_error(format!("Invalid float: {f}"))),
            Value::String(s) => Ok(JsonValue::String(s.clone())),
            Value::Array(arr) => {
                let json_arr: crate::Result<Vec<JsonValue>> =
                    arr.borrow().iter().map(|v| v.to_json_at(depth + 1)).collect();
                Ok(JsonValue::Array(json_arr?))
            }
            Value::Object(obj) => {
                let json_obj: crate::Result<serde_json::Map<String, JsonValue>> = obj
                    .borrow()
                    .iter()
                    .map(|(k, v)| v.to_json_at(depth + 1).map(|json_v| (k.clone(), json_v)))
                    .collect();
                Ok(JsonValue::Object(json_obj?))
            }
            Value::Function(func) => Err(crate::error::operation_error(format!(
                "function {} has no JSON representation",
                display_function_name(func.as_ref())
            ))),
            Value::Host(h) => Ok(h.to_json()),
        }
    }

    /// Convert to JSON for display, rendering functions as text and
    /// truncating nesting instead of failing
    #[must_use]
    pub fn to_json_lossy(&self) -> JsonValue {
        self.to_json_lossy_at(0)
    }

    fn to_json_lossy_at(&self, depth: usize) -> JsonValue {
        if depth > MAX_VALUE_NESTING {
            return JsonValue::Null;
        }
        match self {
            Value::Float(f) => JsonNumber::from_f64(*f)
                .map_or_else(|| JsonValue::String(format_number(*f)), JsonValue::Number),
            Value::Array(arr) => JsonValue::Array(
                arr.borrow()
                    .iter()
                    .map(|v| v.to_json_lossy_at(depth + 1))
                    .collect(),
            ),
            Value::Object(obj) => JsonValue::Object(
                obj.borrow()
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json_lossy_at(depth + 1)))
                    .collect(),
            ),
            Value::Function(func) => JsonValue::String(format!(
                "function {}",
                display_function_name(func.as_ref())
            )),
            other => other.to_json_at(depth).unwrap_or(JsonValue::Null),
        }
    }

    /// Create a value from JSON
    #[must_use]
    pub fn from_json(json: JsonValue) -> Self {
        match json {
            JsonValue::Null => Value::Null,
            JsonValue::Bool(b) => Value::Bool(b),
            JsonValue::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Int(i)
                } else {
                    Value::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            JsonValue::String(s) => Value::String(s),
            JsonValue::Array(arr) => Value::array(arr.into_iter().map(Value::from_json).collect()),
            JsonValue::Object(obj) => Value::object(
                obj.into_iter()
                    .map(|(k, v)| (k, Value::from_json(v)))
                    .collect(),
            ),
        }
    }

    fn write_display(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(n) => write!(f, "{}", format_number(*n)),
            Value::String(s) => write!(f, "{s}"),
            Value::Array(arr) => {
                if depth > MAX_VALUE_NESTING {
                    return write!(f, "...");
                }
                for (i, item) in arr.borrow().iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    if !item.is_null() {
                        item.write_display(f, depth + 1)?;
                    }
                }
                Ok(())
            }
            Value::Object(_) => write!(f, "[object Object]"),
            Value::Function(func) => {
                write!(f, "function {}", display_function_name(func.as_ref()))
            }
            Value::Host(h) => write!(f, "{}", h.display()),
        }
    }
}

fn display_function_name(func: &dyn Callable) -> &str {
    if func.name().is_empty() {
        "<anonymous>"
    } else {
        func.name()
    }
}

/// Format a float the way scripts print numbers: integral values without a
/// fractional part, non-finite values by name
#[must_use]
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 {
            "Infinity".to_string()
        } else {
            "-Infinity".to_string()
        }
    } else if n == 0.0 {
        "0".to_string()
    } else if n.fract() == 0.0 && n.abs() < 1e21 {
        format!("{n:.0}")
    } else {
        format!("{n}")
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "Null"),
            Value::Bool(b) => f.debug_tuple("Bool").field(b).finish(),
            Value::Int(i) => f.debug_tuple("Int").field(i).finish(),
            Value::Float(fl) => f.debug_tuple("Float").field(fl).finish(),
            Value::String(s) => f.debug_tuple("String").field(s).finish(),
            Value::Array(arr) => match arr.try_borrow() {
                Ok(items) => f.debug_tuple("Array").field(&*items).finish(),
                Err(_) => f.debug_tuple("Array").field(&"<borrowed>").finish(),
            },
            Value::Object(obj) => match obj.try_borrow() {
                Ok(entries) => f.debug_tuple("Object").field(&*entries).finish(),
                Err(_) => f.debug_tuple("Object").field(&"<borrowed>").finish(),
            },
            Value::Function(func) => f
                .debug_tuple("Function")
                .field(&display_function_name(func.as_ref()))
                .finish(),
            Value::Host(h) => f.debug_tuple("Host").field(h).finish(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_display(f, 0)
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => Rc::ptr_eq(a, b) || *a.borrow() == *b.borrow(),
            (Value::Object(a), Value::Object(b)) => {
                Rc::ptr_eq(a, b) || *a.borrow() == *b.borrow()
            }
            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
            (Value::Host(a), Value::Host(b)) => Rc::ptr_eq(a, b) || a.equals(b.as_ref()),
            // Cross-type numeric comparisons
            #[allow(clippy::cast_precision_loss)]
            (Value::Int(a), Value::Float(b)) => *a as f64 == *b,
            #[allow(clippy::cast_precision_loss)]
            (Value::Float(a), Value::Int(b)) => *a == *b as f64,
            _ => false,
        }
    }
}

impl serde::Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serde::Serialize::serialize(&self.to_json_lossy(), serializer)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::array(items)
    }
}

impl From<JsonValue> for Value {
    fn from(json: JsonValue) -> Self {
        Value::from_json(json)
    }
}

/// Truthiness as a dynamic language sees it
pub fn is_truthy(v: &Value) -> bool {
    match v {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Int(i) => *i != 0,
        Value::Float(f) => *f != 0.0 && !f.is_nan(),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) | Value::Function(_) | Value::Host(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Label;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_json_round_trip_preserves_structure() {
        let json = json!({"name": "Alice", "tags": ["a", "b"], "age": 30, "score": 1.5});
        let value = Value::from_json(json.clone());
        assert_eq!(value.to_json().unwrap(), json);
    }

    #[test]
    fn test_object_keeps_insertion_order() {
        let value = Value::from_json(json!({"z": 1, "a": 2, "m": 3}));
        let keys: Vec<String> = value.as_object().unwrap().borrow().keys().cloned().collect();
        assert_eq!(keys, vec!["z", "a", "m"]);
    }

    #[test]
    fn test_display_matches_script_conversions() {
        assert_eq!(Value::Float(3.0).to_string(), "3");
        assert_eq!(Value::Float(0.5).to_string(), "0.5");
        assert_eq!(Value::Float(f64::NAN).to_string(), "NaN");
        assert_eq!(
            Value::array(vec![Value::Int(1), Value::Null, Value::string("x")]).to_string(),
            "1,,x"
        );
        assert_eq!(Value::object(IndexMap::new()).to_string(), "[object Object]");
        assert_eq!(Value::host(Label::new("User")).to_string(), "User");
    }

    #[test]
    fn test_numeric_equality_crosses_representations() {
        assert_eq!(Value::Int(2), Value::Float(2.0));
        assert_ne!(Value::Int(2), Value::string("2"));
    }

    #[test]
    fn test_arrays_compare_by_content() {
        let a = Value::array(vec![Value::Int(1), Value::Int(2)]);
        let b = Value::array(vec![Value::Int(1), Value::Int(2)]);
        assert_eq!(a, b);
    }

    #[test]
    fn test_host_handles_compare_through_equals() {
        assert_eq!(Value::host(Label::new("User")), Value::host(Label::new("User")));
        assert_ne!(Value::host(Label::new("User")), Value::host(Label::new("Admin")));
    }

    #[test]
    fn test_truthiness() {
        assert!(!is_truthy(&Value::Null));
        assert!(!is_truthy(&Value::Int(0)));
        assert!(!is_truthy(&Value::string("")));
        assert!(!is_truthy(&Value::Float(f64::NAN)));
        assert!(is_truthy(&Value::array(vec![])));
        assert!(is_truthy(&Value::string("0")));
    }

    #[test]
    fn test_to_json_rejects_non_finite_floats() {
        assert!(Value::Float(f64::INFINITY).to_json().is_err());
        assert_eq!(
            Value::Float(f64::INFINITY).to_json_lossy(),
            json!("Infinity")
        );
    }

    #[test]
    fn test_as_i64_accepts_integral_floats_only() {
        assert_eq!(Value::Float(4.0).as_i64(), Some(4));
        assert_eq!(Value::Float(4.5).as_i64(), None);
        assert_eq!(Value::string("4").as_i64(), None);
    }
}
