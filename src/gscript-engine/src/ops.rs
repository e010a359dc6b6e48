//! Operator semantics and value conversions

use std::rc::Rc;

use gscript_parser::BinaryOperator;
use gscript_shared::Value;

use crate::error::EvalError;

/// Numeric conversion used by arithmetic and relational operators
#[allow(clippy::cast_precision_loss)]
pub(crate) fn to_number(value: &Value) -> f64 {
    match value {
        Value::Null => 0.0,
        Value::Bool(b) => f64::from(u8::from(*b)),
        Value::Int(i) => *i as f64,
        Value::Float(f) => *f,
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                0.0
            } else {
                trimmed.parse().unwrap_or(f64::NAN)
            }
        }
        Value::Array(_) | Value::Object(_) | Value::Function(_) | Value::Host(_) => f64::NAN,
    }
}

/// Number value from a float, preferring `Int` for integral results
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
pub(crate) fn number(f: f64) -> Value {
    if f.fract() == 0.0 && f.abs() < 9.007_199_254_740_992e15 {
        Value::Int(f as i64)
    } else {
        Value::Float(f)
    }
}

/// Integer view used for indices and counts
#[allow(clippy::cast_possible_truncation)]
pub(crate) fn to_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Int(i) => Some(*i),
        other => {
            let f = to_number(other);
            (!f.is_nan()).then(|| f.trunc() as i64)
        }
    }
}

/// Resolve a possibly negative relative index against `len`, clamped
#[allow(clippy::cast_possible_wrap, clippy::cast_sign_loss)]
pub(crate) fn relative_index(index: i64, len: usize) -> usize {
    let len = len as i64;
    let resolved = if index < 0 { len + index } else { index };
    resolved.clamp(0, len) as usize
}

/// Script-visible type name, as `typeof` reports it
pub(crate) fn type_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "undefined",
        Value::Bool(_) => "boolean",
        Value::Int(_) | Value::Float(_) => "number",
        Value::String(_) => "string",
        Value::Function(_) => "function",
        Value::Array(_) | Value::Object(_) | Value::Host(_) => "object",
    }
}

fn is_numeric(value: &Value) -> bool {
    matches!(value, Value::Int(_) | Value::Float(_))
}

/// Identity equality: same tag, same contents for primitives, same
/// allocation for arrays, objects and functions
pub(crate) fn strict_equals(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Array(a), Value::Array(b)) => Rc::ptr_eq(a, b),
        (Value::Object(a), Value::Object(b)) => Rc::ptr_eq(a, b),
        (a, b) if is_numeric(a) && is_numeric(b) => to_number(a) == to_number(b),
        (a, b) if std::mem::discriminant(a) == std::mem::discriminant(b) => a == b,
        _ => false,
    }
}

/// Equality with the usual coercions between numbers, strings and booleans
pub(crate) fn loose_equals(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Null, Value::Null) => true,
        (Value::Null, _) | (_, Value::Null) => false,
        (Value::Bool(_), _) | (_, Value::Bool(_)) => {
            if let (Value::Bool(a), Value::Bool(b)) = (left, right) {
                return a == b;
            }
            to_number(left) == to_number(right)
        }
        (Value::String(_), b) if is_numeric(b) => to_number(left) == to_number(right),
        (a, Value::String(_)) if is_numeric(a) => to_number(left) == to_number(right),
        (Value::String(a), Value::Host(_)) | (Value::Host(_), Value::String(a)) => {
            let other = if matches!(left, Value::Host(_)) { left } else { right };
            *a == other.to_string()
        }
        _ => strict_equals(left, right),
    }
}

fn compare(left: &Value, right: &Value) -> Option<std::cmp::Ordering> {
    match (left, right) {
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
        _ => to_number(left).partial_cmp(&to_number(right)),
    }
}

fn arithmetic(
    left: &Value,
    right: &Value,
    checked: fn(i64, i64) -> Option<i64>,
    float: fn(f64, f64) -> f64,
) -> Value {
    if let (Value::Int(a), Value::Int(b)) = (left, right) {
        if let Some(result) = checked(*a, *b) {
            return Value::Int(result);
        }
    }
    Value::Float(float(to_number(left), to_number(right)))
}

fn add(left: &Value, right: &Value) -> Value {
    let stringy = |v: &Value| {
        matches!(
            v,
            Value::String(_) | Value::Array(_) | Value::Object(_) | Value::Host(_) | Value::Function(_)
        )
    };
    if stringy(left) || stringy(right) {
        return Value::String(format!("{}{}", left, right));
    }
    arithmetic(left, right, i64::checked_add, |a, b| a + b)
}

fn divide(left: &Value, right: &Value) -> Value {
    if let (Value::Int(a), Value::Int(b)) = (left, right) {
        if *b != 0 && a.checked_rem(*b) == Some(0) {
            if let Some(q) = a.checked_div(*b) {
                return Value::Int(q);
            }
        }
    }
    Value::Float(to_number(left) / to_number(right))
}

fn remainder(left: &Value, right: &Value) -> Value {
    if let (Value::Int(a), Value::Int(b)) = (left, right) {
        if let Some(r) = a.checked_rem(*b) {
            return Value::Int(r);
        }
    }
    Value::Float(to_number(left) % to_number(right))
}

/// Apply a binary operator to two evaluated operands
pub(crate) fn binary(op: BinaryOperator, left: &Value, right: &Value) -> Result<Value, EvalError> {
    use std::cmp::Ordering::{Equal, Greater, Less};

    let value = match op {
        BinaryOperator::Add => add(left, right),
        BinaryOperator::Sub => arithmetic(left, right, i64::checked_sub, |a, b| a - b),
        BinaryOperator::Mul => arithmetic(left, right, i64::checked_mul, |a, b| a * b),
        BinaryOperator::Div => divide(left, right),
        BinaryOperator::Mod => remainder(left, right),
        BinaryOperator::Eq => Value::Bool(loose_equals(left, right)),
        BinaryOperator::Ne => Value::Bool(!loose_equals(left, right)),
        BinaryOperator::StrictEq => Value::Bool(strict_equals(left, right)),
        BinaryOperator::StrictNe => Value::Bool(!strict_equals(left, right)),
        BinaryOperator::Lt => Value::Bool(compare(left, right) == Some(Less)),
        BinaryOperator::Le => Value::Bool(matches!(compare(left, right), Some(Less | Equal))),
        BinaryOperator::Gt => Value::Bool(compare(left, right) == Some(Greater)),
        BinaryOperator::Ge => Value::Bool(matches!(compare(left, right), Some(Greater | Equal))),
    };
    Ok(value)
}

/// Unary minus keeping integers integral where possible
pub(crate) fn negate(value: &Value) -> Value {
    match value {
        Value::Int(i) => i
            .checked_neg()
            .map_or_else(|| Value::Float(-to_number(value)), Value::Int),
        other => Value::Float(-to_number(other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(v: &str) -> Value {
        Value::string(v)
    }

    #[test]
    fn test_add_concatenates_strings() {
        assert_eq!(binary(BinaryOperator::Add, &s("hi "), &s("bob")).unwrap(), s("hi bob"));
        assert_eq!(binary(BinaryOperator::Add, &s("n"), &Value::Int(1)).unwrap(), s("n1"));
        assert_eq!(
            binary(BinaryOperator::Add, &Value::Int(1), &Value::Int(2)).unwrap(),
            Value::Int(3)
        );
    }

    #[test]
    fn test_integer_overflow_becomes_float() {
        let result = binary(BinaryOperator::Add, &Value::Int(i64::MAX), &Value::Int(1)).unwrap();
        assert!(matches!(result, Value::Float(_)));
    }

    #[test]
    fn test_division() {
        assert_eq!(
            binary(BinaryOperator::Div, &Value::Int(6), &Value::Int(3)).unwrap(),
            Value::Int(2)
        );
        assert_eq!(
            binary(BinaryOperator::Div, &Value::Int(1), &Value::Int(2)).unwrap(),
            Value::Float(0.5)
        );
        let inf = binary(BinaryOperator::Div, &Value::Int(1), &Value::Int(0)).unwrap();
        assert_eq!(inf, Value::Float(f64::INFINITY));
    }

    #[test]
    fn test_equality() {
        assert!(loose_equals(&Value::Int(1), &Value::Float(1.0)));
        assert!(loose_equals(&s("1"), &Value::Int(1)));
        assert!(!strict_equals(&s("1"), &Value::Int(1)));
        assert!(strict_equals(&Value::Int(2), &Value::Float(2.0)));
        assert!(loose_equals(&Value::Null, &Value::Null));
        assert!(!loose_equals(&Value::Null, &Value::Int(0)));

        let a = Value::array(vec![Value::Int(1)]);
        let b = Value::array(vec![Value::Int(1)]);
        assert!(!strict_equals(&a, &b));
        assert!(strict_equals(&a, &a.clone()));
    }

    #[test]
    fn test_relational() {
        assert_eq!(
            binary(BinaryOperator::Lt, &s("a"), &s("b")).unwrap(),
            Value::Bool(true)
        );
        assert_eq!(
            binary(BinaryOperator::Ge, &Value::Int(2), &Value::Float(2.0)).unwrap(),
            Value::Bool(true)
        );
        assert_eq!(
            binary(BinaryOperator::Lt, &Value::Float(f64::NAN), &Value::Int(1)).unwrap(),
            Value::Bool(false)
        );
    }

    #[test]
    fn test_relative_index() {
        assert_eq!(relative_index(-1, 3), 2);
        assert_eq!(relative_index(10, 3), 3);
        assert_eq!(relative_index(-10, 3), 0);
    }
}
