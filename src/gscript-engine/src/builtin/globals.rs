//! Global functions and namespace objects

use indexmap::IndexMap;

use gscript_shared::graph::{label_name, relationship_type_name};
use gscript_shared::{Label, RelationshipType, Value};

use super::{arg, NativeKind};
use crate::error::{EvalError, Exec};
use crate::interpreter::Interpreter;
use crate::ops;

fn native_string(_: &Interpreter, _: &Value, args: &[Value]) -> Exec<Value> {
    Ok(Value::String(arg(args, 0).to_string()))
}

fn native_number(_: &Interpreter, _: &Value, args: &[Value]) -> Exec<Value> {
    Ok(match arg(args, 0) {
        v @ (Value::Int(_) | Value::Float(_)) => v,
        other => ops::number(ops::to_number(&other)),
    })
}

fn native_label(_: &Interpreter, _: &Value, args: &[Value]) -> Exec<Value> {
    let name = label_name(&arg(args, 0))
        .ok_or_else(|| EvalError::type_error("Label expects a name"))?;
    Ok(Value::host(Label::new(name)))
}

fn native_relationship_type(_: &Interpreter, _: &Value, args: &[Value]) -> Exec<Value> {
    let name = relationship_type_name(&arg(args, 0))
        .ok_or_else(|| EvalError::type_error("RelationshipType expects a name"))?;
    Ok(Value::host(RelationshipType::new(name)))
}

/// `Error(message)`: a plain object with `name` and `message`
fn native_error(_: &Interpreter, _: &Value, args: &[Value]) -> Exec<Value> {
    let mut fields = IndexMap::new();
    fields.insert("name".to_string(), Value::string("Error"));
    fields.insert("message".to_string(), Value::String(arg(args, 0).to_string()));
    Ok(Value::object(fields))
}

fn native_object_keys(_: &Interpreter, _: &Value, args: &[Value]) -> Exec<Value> {
    let keys = match arg(args, 0) {
        Value::Object(obj) => obj.borrow().keys().map(|k| Value::string(k.as_str())).collect(),
        Value::Array(arr) => (0..arr.borrow().len())
            .map(|i| Value::String(i.to_string()))
            .collect(),
        _ => Vec::new(),
    };
    Ok(Value::array(keys))
}

fn native_array_is_array(_: &Interpreter, _: &Value, args: &[Value]) -> Exec<Value> {
    Ok(Value::Bool(matches!(args.first(), Some(Value::Array(_)))))
}

fn native_json_stringify(_: &Interpreter, _: &Value, args: &[Value]) -> Exec<Value> {
    let json = arg(args, 0).to_json_lossy();
    let indent = ops::to_integer(&arg(args, 2)).unwrap_or(0);
    let text = if indent > 0 {
        serde_json::to_string_pretty(&json)
    } else {
        serde_json::to_string(&json)
    }
    .map_err(|e| EvalError::type_error(e.to_string()))?;
    Ok(Value::String(text))
}

fn native_json_parse(_: &Interpreter, _: &Value, args: &[Value]) -> Exec<Value> {
    let text = arg(args, 0).to_string();
    let json: serde_json::Value = serde_json::from_str(&text)
        .map_err(|e| EvalError::type_error(format!("JSON.parse: {}", e)))?;
    Ok(Value::from_json(json))
}

fn math_unary(args: &[Value], f: fn(f64) -> f64) -> Value {
    ops::number(f(ops::to_number(&arg(args, 0))))
}

fn native_math_floor(_: &Interpreter, _: &Value, args: &[Value]) -> Exec<Value> {
    Ok(math_unary(args, f64::floor))
}

fn native_math_ceil(_: &Interpreter, _: &Value, args: &[Value]) -> Exec<Value> {
    Ok(math_unary(args, f64::ceil))
}

fn native_math_round(_: &Interpreter, _: &Value, args: &[Value]) -> Exec<Value> {
    Ok(math_unary(args, |f| (f + 0.5).floor()))
}

fn native_math_abs(_: &Interpreter, _: &Value, args: &[Value]) -> Exec<Value> {
    Ok(math_unary(args, f64::abs))
}

fn native_math_max(_: &Interpreter, _: &Value, args: &[Value]) -> Exec<Value> {
    let max = args
        .iter()
        .map(ops::to_number)
        .fold(f64::NEG_INFINITY, |acc, n| if n.is_nan() || acc.is_nan() { f64::NAN } else { acc.max(n) });
    Ok(ops::number(max))
}

fn native_math_min(_: &Interpreter, _: &Value, args: &[Value]) -> Exec<Value> {
    let min = args
        .iter()
        .map(ops::to_number)
        .fold(f64::INFINITY, |acc, n| if n.is_nan() || acc.is_nan() { f64::NAN } else { acc.min(n) });
    Ok(ops::number(min))
}

register!(NativeKind::Global, "String", 1, native_string);
register!(NativeKind::Global, "Number", 1, native_number);
register!(NativeKind::Global, "Label", 1, native_label);
register!(NativeKind::Global, "RelationshipType", 1, native_relationship_type);
register!(NativeKind::Global, "Error", 1, native_error);
register!(NativeKind::Namespace("Object"), "keys", 1, native_object_keys);
register!(NativeKind::Namespace("Array"), "isArray", 1, native_array_is_array);
register!(NativeKind::Namespace("JSON"), "stringify", 1, native_json_stringify);
register!(NativeKind::Namespace("JSON"), "parse", 1, native_json_parse);
register!(NativeKind::Namespace("Math"), "floor", 1, native_math_floor);
register!(NativeKind::Namespace("Math"), "ceil", 1, native_math_ceil);
register!(NativeKind::Namespace("Math"), "round", 1, native_math_round);
register!(NativeKind::Namespace("Math"), "abs", 1, native_math_abs);
register!(NativeKind::Namespace("Math"), "max", 2, native_math_max);
register!(NativeKind::Namespace("Math"), "min", 2, native_math_min);
