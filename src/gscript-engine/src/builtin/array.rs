//! Array methods
//!
//! Callbacks receive `(element, index, array)`. Methods that call back into
//! script code iterate over a snapshot so callbacks may mutate the array.

use gscript_shared::value::Array;
use gscript_shared::{is_truthy, Value};

use super::{arg, function_arg, NativeKind};
use crate::error::{EvalError, Exec};
use crate::interpreter::Interpreter;
use crate::ops;

fn this_array(this: &Value, method: &str) -> Result<Array, EvalError> {
    this.as_array().ok_or_else(|| {
        EvalError::type_error(format!(
            "Array.prototype.{} called on {}",
            method,
            this.type_name()
        ))
    })
}

#[allow(clippy::cast_possible_wrap)]
fn index_value(i: usize) -> Value {
    Value::Int(i as i64)
}

fn length(arr: &Array) -> Value {
    index_value(arr.borrow().len())
}

fn array_push(_: &Interpreter, this: &Value, args: &[Value]) -> Exec<Value> {
    let arr = this_array(this, "push")?;
    arr.borrow_mut().extend_from_slice(args);
    Ok(length(&arr))
}

fn array_pop(_: &Interpreter, this: &Value, _: &[Value]) -> Exec<Value> {
    let arr = this_array(this, "pop")?;
    let last = arr.borrow_mut().pop();
    Ok(last.unwrap_or(Value::Null))
}

fn array_shift(_: &Interpreter, this: &Value, _: &[Value]) -> Exec<Value> {
    let arr = this_array(this, "shift")?;
    let mut items = arr.borrow_mut();
    if items.is_empty() {
        return Ok(Value::Null);
    }
    Ok(items.remove(0))
}

fn array_unshift(_: &Interpreter, this: &Value, args: &[Value]) -> Exec<Value> {
    let arr = this_array(this, "unshift")?;
    arr.borrow_mut().splice(0..0, args.iter().cloned());
    Ok(length(&arr))
}

fn array_join(_: &Interpreter, this: &Value, args: &[Value]) -> Exec<Value> {
    let arr = this_array(this, "join")?;
    let separator = match arg(args, 0) {
        Value::Null => ",".to_string(),
        other => other.to_string(),
    };
    let joined = arr
        .borrow()
        .iter()
        .map(|v| if v.is_null() { String::new() } else { v.to_string() })
        .collect::<Vec<_>>()
        .join(&separator);
    Ok(Value::String(joined))
}

fn array_slice(_: &Interpreter, this: &Value, args: &[Value]) -> Exec<Value> {
    let arr = this_array(this, "slice")?;
    let items = arr.borrow();
    let len = items.len();
    let start = ops::to_integer(&arg(args, 0)).map_or(0, |i| ops::relative_index(i, len));
    let end = match args.get(1) {
        None | Some(Value::Null) => len,
        Some(v) => ops::to_integer(v).map_or(len, |i| ops::relative_index(i, len)),
    };
    let slice = if start < end {
        items[start..end].to_vec()
    } else {
        Vec::new()
    };
    Ok(Value::array(slice))
}

fn position(arr: &Array, needle: &Value) -> Option<usize> {
    arr.borrow()
        .iter()
        .position(|item| ops::strict_equals(item, needle))
}

fn array_index_of(_: &Interpreter, this: &Value, args: &[Value]) -> Exec<Value> {
    let arr = this_array(this, "indexOf")?;
    Ok(position(&arr, &arg(args, 0)).map_or(Value::Int(-1), index_value))
}

fn array_includes(_: &Interpreter, this: &Value, args: &[Value]) -> Exec<Value> {
    let arr = this_array(this, "includes")?;
    Ok(Value::Bool(position(&arr, &arg(args, 0)).is_some()))
}

fn array_concat(_: &Interpreter, this: &Value, args: &[Value]) -> Exec<Value> {
    let arr = this_array(this, "concat")?;
    let mut items = arr.borrow().clone();
    for value in args {
        match value {
            Value::Array(other) => items.extend(other.borrow().iter().cloned()),
            other => items.push(other.clone()),
        }
    }
    Ok(Value::array(items))
}

fn array_reverse(_: &Interpreter, this: &Value, _: &[Value]) -> Exec<Value> {
    let arr = this_array(this, "reverse")?;
    arr.borrow_mut().reverse();
    Ok(this.clone())
}

/// Call `callback(item, index, array)` for each element of a snapshot
fn each<F>(interp: &Interpreter, this: &Value, callback: &Value, mut f: F) -> Exec<()>
where
    F: FnMut(Value, Value) -> Exec<bool>,
{
    let items = match this.as_array() {
        Some(arr) => arr.borrow().clone(),
        None => Vec::new(),
    };
    for (i, item) in items.into_iter().enumerate() {
        let result =
            interp.call_value(callback, Value::Null, &[item.clone(), index_value(i), this.clone()])?;
        if !f(item, result)? {
            break;
        }
    }
    Ok(())
}

fn array_map(interp: &Interpreter, this: &Value, args: &[Value]) -> Exec<Value> {
    this_array(this, "map")?;
    let callback = function_arg(args, 0, "map")?;
    let mut out = Vec::new();
    each(interp, this, &callback, |_, result| {
        out.push(result);
        Ok(true)
    })?;
    Ok(Value::array(out))
}

fn array_filter(interp: &Interpreter, this: &Value, args: &[Value]) -> Exec<Value> {
    this_array(this, "filter")?;
    let callback = function_arg(args, 0, "filter")?;
    let mut out = Vec::new();
    each(interp, this, &callback, |item, keep| {
        if is_truthy(&keep) {
            out.push(item);
        }
        Ok(true)
    })?;
    Ok(Value::array(out))
}

fn array_for_each(interp: &Interpreter, this: &Value, args: &[Value]) -> Exec<Value> {
    this_array(this, "forEach")?;
    let callback = function_arg(args, 0, "forEach")?;
    each(interp, this, &callback, |_, _| Ok(true))?;
    Ok(Value::Null)
}

fn array_find(interp: &Interpreter, this: &Value, args: &[Value]) -> Exec<Value> {
    this_array(this, "find")?;
    let callback = function_arg(args, 0, "find")?;
    let mut found = Value::Null;
    each(interp, this, &callback, |item, hit| {
        if is_truthy(&hit) {
            found = item;
            return Ok(false);
        }
        Ok(true)
    })?;
    Ok(found)
}

fn array_some(interp: &Interpreter, this: &Value, args: &[Value]) -> Exec<Value> {
    this_array(this, "some")?;
    let callback = function_arg(args, 0, "some")?;
    let mut any = false;
    each(interp, this, &callback, |_, hit| {
        any = is_truthy(&hit);
        Ok(!any)
    })?;
    Ok(Value::Bool(any))
}

fn array_every(interp: &Interpreter, this: &Value, args: &[Value]) -> Exec<Value> {
    this_array(this, "every")?;
    let callback = function_arg(args, 0, "every")?;
    let mut all = true;
    each(interp, this, &callback, |_, hit| {
        all = is_truthy(&hit);
        Ok(all)
    })?;
    Ok(Value::Bool(all))
}

fn array_reduce(interp: &Interpreter, this: &Value, args: &[Value]) -> Exec<Value> {
    let arr = this_array(this, "reduce")?;
    let callback = function_arg(args, 0, "reduce")?;
    let items = arr.borrow().clone();
    let mut items = items.into_iter().enumerate();

    let mut acc = match args.get(1) {
        Some(initial) => initial.clone(),
        None => match items.next() {
            Some((_, first)) => first,
            None => {
                return Err(EvalError::type_error(
                    "Reduce of empty array with no initial value",
                )
                .into())
            }
        },
    };
    for (i, item) in items {
        acc = interp.call_value(&callback, Value::Null, &[acc, item, index_value(i), this.clone()])?;
    }
    Ok(acc)
}

register!(NativeKind::ArrayMethod, "push", 1, array_push);
register!(NativeKind::ArrayMethod, "pop", 0, array_pop);
register!(NativeKind::ArrayMethod, "shift", 0, array_shift);
register!(NativeKind::ArrayMethod, "unshift", 1, array_unshift);
register!(NativeKind::ArrayMethod, "join", 1, array_join);
register!(NativeKind::ArrayMethod, "slice", 2, array_slice);
register!(NativeKind::ArrayMethod, "indexOf", 1, array_index_of);
register!(NativeKind::ArrayMethod, "includes", 1, array_includes);
register!(NativeKind::ArrayMethod, "concat", 1, array_concat);
register!(NativeKind::ArrayMethod, "reverse", 0, array_reverse);
register!(NativeKind::ArrayMethod, "map", 1, array_map);
register!(NativeKind::ArrayMethod, "filter", 1, array_filter);
register!(NativeKind::ArrayMethod, "forEach", 1, array_for_each);
register!(NativeKind::ArrayMethod, "find", 1, array_find);
register!(NativeKind::ArrayMethod, "some", 1, array_some);
register!(NativeKind::ArrayMethod, "every", 1, array_every);
register!(NativeKind::ArrayMethod, "reduce", 2, array_reduce);
