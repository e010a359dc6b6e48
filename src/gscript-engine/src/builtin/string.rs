//! String methods
//!
//! Positions are counted in characters, not bytes.

use gscript_shared::Value;

use super::{arg, NativeKind};
use crate::error::{EvalError, Exec};
use crate::interpreter::Interpreter;
use crate::ops;

fn this_str<'a>(this: &'a Value, method: &str) -> Result<&'a str, EvalError> {
    this.as_str().ok_or_else(|| {
        EvalError::type_error(format!(
            "String.prototype.{} called on {}",
            method,
            this.type_name()
        ))
    })
}

#[allow(clippy::cast_possible_wrap)]
fn char_index(s: &str, byte_index: usize) -> Value {
    Value::Int(s[..byte_index].chars().count() as i64)
}

fn substring_by_chars(s: &str, start: usize, end: usize) -> String {
    s.chars().skip(start).take(end.saturating_sub(start)).collect()
}

fn string_to_upper(_: &Interpreter, this: &Value, _: &[Value]) -> Exec<Value> {
    Ok(Value::String(this_str(this, "toUpperCase")?.to_uppercase()))
}

fn string_to_lower(_: &Interpreter, this: &Value, _: &[Value]) -> Exec<Value> {
    Ok(Value::String(this_str(this, "toLowerCase")?.to_lowercase()))
}

fn string_trim(_: &Interpreter, this: &Value, _: &[Value]) -> Exec<Value> {
    Ok(Value::string(this_str(this, "trim")?.trim()))
}

fn string_index_of(_: &Interpreter, this: &Value, args: &[Value]) -> Exec<Value> {
    let s = this_str(this, "indexOf")?;
    let needle = arg(args, 0).to_string();
    Ok(s.find(&needle).map_or(Value::Int(-1), |i| char_index(s, i)))
}

fn string_includes(_: &Interpreter, this: &Value, args: &[Value]) -> Exec<Value> {
    let s = this_str(this, "includes")?;
    Ok(Value::Bool(s.contains(&arg(args, 0).to_string())))
}

fn string_starts_with(_: &Interpreter, this: &Value, args: &[Value]) -> Exec<Value> {
    let s = this_str(this, "startsWith")?;
    Ok(Value::Bool(s.starts_with(&arg(args, 0).to_string())))
}

fn string_ends_with(_: &Interpreter, this: &Value, args: &[Value]) -> Exec<Value> {
    let s = this_str(this, "endsWith")?;
    Ok(Value::Bool(s.ends_with(&arg(args, 0).to_string())))
}

fn string_substring(_: &Interpreter, this: &Value, args: &[Value]) -> Exec<Value> {
    let s = this_str(this, "substring")?;
    let len = s.chars().count();
    let clamp = |v: &Value, default: usize| match v {
        Value::Null => default,
        other => ops::to_integer(other).map_or(0, |i| ops::relative_index(i.max(0), len)),
    };
    let mut start = clamp(&arg(args, 0), 0);
    let mut end = clamp(&arg(args, 1), len);
    if start > end {
        std::mem::swap(&mut start, &mut end);
    }
    Ok(Value::String(substring_by_chars(s, start, end)))
}

fn string_slice(_: &Interpreter, this: &Value, args: &[Value]) -> Exec<Value> {
    let s = this_str(this, "slice")?;
    let len = s.chars().count();
    let start = ops::to_integer(&arg(args, 0)).map_or(0, |i| ops::relative_index(i, len));
    let end = match args.get(1) {
        None | Some(Value::Null) => len,
        Some(v) => ops::to_integer(v).map_or(len, |i| ops::relative_index(i, len)),
    };
    Ok(Value::String(substring_by_chars(s, start, end)))
}

fn string_split(_: &Interpreter, this: &Value, args: &[Value]) -> Exec<Value> {
    let s = this_str(this, "split")?;
    let parts: Vec<Value> = match arg(args, 0) {
        Value::Null => vec![Value::string(s)],
        sep => {
            let sep = sep.to_string();
            if sep.is_empty() {
                s.chars().map(|c| Value::String(c.to_string())).collect()
            } else {
                s.split(sep.as_str()).map(Value::string).collect()
            }
        }
    };
    Ok(Value::array(parts))
}

fn string_char_at(_: &Interpreter, this: &Value, args: &[Value]) -> Exec<Value> {
    let s = this_str(this, "charAt")?;
    let index = ops::to_integer(&arg(args, 0)).unwrap_or(0);
    let c = usize::try_from(index).ok().and_then(|i| s.chars().nth(i));
    Ok(Value::String(c.map(String::from).unwrap_or_default()))
}

fn string_replace(_: &Interpreter, this: &Value, args: &[Value]) -> Exec<Value> {
    let s = this_str(this, "replace")?;
    let pattern = arg(args, 0).to_string();
    let replacement = arg(args, 1).to_string();
    Ok(Value::String(s.replacen(&pattern, &replacement, 1)))
}

fn string_repeat(_: &Interpreter, this: &Value, args: &[Value]) -> Exec<Value> {
    let s = this_str(this, "repeat")?;
    let count = ops::to_integer(&arg(args, 0))
        .and_then(|n| usize::try_from(n).ok())
        .ok_or_else(|| EvalError::type_error("Invalid count value"))?;
    Ok(Value::String(s.repeat(count)))
}

fn string_to_string(_: &Interpreter, this: &Value, _: &[Value]) -> Exec<Value> {
    Ok(Value::string(this_str(this, "toString")?))
}

register!(NativeKind::StringMethod, "toUpperCase", 0, string_to_upper);
register!(NativeKind::StringMethod, "toLowerCase", 0, string_to_lower);
register!(NativeKind::StringMethod, "trim", 0, string_trim);
register!(NativeKind::StringMethod, "indexOf", 1, string_index_of);
register!(NativeKind::StringMethod, "includes", 1, string_includes);
register!(NativeKind::StringMethod, "startsWith", 1, string_starts_with);
register!(NativeKind::StringMethod, "endsWith", 1, string_ends_with);
register!(NativeKind::StringMethod, "substring", 2, string_substring);
register!(NativeKind::StringMethod, "slice", 2, string_slice);
register!(NativeKind::StringMethod, "split", 1, string_split);
register!(NativeKind::StringMethod, "charAt", 1, string_char_at);
register!(NativeKind::StringMethod, "replace", 2, string_replace);
register!(NativeKind::StringMethod, "repeat", 1, string_repeat);
register!(NativeKind::StringMethod, "toString", 0, string_to_string);
