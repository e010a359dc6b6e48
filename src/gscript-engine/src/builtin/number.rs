//! Number methods

use gscript_shared::Value;

use super::{arg, NativeKind};
use crate::error::{EvalError, Exec};
use crate::interpreter::Interpreter;
use crate::ops;

fn number_to_string(_: &Interpreter, this: &Value, _: &[Value]) -> Exec<Value> {
    Ok(Value::String(this.to_string()))
}

fn number_to_fixed(_: &Interpreter, this: &Value, args: &[Value]) -> Exec<Value> {
    let digits = match arg(args, 0) {
        Value::Null => 0,
        other => ops::to_integer(&other)
            .and_then(|d| usize::try_from(d).ok())
            .filter(|d| *d <= 100)
            .ok_or_else(|| EvalError::type_error("toFixed() digits must be between 0 and 100"))?,
    };
    Ok(Value::String(format!("{:.*}", digits, ops::to_number(this))))
}

register!(NativeKind::NumberMethod, "toString", 0, number_to_string);
register!(NativeKind::NumberMethod, "toFixed", 1, number_to_fixed);
