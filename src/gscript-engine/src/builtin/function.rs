//! Function methods: `apply` and `call`

use gscript_shared::Value;

use super::{arg, NativeKind};
use crate::error::{EvalError, Exec};
use crate::interpreter::Interpreter;

/// `f.apply(thisArg, argsArray)`; a missing or null array means no arguments
fn function_apply(interp: &Interpreter, this: &Value, args: &[Value]) -> Exec<Value> {
    let call_args = match arg(args, 1) {
        Value::Null => Vec::new(),
        Value::Array(items) => items.borrow().clone(),
        other => {
            return Err(EvalError::type_error(format!(
                "apply expects an array of arguments, got {}",
                other.type_name()
            ))
            .into())
        }
    };
    interp.call_value(this, arg(args, 0), &call_args)
}

/// `f.call(thisArg, ...args)`
fn function_call(interp: &Interpreter, this: &Value, args: &[Value]) -> Exec<Value> {
    let rest = args.get(1..).unwrap_or_default();
    interp.call_value(this, arg(args, 0), rest)
}

register!(NativeKind::FunctionMethod, "apply", 2, function_apply);
register!(NativeKind::FunctionMethod, "call", 1, function_call);
