//! Calling a bound function

use log::trace;

use gscript_engine::{Interpreter, ScriptEngine};
use gscript_shared::Value;

use crate::error::{Result, ScriptError};

/// Bind the per-call `db` and `log` handles, then call `name` with `args`
pub fn invoke(
    interpreter: &Interpreter,
    db: Value,
    log: Value,
    name: &str,
    args: &[Value],
) -> Result<Value> {
    interpreter.bind("db", db);
    interpreter.bind("log", log);
    trace!("Calling '{}' with {} argument(s)", name, args.len());
    interpreter
        .invoke(name, args)
        .map_err(|e| ScriptError::invocation(name, e))
}

/// Positional arguments from an optional parameter list; `None` means none
pub fn arguments(params: Option<Vec<Value>>) -> Vec<Value> {
    params.unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use gscript_engine::EvalError;

    #[test]
    fn test_handles_are_bound_before_the_call() {
        let interp = Interpreter::default();
        interp.eval("function who() { return db + '/' + log }").unwrap();
        let value = invoke(
            &interp,
            Value::string("graph"),
            Value::string("logger"),
            "who",
            &[],
        )
        .unwrap();
        assert_eq!(value, Value::string("graph/logger"));
    }

    #[test]
    fn test_errors_become_invocation_errors() {
        let interp = Interpreter::default();
        interp.eval("function fail(x) { throw 'bad ' + x }").unwrap();
        let err = invoke(&interp, Value::Null, Value::Null, "fail", &[Value::Int(1)]).unwrap_err();
        match err {
            ScriptError::Invocation { name, source } => {
                assert_eq!(name, "fail");
                assert!(matches!(source, EvalError::Thrown { ref message, .. } if message == "bad 1"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_missing_params_mean_no_arguments() {
        assert!(arguments(None).is_empty());
        assert_eq!(arguments(Some(vec![Value::Int(1)])).len(), 1);
    }
}
