//! Binding stored source into an interpreter
//!
//! A stored definition is a function expression. Binding wraps it as
//!
//! ```text
//! function <name>() { return (<source>).apply(this, arguments) }
//! ```
//!
//! and evaluates the wrapper into the interpreter's global scope, replacing
//! whatever `<name>` was bound to before.

use log::{debug, trace};
use sha2::{Digest, Sha256};

use gscript_engine::{EvalError, ScriptEngine};
use gscript_parser::ScriptParser;
use gscript_shared::Value;

use crate::error::{Result, ScriptError};
use crate::pool::ScriptContext;

/// A bound function kept for reuse while its source is unchanged
#[derive(Debug, Clone)]
pub struct CompiledFunction {
    digest: String,
    function: Value,
}

/// Wrapper source that binds `source` under `name`
pub fn wrapper_source(name: &str, source: &str) -> String {
    format!("function {name}() {{ return ({source}).apply(this, arguments) }}")
}

/// Hex SHA-256 of a function source
pub fn source_digest(source: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(source.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Check that `code` compiles as a function body, without running it
pub fn validate(parser: &ScriptParser, name: &str, code: &str) -> Result<()> {
    parser
        .parse(&format!("function(){{ {code} }}"))
        .map(|_| ())
        .map_err(|e| ScriptError::compile(name, EvalError::from(e)))
}

/// Bind `source` as the global function `name` in `context`
pub fn bind(context: &mut ScriptContext, name: &str, source: &str) -> Result<()> {
    let Some(cache) = context.compiled.as_mut() else {
        return bind_fresh(context, name, source).map(|_| ());
    };

    let digest = source_digest(source);
    if let Some(cached) = cache.get(name).filter(|c| c.digest == digest) {
        trace!("Reusing compiled function '{}'", name);
        let function = cached.function.clone();
        context.interpreter().bind(name, function);
        return Ok(());
    }

    let function = bind_fresh(context, name, source)?;
    if let Some(cache) = context.compiled.as_mut() {
        cache.put(name.to_string(), CompiledFunction { digest, function });
    }
    Ok(())
}

fn bind_fresh(context: &ScriptContext, name: &str, source: &str) -> Result<Value> {
    let interpreter = context.interpreter();
    interpreter
        .eval(&wrapper_source(name, source))
        .map_err(|e| ScriptError::compile(name, e))?;
    debug!("Bound function '{}' ({} bytes of source)", name, source.len());
    interpreter
        .get_global(name)
        .ok_or_else(|| ScriptError::compile(name, EvalError::Reference(name.to_string())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScriptsConfig;
    use crate::pool::{ContextId, InterpreterPool};

    #[test]
    fn test_wrapper_source() {
        assert_eq!(
            wrapper_source("greet", "function(who){ return 'hi ' + who }"),
            "function greet() { return (function(who){ return 'hi ' + who }).apply(this, arguments) }"
        );
    }

    #[test]
    fn test_digest_is_hex_sha256() {
        let digest = source_digest("");
        assert_eq!(
            digest,
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_ne!(source_digest("a"), source_digest("b"));
    }

    #[test]
    fn test_validate() {
        let parser = ScriptParser::new();
        assert!(validate(&parser, "ok", "function(x) { return x * 2 }").is_ok());
        let err = validate(&parser, "bad", "not valid syntax (").unwrap_err();
        assert!(matches!(err, ScriptError::Compile { ref name, .. } if name == "bad"));
    }

    #[test]
    fn test_bind_replaces_previous_definition() {
        let mut pool = InterpreterPool::default();
        let context = pool.get_or_create(ContextId(1)).unwrap();

        bind(context, "f", "function(x) { return x + 1 }").unwrap();
        let first = context.interpreter().invoke("f", &[Value::Int(1)]).unwrap();
        bind(context, "f", "function(x) { return x + 2 }").unwrap();
        let second = context.interpreter().invoke("f", &[Value::Int(1)]).unwrap();

        assert_eq!(first, Value::Int(2));
        assert_eq!(second, Value::Int(3));
    }

    #[test]
    fn test_bind_reports_compile_errors() {
        let mut pool = InterpreterPool::default();
        let context = pool.get_or_create(ContextId(1)).unwrap();
        let err = bind(context, "broken", "function( {").unwrap_err();
        assert!(err.is_compile_error());
    }

    #[test]
    fn test_cache_reuses_until_source_changes() {
        let config = ScriptsConfig {
            reuse_compiled_functions: true,
            ..ScriptsConfig::default()
        };
        let mut pool = InterpreterPool::new(&config);
        let context = pool.get_or_create(ContextId(1)).unwrap();

        bind(context, "f", "function() { return 1 }").unwrap();
        let bound = context.interpreter().get_global("f").unwrap();
        bind(context, "f", "function() { return 1 }").unwrap();
        assert_eq!(context.interpreter().get_global("f").unwrap(), bound);
        assert_eq!(context.cached_functions(), 1);

        bind(context, "f", "function() { return 2 }").unwrap();
        assert_ne!(context.interpreter().get_global("f").unwrap(), bound);
        assert_eq!(context.interpreter().invoke("f", &[]).unwrap(), Value::Int(2));
    }
}
