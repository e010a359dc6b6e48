//! The `log` handle bound into every invocation

use std::any::Any;

use log::Level;

use gscript_shared::{HostObject, Value};

/// Log target used for messages emitted by scripts
pub const SCRIPT_LOG_TARGET: &str = "graphscript::script";

/// Script-facing logger: `log.info('found %s nodes', n)`
#[derive(Debug, Default, Clone, Copy)]
pub struct ScriptLogger;

impl ScriptLogger {
    /// Create a logger handle
    pub fn new() -> Self {
        Self
    }
}

/// Substitute each `%s` in `format` with the next argument
pub fn format_message(format: &str, args: &[Value]) -> String {
    let mut args = args.iter();
    let mut parts = format.split("%s");
    let mut message = parts.next().unwrap_or_default().to_string();
    for part in parts {
        match args.next() {
            Some(arg) => message.push_str(&arg.to_string()),
            None => message.push_str("%s"),
        }
        message.push_str(part);
    }
    message
}

impl HostObject for ScriptLogger {
    fn type_name(&self) -> &'static str {
        "Log"
    }

    fn call_method(&self, name: &str, args: &[Value]) -> Option<gscript_shared::Result<Value>> {
        let level = match name {
            "debug" => Level::Debug,
            "info" => Level::Info,
            "warn" => Level::Warn,
            "error" => Level::Error,
            _ => return None,
        };
        let (format, rest) = match args.split_first() {
            Some((first, rest)) => (first.to_string(), rest),
            None => (String::new(), args),
        };
        log::log!(target: SCRIPT_LOG_TARGET, level, "{}", format_message(&format, rest));
        Some(Ok(Value::Null))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_message() {
        assert_eq!(
            format_message("found %s nodes in %s", &[Value::Int(3), Value::string("db")]),
            "found 3 nodes in db"
        );
        assert_eq!(format_message("%s and %s", &[Value::Int(1)]), "1 and %s");
        assert_eq!(format_message("plain", &[Value::Int(1)]), "plain");
    }

    #[test]
    fn test_methods() {
        let logger = ScriptLogger::new();
        assert_eq!(
            logger.call_method("warn", &[Value::string("x")]).unwrap().unwrap(),
            Value::Null
        );
        assert!(logger.call_method("trace", &[]).is_none());
    }
}
