//! Native functions
//!
//! Natives are registered with `inventory::submit!` next to their
//! implementation and collected into a [`NativeRegistry`] on first use.
//! Each registration says where the native lives: as a global, inside a
//! namespace object such as `JSON`, or as a method of arrays, strings,
//! numbers or functions.

use std::collections::HashMap;
use std::sync::OnceLock;

use gscript_shared::Value;

use crate::error::{EvalError, Exec};
use crate::interpreter::Interpreter;

/// Submit a native to the registry
macro_rules! register {
    ($kind:expr, $name:literal, $arity:literal, $func:path) => {
        inventory::submit! {
            $crate::builtin::NativeRegistration {
                name: $name,
                kind: $kind,
                arity: $arity,
                func: $func,
            }
        }
    };
}

mod array;
mod function;
mod globals;
mod number;
mod string;

/// Native implementation: interpreter, receiver (`this`), arguments
pub(crate) type NativeFn = fn(&Interpreter, &Value, &[Value]) -> Exec<Value>;

/// Where a native is installed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum NativeKind {
    /// Global function
    Global,
    /// Property of a global namespace object
    Namespace(&'static str),
    /// Method on arrays
    ArrayMethod,
    /// Method on strings
    StringMethod,
    /// Method on numbers
    NumberMethod,
    /// Method on functions
    FunctionMethod,
}

pub(crate) struct NativeRegistration {
    pub(crate) name: &'static str,
    pub(crate) kind: NativeKind,
    pub(crate) arity: usize,
    pub(crate) func: NativeFn,
}

inventory::collect!(NativeRegistration);

/// Lookup table over every submitted native
pub(crate) struct NativeRegistry {
    entries: HashMap<(NativeKind, &'static str), &'static NativeRegistration>,
}

impl std::fmt::Debug for NativeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "NativeRegistry {{ natives: {} }}", self.entries.len())
    }
}

impl NativeRegistry {
    fn new() -> Self {
        let mut entries = HashMap::new();
        for native in inventory::iter::<NativeRegistration> {
            entries.insert((native.kind, native.name), native);
        }
        Self { entries }
    }

    /// Process-wide registry
    pub(crate) fn global() -> &'static NativeRegistry {
        static REGISTRY: OnceLock<NativeRegistry> = OnceLock::new();
        REGISTRY.get_or_init(NativeRegistry::new)
    }

    /// Find a native by placement and name
    pub(crate) fn get(&self, kind: NativeKind, name: &str) -> Option<&'static NativeRegistration> {
        self.entries.get(&(kind, name)).copied()
    }

    /// Every registered native
    pub(crate) fn iter(&self) -> impl Iterator<Item = &'static NativeRegistration> + '_ {
        self.entries.values().copied()
    }

    /// Number of registered natives
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Argument `i`, or `null` when absent
pub(crate) fn arg(args: &[Value], i: usize) -> Value {
    args.get(i).cloned().unwrap_or(Value::Null)
}

/// Argument `i` as a function, or a type error naming the method
pub(crate) fn function_arg(args: &[Value], i: usize, method: &str) -> Result<Value, EvalError> {
    match args.get(i) {
        Some(f @ Value::Function(_)) => Ok(f.clone()),
        Some(other) => Err(EvalError::type_error(format!(
            "{} is not a function (in {})",
            other.type_name(),
            method
        ))),
        None => Err(EvalError::type_error(format!(
            "{} requires a callback",
            method
        ))),
    }
}
