//! Function values
//!
//! Script functions are closures over a scope; natives are plain function
//! pointers registered through the builtin registry. Both travel as
//! `Value::Function(Rc<dyn Callable>)` and are recovered by downcasting.

use std::any::Any;
use std::fmt;
use std::rc::Rc;

use gscript_parser::FunctionDef;
use gscript_shared::{Callable, Value};

use crate::builtin::NativeFn;
use crate::scope::Scope;

/// A script function together with the scope it was defined in
pub(crate) struct Closure {
    pub(crate) def: Rc<FunctionDef>,
    pub(crate) env: Rc<Scope>,
    name: String,
}

impl Closure {
    pub(crate) fn new(def: Rc<FunctionDef>, env: Rc<Scope>, name: Option<&str>) -> Self {
        let name = def
            .name
            .clone()
            .or_else(|| name.map(str::to_string))
            .unwrap_or_default();
        Self { def, env, name }
    }

    pub(crate) fn into_value(self) -> Value {
        Value::Function(Rc::new(self))
    }
}

impl fmt::Debug for Closure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Closure")
            .field("name", &self.name)
            .field("params", &self.def.params)
            .finish_non_exhaustive()
    }
}

impl Callable for Closure {
    fn name(&self) -> &str {
        &self.name
    }

    fn arity(&self) -> usize {
        self.def.params.len()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A function implemented in Rust
pub(crate) struct NativeFunction {
    pub(crate) name: &'static str,
    pub(crate) arity: usize,
    pub(crate) func: NativeFn,
}

impl NativeFunction {
    pub(crate) fn value(name: &'static str, arity: usize, func: NativeFn) -> Value {
        Value::Function(Rc::new(Self { name, arity, func }))
    }
}

impl fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NativeFunction({})", self.name)
    }
}

impl Callable for NativeFunction {
    fn name(&self) -> &str {
        self.name
    }

    fn arity(&self) -> usize {
        self.arity
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
