//! Lexical scopes
//!
//! Scopes form a parent chain. Function bodies and the global scope are
//! "function scopes" and receive `var` declarations; blocks only hold
//! `let`/`const` bindings.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use gscript_shared::Value;

use crate::error::EvalError;

#[derive(Debug)]
struct Binding {
    value: Value,
    mutable: bool,
}

/// A single lexical scope
#[derive(Debug)]
pub(crate) struct Scope {
    bindings: RefCell<HashMap<String, Binding>>,
    parent: Option<Rc<Scope>>,
    function_scope: bool,
}

impl Scope {
    /// The root scope of an interpreter
    pub(crate) fn global() -> Rc<Self> {
        Rc::new(Self {
            bindings: RefCell::new(HashMap::new()),
            parent: None,
            function_scope: true,
        })
    }

    /// A nested scope
    pub(crate) fn child(parent: &Rc<Scope>, function_scope: bool) -> Rc<Self> {
        Rc::new(Self {
            bindings: RefCell::new(HashMap::new()),
            parent: Some(Rc::clone(parent)),
            function_scope,
        })
    }

    /// Create or replace a binding in this scope
    pub(crate) fn declare(&self, name: &str, value: Value, mutable: bool) {
        self.bindings
            .borrow_mut()
            .insert(name.to_string(), Binding { value, mutable });
    }

    /// Declare only when this scope has no binding of that name yet
    pub(crate) fn declare_if_absent(&self, name: &str) {
        self.bindings
            .borrow_mut()
            .entry(name.to_string())
            .or_insert(Binding {
                value: Value::Null,
                mutable: true,
            });
    }

    /// Resolve a name through the scope chain
    pub(crate) fn lookup(&self, name: &str) -> Option<Value> {
        if let Some(binding) = self.bindings.borrow().get(name) {
            return Some(binding.value.clone());
        }
        self.parent.as_ref().and_then(|p| p.lookup(name))
    }

    /// Assign to the nearest existing binding; `Ok(false)` when none exists
    pub(crate) fn assign(&self, name: &str, value: Value) -> Result<bool, EvalError> {
        if let Some(binding) = self.bindings.borrow_mut().get_mut(name) {
            if !binding.mutable {
                return Err(EvalError::type_error(format!(
                    "Assignment to constant variable '{}'",
                    name
                )));
            }
            binding.value = value;
            return Ok(true);
        }
        match &self.parent {
            Some(parent) => parent.assign(name, value),
            None => Ok(false),
        }
    }

    /// Nearest enclosing function scope (where `var` lands)
    pub(crate) fn var_scope(self: &Rc<Self>) -> Rc<Scope> {
        let mut scope = Rc::clone(self);
        while !scope.function_scope {
            match &scope.parent {
                Some(parent) => scope = Rc::clone(parent),
                None => break,
            }
        }
        scope
    }

    /// Drop every binding held directly by this scope
    pub(crate) fn clear(&self) {
        let bindings = std::mem::take(&mut *self.bindings.borrow_mut());
        drop(bindings);
    }

    /// Clear this scope and all of its ancestors
    pub(crate) fn clear_chain(self: &Rc<Self>) {
        let mut next = Some(Rc::clone(self));
        while let Some(scope) = next {
            scope.clear();
            next = scope.parent.clone();
        }
    }
}
