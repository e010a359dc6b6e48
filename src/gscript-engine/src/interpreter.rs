//! The tree-walking interpreter
//!
//! An [`Interpreter`] is a cheap, cloneable handle over a global scope. It is
//! deliberately single-threaded: values are `Rc`-based and an interpreter
//! never leaves the thread that created it.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use indexmap::IndexMap;
use log::{debug, trace};

use gscript_parser::{
    DeclKind, Expr, FunctionBody, FunctionDef, Literal, LogicalOperator, Program, ScriptParser, Stmt,
    UnaryOperator, UpdateOperator,
};
use gscript_shared::{is_truthy, Callable, Value};

use crate::builtin::{NativeKind, NativeRegistry};
use crate::config::EngineConfig;
use crate::error::{Control, EvalError, Exec, Result};
use crate::function::{Closure, NativeFunction};
use crate::ops;
use crate::scope::Scope;

/// Indices written past the end of an array may grow it by at most this much
const MAX_ARRAY_GROWTH: usize = 1 << 16;

/// Remaining native stack below which evaluation moves to a new segment
const STACK_RED_ZONE: usize = 256 * 1024;

/// Size of each heap-allocated stack segment
const STACK_SEGMENT: usize = 4 * 1024 * 1024;

/// The interface the function registry drives an embedded interpreter through
pub trait ScriptEngine {
    /// Evaluate source in the global scope and return its completion value
    fn eval(&self, source: &str) -> Result<Value>;

    /// Call the global function `name` with positional arguments
    fn invoke(&self, name: &str, args: &[Value]) -> Result<Value>;

    /// Bind a global name, replacing any previous binding
    fn bind(&self, name: &str, value: Value);
}

struct Inner {
    globals: Rc<Scope>,
    config: EngineConfig,
    call_stack: RefCell<Vec<String>>,
    parser: ScriptParser,
    /// Non-global scopes captured by closures
    captured: RefCell<Vec<Weak<Scope>>>,
}

impl Inner {
    fn track(&self, scope: &Rc<Scope>) {
        if Rc::ptr_eq(scope, &self.globals) {
            return;
        }
        let mut captured = self.captured.borrow_mut();
        if captured.len() >= 64 && captured.len() == captured.capacity() {
            captured.retain(|weak| weak.strong_count() > 0);
        }
        captured.push(Rc::downgrade(scope));
    }
}

// Closures hold their defining scope and scopes hold closures, so nothing
// reachable from a script would be freed with the interpreter. Emptying
// every captured scope and the globals breaks those cycles.
impl Drop for Inner {
    fn drop(&mut self) {
        let captured = std::mem::take(self.captured.get_mut());
        for scope in captured.iter().filter_map(Weak::upgrade) {
            scope.clear_chain();
        }
        self.globals.clear();
    }
}

/// Script interpreter handle
#[derive(Clone)]
pub struct Interpreter {
    inner: Rc<Inner>,
}

impl std::fmt::Debug for Interpreter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Interpreter")
            .field("config", &self.inner.config)
            .field("depth", &self.call_depth())
            .finish_non_exhaustive()
    }
}

/// Pops the call stack when a script function returns
struct CallGuard<'a> {
    stack: &'a RefCell<Vec<String>>,
}

impl Drop for CallGuard<'_> {
    fn drop(&mut self) {
        self.stack.borrow_mut().pop();
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl Interpreter {
    /// Create an interpreter with the native globals installed
    pub fn new(config: EngineConfig) -> Self {
        let interpreter = Self {
            inner: Rc::new(Inner {
                globals: Scope::global(),
                config,
                call_stack: RefCell::new(Vec::new()),
                parser: ScriptParser::new(),
                captured: RefCell::new(Vec::new()),
            }),
        };
        interpreter.install_natives();
        debug!(
            "Created interpreter (max call depth {})",
            interpreter.inner.config.max_call_depth
        );
        interpreter
    }

    fn install_natives(&self) {
        let registry = NativeRegistry::global();
        let mut namespaces: IndexMap<&'static str, IndexMap<String, Value>> = IndexMap::new();

        for native in registry.iter() {
            let value = NativeFunction::value(native.name, native.arity, native.func);
            match native.kind {
                NativeKind::Global => self.inner.globals.declare(native.name, value, true),
                NativeKind::Namespace(ns) => {
                    namespaces
                        .entry(ns)
                        .or_default()
                        .insert(native.name.to_string(), value);
                }
                _ => {}
            }
        }

        for (ns, mut members) in namespaces {
            members.sort_keys();
            self.inner.globals.declare(ns, Value::object(members), true);
        }
    }

    /// Configuration this interpreter was built with
    pub fn config(&self) -> &EngineConfig {
        &self.inner.config
    }

    /// Current nesting of script function calls
    pub fn call_depth(&self) -> usize {
        self.inner.call_stack.borrow().len()
    }

    /// Parse source without running it
    pub fn compile(&self, source: &str) -> Result<Program> {
        Ok(self.inner.parser.parse(source)?)
    }

    /// Run an already parsed program in the global scope
    pub fn run_program(&self, program: &Program) -> Result<Value> {
        let globals = Rc::clone(&self.inner.globals);
        self.hoist(&program.body, &globals);

        let mut completion = Value::Null;
        for stmt in &program.body {
            let step = match stmt {
                Stmt::Expr(expr) => self.eval_expr(expr, &globals).map(|v| completion = v),
                other => self.exec(other, &globals),
            };
            step.map_err(Control::into_error)?;
        }
        Ok(completion)
    }

    /// Read a global binding
    pub fn get_global(&self, name: &str) -> Option<Value> {
        self.inner.globals.lookup(name)
    }

    /// Call a function value with an explicit receiver
    pub fn call_function(&self, function: &Value, this: &Value, args: &[Value]) -> Result<Value> {
        self.call_value(function, this.clone(), args)
            .map_err(Control::into_error)
    }

    /// Call `target.name(args...)`
    pub fn call_method(&self, target: &Value, name: &str, args: &[Value]) -> Result<Value> {
        self.invoke_method(target, name, args)
            .map_err(Control::into_error)
    }

    /// Whether `target.name` can be called as a method
    pub fn has_method(&self, target: &Value, name: &str) -> bool {
        match target {
            Value::Object(obj) => obj.borrow().get(name).is_some_and(Value::is_function),
            Value::Null => false,
            other => {
                self.builtin_method(other, name).is_some()
                    || self
                        .get_property(other, name)
                        .is_ok_and(|v| v.is_function())
            }
        }
    }

    /// Read `target.name`
    pub fn get_property(&self, target: &Value, name: &str) -> Result<Value> {
        let registry = NativeRegistry::global();
        let method = |kind| {
            registry
                .get(kind, name)
                .map(|n| NativeFunction::value(n.name, n.arity, n.func))
        };

        match target {
            Value::Null => Err(EvalError::type_error(format!(
                "Cannot read property '{}' of null",
                name
            ))),
            Value::Object(obj) => Ok(obj.borrow().get(name).cloned().unwrap_or(Value::Null)),
            Value::Array(arr) => {
                if name == "length" {
                    return Ok(Value::Int(len_value(arr.borrow().len())));
                }
                if let Ok(i) = name.parse::<usize>() {
                    return Ok(arr.borrow().get(i).cloned().unwrap_or(Value::Null));
                }
                Ok(method(NativeKind::ArrayMethod).unwrap_or(Value::Null))
            }
            Value::String(s) => {
                if name == "length" {
                    return Ok(Value::Int(len_value(s.chars().count())));
                }
                if let Ok(i) = name.parse::<usize>() {
                    return Ok(s
                        .chars()
                        .nth(i)
                        .map_or(Value::Null, |c| Value::String(c.to_string())));
                }
                Ok(method(NativeKind::StringMethod).unwrap_or(Value::Null))
            }
            Value::Function(f) => match name {
                "name" => Ok(Value::string(f.name())),
                "length" => Ok(Value::Int(len_value(f.arity()))),
                _ => Ok(method(NativeKind::FunctionMethod).unwrap_or(Value::Null)),
            },
            Value::Int(_) | Value::Float(_) => {
                Ok(method(NativeKind::NumberMethod).unwrap_or(Value::Null))
            }
            Value::Bool(_) => Ok(Value::Null),
            Value::Host(h) => Ok(h.get(name).unwrap_or(Value::Null)),
        }
    }

    // ----- statements -------------------------------------------------------

    /// Declare hoisted function and `var` names of a statement list
    fn hoist(&self, stmts: &[Stmt], scope: &Rc<Scope>) {
        let mut vars = Vec::new();
        collect_var_names(stmts, &mut vars);
        if !vars.is_empty() {
            let var_scope = scope.var_scope();
            for name in &vars {
                var_scope.declare_if_absent(name);
            }
        }

        for stmt in stmts {
            if let Stmt::Function(def) = stmt {
                if let Some(name) = &def.name {
                    scope.declare(name, self.closure(def, scope, None), true);
                }
            }
        }
    }

    fn run_block(&self, stmts: &[Stmt], scope: &Rc<Scope>) -> Exec<()> {
        self.hoist(stmts, scope);
        for stmt in stmts {
            self.exec(stmt, scope)?;
        }
        Ok(())
    }

    // Statements and expressions nest arbitrarily deep through calls, so
    // both recursion points run on a growable stack; `max_call_depth` is the
    // only limit scripts observe.
    fn exec(&self, stmt: &Stmt, scope: &Rc<Scope>) -> Exec<()> {
        stacker::maybe_grow(STACK_RED_ZONE, STACK_SEGMENT, || self.exec_stmt(stmt, scope))
    }

    fn exec_stmt(&self, stmt: &Stmt, scope: &Rc<Scope>) -> Exec<()> {
        match stmt {
            Stmt::Var { kind, decls } => {
                for decl in decls {
                    let value = match &decl.init {
                        Some(init) => self.eval_named(init, &decl.name, scope)?,
                        None if *kind == DeclKind::Var => {
                            scope.var_scope().declare_if_absent(&decl.name);
                            continue;
                        }
                        None => Value::Null,
                    };
                    match kind {
                        DeclKind::Var => scope.var_scope().declare(&decl.name, value, true),
                        DeclKind::Let => scope.declare(&decl.name, value, true),
                        DeclKind::Const => scope.declare(&decl.name, value, false),
                    }
                }
                Ok(())
            }
            Stmt::Function(_) | Stmt::Empty => Ok(()),
            Stmt::Expr(expr) => self.eval_expr(expr, scope).map(|_| ()),
            Stmt::Block(stmts) => self.run_block(stmts, &Scope::child(scope, false)),
            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                if is_truthy(&self.eval_expr(condition, scope)?) {
                    self.exec(then_branch, scope)
                } else if let Some(else_branch) = else_branch {
                    self.exec(else_branch, scope)
                } else {
                    Ok(())
                }
            }
            Stmt::While { condition, body } => {
                while is_truthy(&self.eval_expr(condition, scope)?) {
                    match self.exec(body, scope) {
                        Ok(()) | Err(Control::Continue) => {}
                        Err(Control::Break) => break,
                        Err(other) => return Err(other),
                    }
                }
                Ok(())
            }
            Stmt::For {
                init,
                condition,
                update,
                body,
            } => {
                let loop_scope = Scope::child(scope, false);
                if let Some(init) = init {
                    self.exec(init, &loop_scope)?;
                }
                loop {
                    if let Some(condition) = condition {
                        if !is_truthy(&self.eval_expr(condition, &loop_scope)?) {
                            break;
                        }
                    }
                    match self.exec(body, &loop_scope) {
                        Ok(()) | Err(Control::Continue) => {}
                        Err(Control::Break) => break,
                        Err(other) => return Err(other),
                    }
                    if let Some(update) = update {
                        self.eval_expr(update, &loop_scope)?;
                    }
                }
                Ok(())
            }
            Stmt::ForOf {
                kind,
                binding,
                iterable,
                body,
            } => {
                let iterable = self.eval_expr(iterable, scope)?;
                self.for_each_item(&iterable, |item| {
                    let iteration = Scope::child(scope, false);
                    match kind {
                        Some(DeclKind::Var) => scope.var_scope().declare(binding, item, true),
                        Some(DeclKind::Let) => iteration.declare(binding, item, true),
                        Some(DeclKind::Const) => iteration.declare(binding, item, false),
                        None => self.assign_name(binding, item, scope)?,
                    }
                    match self.exec(body, &iteration) {
                        Ok(()) | Err(Control::Continue) => Ok(true),
                        Err(Control::Break) => Ok(false),
                        Err(other) => Err(other),
                    }
                })
            }
            Stmt::Return(expr) => {
                let value = match expr {
                    Some(expr) => self.eval_expr(expr, scope)?,
                    None => Value::Null,
                };
                Err(Control::Return(value))
            }
            Stmt::Break => Err(Control::Break),
            Stmt::Continue => Err(Control::Continue),
            Stmt::Throw(expr) => Err(Control::Throw(self.eval_expr(expr, scope)?)),
            Stmt::Try {
                block,
                catch_param,
                handler,
                finalizer,
            } => {
                let result = self.run_block(block, &Scope::child(scope, false));
                let result = match (result, handler) {
                    (Err(Control::Throw(value)), Some(handler)) => {
                        self.run_catch(handler, catch_param.as_deref(), value, scope)
                    }
                    (Err(Control::Error(err)), Some(handler)) if !err.is_syntax() => {
                        let value = Value::String(err.to_string());
                        self.run_catch(handler, catch_param.as_deref(), value, scope)
                    }
                    (other, _) => other,
                };

                if let Some(finalizer) = finalizer {
                    self.run_block(finalizer, &Scope::child(scope, false))?;
                }
                result
            }
        }
    }

    fn run_catch(
        &self,
        handler: &[Stmt],
        param: Option<&str>,
        value: Value,
        scope: &Rc<Scope>,
    ) -> Exec<()> {
        let catch_scope = Scope::child(scope, false);
        if let Some(param) = param {
            catch_scope.declare(param, value, true);
        }
        self.run_block(handler, &catch_scope)
    }

    /// Feed every element of an iterable to `f` until it returns `false`
    fn for_each_item<F>(&self, iterable: &Value, mut f: F) -> Exec<()>
    where
        F: FnMut(Value) -> Exec<bool>,
    {
        match iterable {
            Value::Array(arr) => {
                let items = arr.borrow().clone();
                for item in items {
                    if !f(item)? {
                        break;
                    }
                }
            }
            Value::String(s) => {
                for c in s.chars() {
                    if !f(Value::String(c.to_string()))? {
                        break;
                    }
                }
            }
            Value::Host(h) if h.as_iterator().is_some() => {
                if let Some(it) = h.as_iterator() {
                    while let Some(item) = it.next_value() {
                        if !f(item.map_err(EvalError::Host)?)? {
                            break;
                        }
                    }
                }
            }
            target if self.has_method(target, "hasNext") && self.has_method(target, "next") => {
                while is_truthy(&self.invoke_method(target, "hasNext", &[])?) {
                    let item = self.invoke_method(target, "next", &[])?;
                    if !f(item)? {
                        break;
                    }
                }
            }
            other => {
                return Err(EvalError::type_error(format!(
                    "{} is not iterable",
                    other.type_name()
                ))
                .into())
            }
        }
        Ok(())
    }

    // ----- expressions ------------------------------------------------------

    fn closure(&self, def: &Rc<FunctionDef>, scope: &Rc<Scope>, name: Option<&str>) -> Value {
        self.inner.track(scope);
        Closure::new(Rc::clone(def), Rc::clone(scope), name).into_value()
    }

    /// Evaluate an initializer, naming anonymous functions after their binding
    fn eval_named(&self, expr: &Expr, name: &str, scope: &Rc<Scope>) -> Exec<Value> {
        if let Expr::Function(def) = expr {
            return Ok(self.closure(def, scope, Some(name)));
        }
        self.eval_expr(expr, scope)
    }

    fn eval_expr(&self, expr: &Expr, scope: &Rc<Scope>) -> Exec<Value> {
        stacker::maybe_grow(STACK_RED_ZONE, STACK_SEGMENT, || self.eval_node(expr, scope))
    }

    fn eval_node(&self, expr: &Expr, scope: &Rc<Scope>) -> Exec<Value> {
        match expr {
            Expr::Literal(lit) => Ok(literal_value(lit)),
            Expr::Identifier(name) => scope
                .lookup(name)
                .ok_or_else(|| EvalError::Reference(name.clone()).into()),
            Expr::This => Ok(scope.lookup("this").unwrap_or(Value::Null)),
            Expr::Array(items) => {
                let mut values = Vec::with_capacity(items.len());
                for item in items {
                    values.push(self.eval_expr(item, scope)?);
                }
                Ok(Value::array(values))
            }
            Expr::Object(entries) => {
                let mut fields = IndexMap::with_capacity(entries.len());
                for (key, value) in entries {
                    let value = self.eval_named(value, key, scope)?;
                    fields.insert(key.clone(), value);
                }
                Ok(Value::object(fields))
            }
            Expr::Function(def) => Ok(self.closure(def, scope, None)),
            Expr::Unary { op, operand } => self.eval_unary(*op, operand, scope),
            Expr::Update { op, prefix, target } => {
                let old = self.eval_expr(target, scope)?;
                let old = match old {
                    Value::Int(_) | Value::Float(_) => old,
                    other => ops::number(ops::to_number(&other)),
                };
                let bin = match op {
                    UpdateOperator::Increment => gscript_parser::BinaryOperator::Add,
                    UpdateOperator::Decrement => gscript_parser::BinaryOperator::Sub,
                };
                let new = ops::binary(bin, &old, &Value::Int(1))?;
                self.assign(target, new.clone(), scope)?;
                Ok(if *prefix { new } else { old })
            }
            Expr::Binary { left, op, right } => {
                let left = self.eval_expr(left, scope)?;
                let right = self.eval_expr(right, scope)?;
                Ok(ops::binary(*op, &left, &right)?)
            }
            Expr::Logical { left, op, right } => {
                let left = self.eval_expr(left, scope)?;
                let short_circuit = match op {
                    LogicalOperator::And => !is_truthy(&left),
                    LogicalOperator::Or => is_truthy(&left),
                };
                if short_circuit {
                    Ok(left)
                } else {
                    self.eval_expr(right, scope)
                }
            }
            Expr::Conditional {
                condition,
                consequent,
                alternate,
            } => {
                if is_truthy(&self.eval_expr(condition, scope)?) {
                    self.eval_expr(consequent, scope)
                } else {
                    self.eval_expr(alternate, scope)
                }
            }
            Expr::Assignment { op, target, value } => {
                let value = match op.binary() {
                    None => match target.as_ref() {
                        Expr::Identifier(name) => self.eval_named(value, name, scope)?,
                        _ => self.eval_expr(value, scope)?,
                    },
                    Some(bin) => {
                        let current = self.eval_expr(target, scope)?;
                        let rhs = self.eval_expr(value, scope)?;
                        ops::binary(bin, &current, &rhs)?
                    }
                };
                self.assign(target, value.clone(), scope)?;
                Ok(value)
            }
            Expr::Member { object, property } => {
                let object = self.eval_expr(object, scope)?;
                Ok(self.get_property(&object, property)?)
            }
            Expr::Index { object, index } => {
                let object = self.eval_expr(object, scope)?;
                let index = self.eval_expr(index, scope)?;
                Ok(self.get_index(&object, &index)?)
            }
            Expr::Call { callee, args } => self.eval_call(callee, args, scope),
        }
    }

    fn eval_unary(&self, op: UnaryOperator, operand: &Expr, scope: &Rc<Scope>) -> Exec<Value> {
        if op == UnaryOperator::TypeOf {
            if let Expr::Identifier(name) = operand {
                if scope.lookup(name).is_none() {
                    return Ok(Value::string("undefined"));
                }
            }
        }

        let value = self.eval_expr(operand, scope)?;
        Ok(match op {
            UnaryOperator::Not => Value::Bool(!is_truthy(&value)),
            UnaryOperator::Neg => ops::negate(&value),
            UnaryOperator::Plus => match value {
                Value::Int(_) | Value::Float(_) => value,
                other => ops::number(ops::to_number(&other)),
            },
            UnaryOperator::TypeOf => Value::string(ops::type_of(&value)),
        })
    }

    fn eval_args(&self, args: &[Expr], scope: &Rc<Scope>) -> Exec<Vec<Value>> {
        let mut values = Vec::with_capacity(args.len());
        for arg in args {
            values.push(self.eval_expr(arg, scope)?);
        }
        Ok(values)
    }

    fn eval_call(&self, callee: &Expr, args: &[Expr], scope: &Rc<Scope>) -> Exec<Value> {
        match callee {
            Expr::Member { object, property } => {
                let target = self.eval_expr(object, scope)?;
                let args = self.eval_args(args, scope)?;
                self.invoke_method(&target, property, &args)
            }
            Expr::Index { object, index } => {
                let target = self.eval_expr(object, scope)?;
                let index = self.eval_expr(index, scope)?;
                let function = self.get_index(&target, &index)?;
                let args = self.eval_args(args, scope)?;
                self.call_value(&function, target, &args)
            }
            other => {
                let function = self.eval_expr(other, scope)?;
                if !function.is_function() {
                    return Err(EvalError::type_error(format!(
                        "{} is not a function",
                        describe_callee(other)
                    ))
                    .into());
                }
                let args = self.eval_args(args, scope)?;
                self.call_value(&function, Value::Null, &args)
            }
        }
    }

    // ----- calls ------------------------------------------------------------

    fn builtin_method(
        &self,
        target: &Value,
        name: &str,
    ) -> Option<&'static crate::builtin::NativeRegistration> {
        let kind = match target {
            Value::Array(_) => NativeKind::ArrayMethod,
            Value::String(_) => NativeKind::StringMethod,
            Value::Int(_) | Value::Float(_) => NativeKind::NumberMethod,
            Value::Function(_) => NativeKind::FunctionMethod,
            _ => return None,
        };
        NativeRegistry::global().get(kind, name)
    }

    /// Dispatch `target.name(args...)`
    pub(crate) fn invoke_method(&self, target: &Value, name: &str, args: &[Value]) -> Exec<Value> {
        match target {
            Value::Host(host) => {
                if let Some(result) = host.call_method(name, args) {
                    return result.map_err(|e| EvalError::Host(e).into());
                }
                match host.get(name) {
                    Some(function @ Value::Function(_)) => {
                        self.call_value(&function, target.clone(), args)
                    }
                    _ => Err(EvalError::type_error(format!(
                        "{}.{} is not a function",
                        host.type_name(),
                        name
                    ))
                    .into()),
                }
            }
            Value::Null => Err(EvalError::type_error(format!(
                "Cannot call method '{}' of null",
                name
            ))
            .into()),
            _ => {
                if let Some(native) = self.builtin_method(target, name) {
                    return (native.func)(self, target, args);
                }
                let function = self.get_property(target, name)?;
                if function.is_function() {
                    self.call_value(&function, target.clone(), args)
                } else {
                    Err(EvalError::type_error(format!(
                        "{}.{} is not a function",
                        target.type_name(),
                        name
                    ))
                    .into())
                }
            }
        }
    }

    /// Call any function value
    pub(crate) fn call_value(&self, function: &Value, this: Value, args: &[Value]) -> Exec<Value> {
        let Value::Function(callable) = function else {
            return Err(EvalError::type_error(format!(
                "{} is not a function",
                function.type_name()
            ))
            .into());
        };

        if let Some(closure) = callable.as_any().downcast_ref::<Closure>() {
            return self.call_closure(closure, this, args);
        }
        if let Some(native) = callable.as_any().downcast_ref::<NativeFunction>() {
            return (native.func)(self, &this, args);
        }
        Err(EvalError::type_error(format!(
            "function {} is not callable from this interpreter",
            callable.name()
        ))
        .into())
    }

    fn enter(&self, name: &str) -> Exec<CallGuard<'_>> {
        let max = self.inner.config.max_call_depth;
        let mut stack = self.inner.call_stack.borrow_mut();
        if stack.len() >= max {
            trace!("Call depth {} exceeded entering '{}'", max, name);
            return Err(EvalError::RecursionLimit(max).into());
        }
        stack.push(name.to_string());
        Ok(CallGuard {
            stack: &self.inner.call_stack,
        })
    }

    fn call_closure(&self, closure: &Closure, this: Value, args: &[Value]) -> Exec<Value> {
        let _guard = self.enter(closure.name())?;

        let scope = Scope::child(&closure.env, true);
        if !closure.def.is_arrow {
            scope.declare("this", this, true);
            scope.declare("arguments", Value::array(args.to_vec()), true);
        }
        for (i, param) in closure.def.params.iter().enumerate() {
            let value = args.get(i).cloned().unwrap_or(Value::Null);
            scope.declare(param, value, true);
        }

        match &closure.def.body {
            FunctionBody::Expr(expr) => self.eval_expr(expr, &scope),
            FunctionBody::Block(stmts) => match self.run_block(stmts, &scope) {
                Ok(()) => Ok(Value::Null),
                Err(Control::Return(value)) => Ok(value),
                Err(Control::Break) => Err(EvalError::misplaced("break").into()),
                Err(Control::Continue) => Err(EvalError::misplaced("continue").into()),
                Err(other) => Err(other),
            },
        }
    }

    // ----- assignment and indexing -----------------------------------------

    fn assign_name(&self, name: &str, value: Value, scope: &Rc<Scope>) -> Exec<()> {
        if !scope.assign(name, value.clone())? {
            // undeclared names become globals
            self.inner.globals.declare(name, value, true);
        }
        Ok(())
    }

    fn assign(&self, target: &Expr, value: Value, scope: &Rc<Scope>) -> Exec<()> {
        match target {
            Expr::Identifier(name) => self.assign_name(name, value, scope),
            Expr::Member { object, property } => {
                let object = self.eval_expr(object, scope)?;
                Ok(self.set_property(&object, property, value)?)
            }
            Expr::Index { object, index } => {
                let object = self.eval_expr(object, scope)?;
                let index = self.eval_expr(index, scope)?;
                Ok(self.set_index(&object, &index, value)?)
            }
            _ => Err(EvalError::type_error("Invalid assignment target").into()),
        }
    }

    fn get_index(&self, target: &Value, index: &Value) -> Result<Value> {
        match (target, index) {
            (Value::Array(arr), Value::Int(_) | Value::Float(_)) => {
                let item = array_slot(index).and_then(|i| arr.borrow().get(i).cloned());
                Ok(item.unwrap_or(Value::Null))
            }
            (Value::String(s), Value::Int(_) | Value::Float(_)) => Ok(array_slot(index)
                .and_then(|i| s.chars().nth(i))
                .map_or(Value::Null, |c| Value::String(c.to_string()))),
            _ => self.get_property(target, &property_key(index)),
        }
    }

    fn set_property(&self, target: &Value, name: &str, value: Value) -> Result<()> {
        match target {
            Value::Object(obj) => {
                obj.borrow_mut().insert(name.to_string(), value);
                Ok(())
            }
            Value::Array(arr) if name == "length" => {
                let len = ops::to_integer(&value)
                    .and_then(|n| usize::try_from(n).ok())
                    .ok_or_else(|| EvalError::type_error("Invalid array length"))?;
                let mut items = arr.borrow_mut();
                if len > items.len() + MAX_ARRAY_GROWTH {
                    return Err(EvalError::type_error("Invalid array length"));
                }
                items.resize(len, Value::Null);
                Ok(())
            }
            Value::Array(_) if name.parse::<usize>().is_ok() => {
                self.set_index(target, &Value::string(name), value)
            }
            other => Err(EvalError::type_error(format!(
                "Cannot set property '{}' of {}",
                name,
                other.type_name()
            ))),
        }
    }

    fn set_index(&self, target: &Value, index: &Value, value: Value) -> Result<()> {
        match target {
            Value::Array(arr) => {
                let slot = match index {
                    Value::String(s) => s.parse::<usize>().ok(),
                    other => array_slot(other),
                };
                let Some(slot) = slot else {
                    return self.set_property(target, &property_key(index), value);
                };
                let mut items = arr.borrow_mut();
                if slot >= items.len() + MAX_ARRAY_GROWTH {
                    return Err(EvalError::type_error(format!(
                        "Array index {} out of range",
                        slot
                    )));
                }
                if slot >= items.len() {
                    items.resize(slot + 1, Value::Null);
                }
                items[slot] = value;
                Ok(())
            }
            _ => self.set_property(target, &property_key(index), value),
        }
    }
}

impl ScriptEngine for Interpreter {
    fn eval(&self, source: &str) -> Result<Value> {
        trace!("Evaluating {} bytes of script", source.len());
        let program = self.compile(source)?;
        self.run_program(&program)
    }

    fn invoke(&self, name: &str, args: &[Value]) -> Result<Value> {
        trace!("Invoking '{}' with {} argument(s)", name, args.len());
        let function = self
            .get_global(name)
            .ok_or_else(|| EvalError::Reference(name.to_string()))?;
        if !function.is_function() {
            return Err(EvalError::type_error(format!("{} is not a function", name)));
        }
        self.call_function(&function, &Value::Null, args)
    }

    fn bind(&self, name: &str, value: Value) {
        self.inner.globals.declare(name, value, true);
    }
}

fn literal_value(lit: &Literal) -> Value {
    match lit {
        Literal::Null => Value::Null,
        Literal::Bool(b) => Value::Bool(*b),
        Literal::Int(i) => Value::Int(*i),
        Literal::Float(f) => Value::Float(*f),
        Literal::String(s) => Value::String(s.clone()),
    }
}

fn len_value(len: usize) -> i64 {
    i64::try_from(len).unwrap_or(i64::MAX)
}

/// Non-negative integral index, if `index` is one
fn array_slot(index: &Value) -> Option<usize> {
    match index {
        Value::Int(i) => usize::try_from(*i).ok(),
        Value::Float(f) if f.fract() == 0.0 => index.as_i64().and_then(|i| usize::try_from(i).ok()),
        _ => None,
    }
}

/// Property name for a computed key
fn property_key(index: &Value) -> String {
    match index {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn describe_callee(expr: &Expr) -> String {
    match expr {
        Expr::Identifier(name) => name.clone(),
        Expr::This => "this".to_string(),
        _ => "expression".to_string(),
    }
}

fn collect_var_names(stmts: &[Stmt], names: &mut Vec<String>) {
    for stmt in stmts {
        match stmt {
            Stmt::Var {
                kind: DeclKind::Var,
                decls,
            } => names.extend(decls.iter().map(|d| d.name.clone())),
            Stmt::Block(body) => collect_var_names(body, names),
            Stmt::If {
                then_branch,
                else_branch,
                ..
            } => {
                collect_var_names(std::slice::from_ref(then_branch.as_ref()), names);
                if let Some(else_branch) = else_branch {
                    collect_var_names(std::slice::from_ref(else_branch.as_ref()), names);
                }
            }
            Stmt::While { body, .. } => {
                collect_var_names(std::slice::from_ref(body.as_ref()), names);
            }
            Stmt::For { init, body, .. } => {
                if let Some(init) = init {
                    collect_var_names(std::slice::from_ref(init.as_ref()), names);
                }
                collect_var_names(std::slice::from_ref(body.as_ref()), names);
            }
            Stmt::ForOf {
                kind, binding, body, ..
            } => {
                if *kind == Some(DeclKind::Var) {
                    names.push(binding.clone());
                }
                collect_var_names(std::slice::from_ref(body.as_ref()), names);
            }
            Stmt::Try {
                block,
                handler,
                finalizer,
                ..
            } => {
                collect_var_names(block, names);
                if let Some(handler) = handler {
                    collect_var_names(handler, names);
                }
                if let Some(finalizer) = finalizer {
                    collect_var_names(finalizer, names);
                }
            }
            _ => {}
        }
    }
}
