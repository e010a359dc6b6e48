//! The function registry facade

use std::sync::Arc;

use log::{debug, info};

use gscript_engine::ScriptEngine;
use gscript_parser::{is_identifier, ScriptParser};
use gscript_shared::Value;
use gscript_store::{FunctionStore, PropertyStore};

use crate::binder;
use crate::config::ScriptsConfig;
use crate::error::{Result, ScriptError};
use crate::graph::GraphDatabase;
use crate::handles::DatabaseHandle;
use crate::invoker;
use crate::logger::ScriptLogger;
use crate::normalize::{normalize, Records, StatusRecord};
use crate::pool::{is_bootstrap_name, ContextId, InterpreterPool};

/// Registry of stored script functions
///
/// One `Scripts` value is driven by one thread. Hosts with several worker
/// threads create one registry per worker over a shared property store.
///
/// # Examples
///
/// ```rust
/// use std::sync::Arc;
/// use gscript_core::{ContextId, MemoryGraph, Scripts, ScriptsConfig};
/// use gscript_shared::Value;
/// use gscript_store::MemoryPropertyStore;
///
/// let mut scripts = Scripts::new(
///     Arc::new(MemoryPropertyStore::new()),
///     Arc::new(MemoryGraph::new()),
///     ScriptsConfig::default(),
/// );
/// scripts.register("double", "function(x) { return x * 2 }")?;
/// let value = scripts.call(ContextId(1), "double", Some(vec![Value::Int(21)]))?;
/// assert_eq!(value, Value::Int(42));
/// # Ok::<(), gscript_core::ScriptError>(())
/// ```
pub struct Scripts {
    store: FunctionStore,
    db: Arc<dyn GraphDatabase>,
    pool: InterpreterPool,
    parser: ScriptParser,
    config: ScriptsConfig,
}

impl std::fmt::Debug for Scripts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scripts")
            .field("pool", &self.pool)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Scripts {
    /// Create a registry over a shared property store and graph
    pub fn new(
        properties: Arc<dyn PropertyStore>,
        db: Arc<dyn GraphDatabase>,
        config: ScriptsConfig,
    ) -> Self {
        Self {
            store: FunctionStore::new(properties),
            db,
            pool: InterpreterPool::new(&config),
            parser: ScriptParser::new(),
            config,
        }
    }

    /// Configuration in use
    pub fn config(&self) -> &ScriptsConfig {
        &self.config
    }

    /// The function store
    pub fn store(&self) -> &FunctionStore {
        &self.store
    }

    /// The interpreter pool
    pub fn pool(&self) -> &InterpreterPool {
        &self.pool
    }

    /// Drop the interpreter of a finished context
    pub fn release(&mut self, context: ContextId) -> bool {
        self.pool.release(context)
    }

    /// Validate and store `code` under `name`
    ///
    /// Nothing is persisted when the name or the code is rejected.
    pub fn register(&self, name: &str, code: &str) -> Result<StatusRecord> {
        if !is_identifier(name) {
            return Err(ScriptError::InvalidName(name.to_string()));
        }
        binder::validate(&self.parser, name, code)?;

        let replaced = self.store.put(name, code)?;
        let message = if replaced {
            format!("Updated Function {}", name)
        } else {
            format!("Added Function {}", name)
        };
        info!("{}", message);
        Ok(StatusRecord::new(message))
    }

    /// Remove `name`; succeeds whether or not it was registered
    pub fn delete(&self, name: &str) -> Result<StatusRecord> {
        self.store.remove(name)?;
        info!("Removed function '{}'", name);
        Ok(StatusRecord::new(format!("Function '{}' removed", name)))
    }

    /// Registered names, prefix stripped, in store order
    pub fn list(&self) -> Result<Vec<String>> {
        Ok(self.store.list()?.collect())
    }

    /// Stored source of `name`
    pub fn source(&self, name: &str) -> Result<Option<String>> {
        Ok(self.store.get(name)?)
    }

    /// Run `name` in `context` and stream its result as records
    pub fn run(
        &mut self,
        context: ContextId,
        name: &str,
        params: Option<Vec<Value>>,
    ) -> Result<Records> {
        let (interpreter, value) = self.invoke(context, name, params)?;
        Ok(normalize(&interpreter, name, value))
    }

    /// Run `name` in `context` and return its raw value
    pub fn call(
        &mut self,
        context: ContextId,
        name: &str,
        params: Option<Vec<Value>>,
    ) -> Result<Value> {
        self.invoke(context, name, params).map(|(_, value)| value)
    }

    /// Evaluate ad-hoc source in `context` with `db` and `log` bound
    pub fn eval(&mut self, context: ContextId, source: &str) -> Result<Value> {
        let db = self.db_handle();
        let interpreter = self.pool.get_or_create(context)?.interpreter().clone();
        let program = interpreter
            .compile(source)
            .map_err(|e| ScriptError::compile("<eval>", e))?;
        interpreter.bind("db", db);
        interpreter.bind("log", Value::host(ScriptLogger::new()));
        interpreter
            .run_program(&program)
            .map_err(|e| ScriptError::invocation("<eval>", e))
    }

    fn db_handle(&self) -> Value {
        Value::host(DatabaseHandle::new(Arc::clone(&self.db)))
    }

    fn invoke(
        &mut self,
        context: ContextId,
        name: &str,
        params: Option<Vec<Value>>,
    ) -> Result<(gscript_engine::Interpreter, Value)> {
        let source = self.store.get(name)?;
        if source.is_none() && !is_bootstrap_name(name) {
            return Err(ScriptError::DefinitionNotFound {
                name: name.to_string(),
            });
        }

        let db = self.db_handle();
        let script_context = self.pool.get_or_create(context)?;
        match &source {
            Some(source) => binder::bind(script_context, name, source)?,
            None => debug!("Calling bootstrap function '{}'", name),
        }

        let interpreter = script_context.interpreter().clone();
        let args = invoker::arguments(params);
        let value = invoker::invoke(
            &interpreter,
            db,
            Value::host(ScriptLogger::new()),
            name,
            &args,
        )?;
        Ok((interpreter, value))
    }
}
