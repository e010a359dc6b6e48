//! Per-context interpreter pool
//!
//! Every execution context gets its own interpreter, created on first use
//! and kept until the host releases the context. New interpreters are
//! bootstrapped with `label`, `type` and `collection`.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt;
use std::num::NonZeroUsize;

use log::debug;
use lru::LruCache;

use gscript_engine::{EngineConfig, Interpreter, ScriptEngine};

use crate::binder::CompiledFunction;
use crate::config::ScriptsConfig;
use crate::error::{Result, ScriptError};

/// Script source evaluated into every new interpreter
pub const BOOTSTRAP_SOURCE: &str = r"
function label(name) { return Label(name) }
function type(name) { return RelationshipType(name) }
function collection(it) { r = []; while (it.hasNext()) { r.push(it.next()) } return r }
";

/// Names defined by [`BOOTSTRAP_SOURCE`]
pub const BOOTSTRAP_NAMES: [&str; 3] = ["label", "type", "collection"];

/// Whether `name` is one of the bootstrap bindings
pub fn is_bootstrap_name(name: &str) -> bool {
    BOOTSTRAP_NAMES.contains(&name)
}

/// Identifies an execution context, e.g. one host transaction or worker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContextId(pub u64);

impl fmt::Display for ContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "context-{}", self.0)
    }
}

impl From<u64> for ContextId {
    fn from(id: u64) -> Self {
        ContextId(id)
    }
}

/// An interpreter together with its compiled-function cache
pub struct ScriptContext {
    interpreter: Interpreter,
    pub(crate) compiled: Option<LruCache<String, CompiledFunction>>,
}

impl fmt::Debug for ScriptContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScriptContext")
            .field("interpreter", &self.interpreter)
            .field("cached", &self.compiled.as_ref().map(LruCache::len))
            .finish()
    }
}

impl ScriptContext {
    fn bootstrap(engine: EngineConfig, cache_size: Option<usize>) -> Result<Self> {
        let interpreter = Interpreter::new(engine);
        interpreter
            .eval(BOOTSTRAP_SOURCE)
            .map_err(|e| ScriptError::compile("bootstrap", e))?;
        let compiled = cache_size
            .map(|n| LruCache::new(NonZeroUsize::new(n).unwrap_or(NonZeroUsize::MIN)));
        Ok(Self {
            interpreter,
            compiled,
        })
    }

    /// The context's interpreter
    pub fn interpreter(&self) -> &Interpreter {
        &self.interpreter
    }

    /// Number of compiled functions cached, 0 when reuse is disabled
    pub fn cached_functions(&self) -> usize {
        self.compiled.as_ref().map_or(0, LruCache::len)
    }
}

/// Arena of interpreters keyed by [`ContextId`]
#[derive(Debug)]
pub struct InterpreterPool {
    engine: EngineConfig,
    cache_size: Option<usize>,
    contexts: HashMap<ContextId, ScriptContext>,
}

impl Default for InterpreterPool {
    fn default() -> Self {
        Self::new(&ScriptsConfig::default())
    }
}

impl InterpreterPool {
    /// Create an empty pool
    pub fn new(config: &ScriptsConfig) -> Self {
        Self {
            engine: config.engine_config(),
            cache_size: config
                .reuse_compiled_functions
                .then_some(config.compiled_cache_size),
            contexts: HashMap::new(),
        }
    }

    /// The context for `id`, creating and bootstrapping it on first use
    ///
    /// A failed bootstrap caches nothing, so the next call tries again.
    pub fn get_or_create(&mut self, id: ContextId) -> Result<&mut ScriptContext> {
        match self.contexts.entry(id) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                let context = ScriptContext::bootstrap(self.engine.clone(), self.cache_size)?;
                debug!("Created interpreter for {}", id);
                Ok(entry.insert(context))
            }
        }
    }

    /// Whether `id` already has an interpreter
    pub fn contains(&self, id: ContextId) -> bool {
        self.contexts.contains_key(&id)
    }

    /// Number of live contexts
    pub fn len(&self) -> usize {
        self.contexts.len()
    }

    /// Whether no context has been created
    pub fn is_empty(&self) -> bool {
        self.contexts.is_empty()
    }

    /// Drop the interpreter of a finished context
    pub fn release(&mut self, id: ContextId) -> bool {
        let released = self.contexts.remove(&id).is_some();
        if released {
            debug!("Released interpreter for {}", id);
        }
        released
    }
}
