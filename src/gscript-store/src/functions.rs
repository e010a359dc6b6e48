//! Persisted script function definitions
//!
//! Each definition is one property: key `script.function.<name>`, value the
//! verbatim source text. Nothing is cached here; every read goes to the
//! underlying store so all registries see the latest definition.

use std::sync::Arc;

use log::debug;

use crate::{PropertyStore, Result};

/// Key prefix for stored function sources
pub const FUNCTION_KEY_PREFIX: &str = "script.function.";

/// Name → source mapping on top of a shared [`PropertyStore`]
#[derive(Clone)]
pub struct FunctionStore {
    properties: Arc<dyn PropertyStore>,
}

impl std::fmt::Debug for FunctionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FunctionStore").finish_non_exhaustive()
    }
}

fn key(name: &str) -> String {
    format!("{FUNCTION_KEY_PREFIX}{name}")
}

impl FunctionStore {
    /// Wrap a shared property store
    pub fn new(properties: Arc<dyn PropertyStore>) -> Self {
        Self { properties }
    }

    /// The underlying property store
    pub fn properties(&self) -> &Arc<dyn PropertyStore> {
        &self.properties
    }

    /// Source text for `name`, `None` when not registered
    pub fn get(&self, name: &str) -> Result<Option<String>> {
        self.properties.get(&key(name))
    }

    /// Store `source` under `name`; returns whether a definition was replaced
    ///
    /// The existence check and the write are separate store calls, so two
    /// concurrent puts of one name may both report `false`.
    pub fn put(&self, name: &str, source: &str) -> Result<bool> {
        let key = key(name);
        let replaced = self.properties.contains(&key)?;
        self.properties.set(&key, source)?;
        debug!(
            "{} function definition '{}'",
            if replaced { "Replaced" } else { "Stored" },
            name
        );
        Ok(replaced)
    }

    /// Remove `name`; a no-op when it is not registered
    pub fn remove(&self, name: &str) -> Result<()> {
        self.properties.remove(&key(name))
    }

    /// Whether `name` is registered
    pub fn contains(&self, name: &str) -> Result<bool> {
        self.properties.contains(&key(name))
    }

    /// Registered names in store order, prefix stripped
    pub fn list(&self) -> Result<impl Iterator<Item = String>> {
        let keys = self.properties.keys()?;
        Ok(keys
            .into_iter()
            .filter_map(|k| k.strip_prefix(FUNCTION_KEY_PREFIX).map(str::to_string)))
    }
}
