//! Registry configuration

use serde::{Deserialize, Serialize};

use gscript_engine::EngineConfig;
use gscript_shared::constants::{DEFAULT_COMPILED_CACHE_SIZE, DEFAULT_MAX_CALL_DEPTH};

/// Settings for a [`crate::Scripts`] registry and the interpreters it creates
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScriptsConfig {
    /// Maximum nesting of script function calls
    pub max_call_depth: usize,
    /// Re-bind a cached compiled function when the stored source is unchanged
    pub reuse_compiled_functions: bool,
    /// Compiled functions kept per interpreter when reuse is enabled
    pub compiled_cache_size: usize,
}

impl Default for ScriptsConfig {
    fn default() -> Self {
        Self {
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
            reuse_compiled_functions: false,
            compiled_cache_size: DEFAULT_COMPILED_CACHE_SIZE,
        }
    }
}

impl ScriptsConfig {
    /// Interpreter settings derived from this configuration
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig::default().with_max_call_depth(self.max_call_depth)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ScriptsConfig::default();
        assert_eq!(config.max_call_depth, 256);
        assert!(!config.reuse_compiled_functions);
        assert_eq!(config.engine_config().max_call_depth, 256);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: ScriptsConfig =
            serde_json::from_str(r#"{"reuse_compiled_functions": true}"#).unwrap();
        assert!(config.reuse_compiled_functions);
        assert_eq!(config.compiled_cache_size, DEFAULT_COMPILED_CACHE_SIZE);
    }
}
