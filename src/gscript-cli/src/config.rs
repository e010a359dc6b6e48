//! Configuration for the `gscript` binary
//!
//! Settings are layered: defaults, then the first configuration file found
//! in the standard locations, then `GSCRIPT_*` environment variables, then
//! an explicit `--config` file, then command-line flags.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use gscript_core::ScriptsConfig;

use crate::cli::Cli;
use crate::error::{Error, Result};

const CONFIG_NAMES: [&str; 4] = ["gscript.toml", ".gscript.toml", "gscript.yaml", ".gscript.yaml"];

/// Upper bound accepted for `max_call_depth`
const MAX_REASONABLE_CALL_DEPTH: usize = 100_000;

/// Complete configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Registry and interpreter settings
    pub scripts: ScriptsConfig,
    /// Where registered functions are kept
    pub store: StoreConfig,
    /// Graph to run against
    pub graph: GraphConfig,
    /// Logging and output
    pub debug: DebugConfig,
}

/// Property store location
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// JSON file backing the store; in-memory when unset
    pub path: Option<PathBuf>,
}

/// Graph source
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    /// JSON seed loaded at startup; empty graph when unset
    pub seed: Option<PathBuf>,
}

/// Logging and output settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugConfig {
    /// 0 = warn, 1 = info, 2 = debug, 3+ = trace
    pub verbosity: u8,
    /// Pretty-print JSON output
    pub pretty: bool,
}

impl Config {
    /// Default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a single file on top of the defaults
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let mut config = Self::default();
        config.merge_file(path)?;
        Ok(config)
    }

    /// Load from the standard file locations and the environment
    pub fn load() -> Result<Self> {
        let mut config = Self::default();

        if let Some(config_path) = Self::find_config_file(None) {
            log::debug!("Loading config from {}", config_path.display());
            config.merge_file(&config_path)?;
        }

        config.merge_env()?;

        Ok(config)
    }

    /// Find a configuration file in the standard locations
    ///
    /// Checks `current_dir` (or the process working directory), then the
    /// user configuration directory, then the home directory, then
    /// `/etc/gscript`.
    pub(crate) fn find_config_file(current_dir: Option<&Path>) -> Option<PathBuf> {
        let current_dir = match current_dir {
            Some(dir) => dir.to_path_buf(),
            None => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
        };

        let mut dirs_to_check = vec![current_dir];
        if let Some(config_dir) = dirs::config_dir() {
            dirs_to_check.push(config_dir.join("gscript"));
        }
        if let Some(home) = dirs::home_dir() {
            dirs_to_check.push(home);
        }
        dirs_to_check.push(PathBuf::from("/etc/gscript"));

        dirs_to_check
            .iter()
            .flat_map(|dir| CONFIG_NAMES.iter().map(move |name| dir.join(name)))
            .find(|path| path.is_file())
    }

    /// Merge a TOML or YAML file, chosen by extension
    pub fn merge_file(&mut self, path: &Path) -> Result<()> {
        let content = fs::read_to_string(path)
            .map_err(|e| Error::config(format!("Failed to read config file: {}", e)))?;

        let extension = path.extension().and_then(|ext| ext.to_str()).unwrap_or("");

        let file_config: Config = match extension {
            "toml" => toml::from_str(&content)
                .map_err(|e| Error::config(format!("Invalid TOML config: {}", e)))?,
            "yaml" | "yml" => serde_yaml::from_str(&content)
                .map_err(|e| Error::config(format!("Invalid YAML config: {}", e)))?,
            _ => return Err(Error::config("Unsupported config file format")),
        };
        self.merge(file_config);

        Ok(())
    }

    fn merge_env(&mut self) -> Result<()> {
        self.merge_env_with_reader(|key| std::env::var(key).ok())
    }

    fn merge_env_with_reader<F>(&mut self, env_reader: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = env_reader("GSCRIPT_STORE") {
            self.store.path = (!val.is_empty()).then(|| PathBuf::from(val));
        }

        if let Some(val) = env_reader("GSCRIPT_GRAPH") {
            self.graph.seed = (!val.is_empty()).then(|| PathBuf::from(val));
        }

        if let Some(val) = env_reader("GSCRIPT_MAX_CALL_DEPTH") {
            self.scripts.max_call_depth = val
                .parse()
                .unwrap_or_else(|_| ScriptsConfig::default().max_call_depth);
        }

        if let Some(val) = env_reader("GSCRIPT_REUSE_COMPILED") {
            self.scripts.reuse_compiled_functions = val != "0" && val.to_lowercase() != "false";
        }

        if let Some(val) = env_reader("GSCRIPT_CACHE_SIZE") {
            self.scripts.compiled_cache_size = val
                .parse()
                .unwrap_or_else(|_| ScriptsConfig::default().compiled_cache_size);
        }

        if let Some(val) = env_reader("GSCRIPT_VERBOSITY") {
            self.debug.verbosity = val
                .parse()
                .unwrap_or_else(|_| DebugConfig::default().verbosity);
        }

        Ok(())
    }

    /// Overlay non-default values from `other`
    fn merge(&mut self, other: Config) {
        let defaults = ScriptsConfig::default();
        if other.scripts.max_call_depth != defaults.max_call_depth {
            self.scripts.max_call_depth = other.scripts.max_call_depth;
        }
        if other.scripts.reuse_compiled_functions != defaults.reuse_compiled_functions {
            self.scripts.reuse_compiled_functions = other.scripts.reuse_compiled_functions;
        }
        if other.scripts.compiled_cache_size != defaults.compiled_cache_size {
            self.scripts.compiled_cache_size = other.scripts.compiled_cache_size;
        }

        if other.store.path.is_some() {
            self.store.path = other.store.path;
        }
        if other.graph.seed.is_some() {
            self.graph.seed = other.graph.seed;
        }

        if other.debug.verbosity != 0 {
            self.debug.verbosity = other.debug.verbosity;
        }
        if other.debug.pretty {
            self.debug.pretty = true;
        }
    }

    /// Apply command-line flags, which take precedence over everything else
    pub fn apply_cli(&mut self, cli: &Cli) -> Result<()> {
        if let Some(path) = &cli.config {
            self.merge_file(path)?;
        }
        if let Some(path) = &cli.store {
            self.store.path = Some(path.clone());
        }
        if let Some(path) = &cli.graph {
            self.graph.seed = Some(path.clone());
        }
        if let Some(depth) = cli.max_call_depth {
            self.scripts.max_call_depth = depth;
        }
        if cli.reuse_compiled {
            self.scripts.reuse_compiled_functions = true;
        }
        if cli.verbose > 0 {
            self.debug.verbosity = cli.verbose;
        }
        if cli.pretty {
            self.debug.pretty = true;
        }
        Ok(())
    }

    /// Save to a TOML or YAML file, chosen by extension
    pub fn save(&self, path: &Path) -> Result<()> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("toml");

        let content = match extension {
            "toml" => toml::to_string_pretty(self)
                .map_err(|e| Error::config(format!("Failed to serialize config: {}", e)))?,
            "yaml" | "yml" => serde_yaml::to_string(self)
                .map_err(|e| Error::config(format!("Failed to serialize config: {}", e)))?,
            _ => return Err(Error::config("Unsupported config file format")),
        };

        fs::write(path, content)
            .map_err(|e| Error::config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }
}

/// Write a default configuration file
pub fn create_default_config_file(path: &Path) -> Result<()> {
    Config::default().save(path)
}

/// Reject settings the registry cannot run with
pub fn validate_config(config: &Config) -> Result<()> {
    if config.scripts.max_call_depth == 0 {
        return Err(Error::config("Max call depth must be greater than 0"));
    }

    if config.scripts.max_call_depth > MAX_REASONABLE_CALL_DEPTH {
        return Err(Error::config("Max call depth seems unreasonably high"));
    }

    if config.scripts.reuse_compiled_functions && config.scripts.compiled_cache_size == 0 {
        return Err(Error::config(
            "Compiled cache size must be greater than 0 when reuse is enabled",
        ));
    }

    if let Some(seed) = &config.graph.seed {
        if !seed.exists() {
            return Err(Error::config(format!(
                "Graph seed does not exist: {}",
                seed.display()
            )));
        }
    }

    Ok(())
}
