//! Subcommand dispatch

use std::fs;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use log::{debug, info};

use gscript_core::{ContextId, GraphDatabase, MemoryGraph, Scripts};
use gscript_store::{FilePropertyStore, MemoryPropertyStore, PropertyStore};

use crate::cli::{Commands, ConfigCommands};
use crate::config::{create_default_config_file, validate_config, Config};
use crate::error::{Error, Result};
use crate::output::{parse_params, Output};
use crate::repl::Repl;

/// Build a registry from the configured store and graph
pub fn open_scripts(config: &Config) -> Result<Scripts> {
    let properties: Arc<dyn PropertyStore> = match &config.store.path {
        Some(path) => {
            debug!("Using property store {}", path.display());
            Arc::new(FilePropertyStore::open(path)?)
        }
        None => {
            info!("No store configured, registered functions will not persist");
            Arc::new(MemoryPropertyStore::new())
        }
    };

    let graph: Arc<dyn GraphDatabase> = match &config.graph.seed {
        Some(seed) => Arc::new(MemoryGraph::load(seed).map_err(Error::Graph)?),
        None => Arc::new(MemoryGraph::new()),
    };

    Ok(Scripts::new(properties, graph, config.scripts.clone()))
}

/// Execute one subcommand, writing its output to `out`
pub fn execute<W: Write>(
    command: Commands,
    config: &Config,
    context: ContextId,
    out: &mut W,
) -> Result<()> {
    let output = Output::new(config.debug.pretty);

    if let Commands::Config { command } = command {
        return handle_config_command(command, config, out);
    }

    validate_config(config)?;
    let mut scripts = open_scripts(config)?;

    match command {
        Commands::Register { name, code, file } => {
            let code = match (code, file) {
                (Some(code), _) => code,
                (None, Some(path)) => read_source(&path)?,
                (None, None) => return Err(Error::config("register needs code or --file")),
            };
            let status = scripts.register(&name, &code)?;
            output.write_status(out, &status)
        }
        Commands::Run { name, params } => {
            let records = scripts.run(context, &name, parse_params(&params))?;
            output.write_records(out, records).map(|_| ())
        }
        Commands::Call { name, params } => {
            let value = scripts.call(context, &name, parse_params(&params))?;
            output.write_value(out, &value)
        }
        Commands::Delete { name } => {
            let status = scripts.delete(&name)?;
            output.write_status(out, &status)
        }
        Commands::List => {
            for name in scripts.list()? {
                writeln!(out, "{}", name)?;
            }
            Ok(())
        }
        Commands::Show { name } => match scripts.source(&name)? {
            Some(source) => {
                writeln!(out, "{}", source)?;
                Ok(())
            }
            None => Err(gscript_core::ScriptError::DefinitionNotFound { name }.into()),
        },
        Commands::Eval { source } => {
            let value = scripts.eval(context, &source)?;
            output.write_value(out, &value)
        }
        Commands::Repl => Repl::new(scripts, context, output).run(),
        Commands::Config { .. } => Ok(()),
    }
}

fn read_source(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| {
        Error::config(format!("Failed to read {}: {}", path.display(), e))
    })
}

fn handle_config_command<W: Write>(
    command: ConfigCommands,
    config: &Config,
    out: &mut W,
) -> Result<()> {
    match command {
        ConfigCommands::Show => {
            let yaml = serde_yaml::to_string(config)
                .map_err(|e| Error::config(format!("Failed to serialize config: {}", e)))?;
            write!(out, "{}", yaml)?;
            Ok(())
        }
        ConfigCommands::Init { path, force } => {
            if path.exists() && !force {
                return Err(Error::config(format!(
                    "Config file already exists: {} (use --force to overwrite)",
                    path.display()
                )));
            }
            create_default_config_file(&path)?;
            writeln!(out, "Created config file: {}", path.display())?;
            Ok(())
        }
        ConfigCommands::Check { path } => {
            let checked = Config::load_from_file(&path)?;
            validate_config(&checked)?;
            writeln!(out, "Config file is valid: {}", path.display())?;
            Ok(())
        }
    }
}
