//! Command-line interface definition

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// gscript - stored script functions over a graph
#[derive(Parser, Debug, Clone)]
#[command(
    name = "gscript",
    author,
    version,
    about = "Register and run stored script functions over a graph",
    long_about = "gscript keeps named script functions in a property store and runs \
                  them against a graph, streaming each result as a JSON record.",
    after_help = "EXAMPLES:
    # Register a function
    gscript --store fns.json register greet 'function(name) { return \"hi \" + name }'

    # Run it with JSON arguments
    gscript --store fns.json run greet '\"bob\"'

    # Query a seeded graph
    gscript --store fns.json --graph graph.json run people

    # List and remove functions
    gscript --store fns.json list
    gscript --store fns.json delete greet

    # Interactive session
    gscript --store fns.json --graph graph.json repl"
)]
pub struct Cli {
    /// Configuration file to load on top of the discovered one
    #[arg(short = 'c', long = "config", value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Property store file holding registered functions
    #[arg(short = 's', long = "store", value_name = "FILE", global = true)]
    pub store: Option<PathBuf>,

    /// JSON graph seed to load
    #[arg(short = 'g', long = "graph", value_name = "FILE", global = true)]
    pub graph: Option<PathBuf>,

    /// Execution context to run in
    #[arg(long = "context", value_name = "ID", default_value_t = 0, global = true)]
    pub context: u64,

    /// Maximum nesting of script function calls
    #[arg(long = "max-call-depth", value_name = "N", global = true)]
    pub max_call_depth: Option<usize>,

    /// Reuse compiled functions while the stored source is unchanged
    #[arg(long = "reuse-compiled", global = true)]
    pub reuse_compiled: bool,

    /// Pretty-print JSON output
    #[arg(short = 'p', long = "pretty", global = true)]
    pub pretty: bool,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Register or replace a function
    Register {
        /// Function name
        name: String,
        /// Function expression, e.g. `function(x) { return x }`
        #[arg(required_unless_present = "file", conflicts_with = "file")]
        code: Option<String>,
        /// Read the function expression from a file
        #[arg(short = 'f', long = "file", value_name = "FILE")]
        file: Option<PathBuf>,
    },

    /// Run a function and print one JSON record per result
    Run {
        /// Function name
        name: String,
        /// Arguments; each is parsed as JSON, falling back to a plain string
        params: Vec<String>,
    },

    /// Run a function and print its raw return value
    Call {
        /// Function name
        name: String,
        /// Arguments; each is parsed as JSON, falling back to a plain string
        params: Vec<String>,
    },

    /// Remove a function
    Delete {
        /// Function name
        name: String,
    },

    /// List registered functions
    List,

    /// Print the stored source of a function
    Show {
        /// Function name
        name: String,
    },

    /// Evaluate source with `db` and `log` bound
    Eval {
        /// Script source
        source: String,
    },

    /// Start an interactive session
    Repl,

    /// Configuration management
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

/// Configuration subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum ConfigCommands {
    /// Show the effective configuration
    Show,

    /// Write a default configuration file
    Init {
        /// Path to write
        #[arg(default_value = "gscript.toml")]
        path: PathBuf,
        /// Overwrite an existing file
        #[arg(long = "force")]
        force: bool,
    },

    /// Validate a configuration file
    Check {
        /// Path to check
        path: PathBuf,
    },
}

/// Parse command-line arguments
pub fn parse_args() -> Cli {
    Cli::parse()
}

/// Parse arguments from an iterator (for tests)
pub fn parse_args_from<I, T>(args: I) -> Result<Cli, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    Cli::try_parse_from(args)
}
