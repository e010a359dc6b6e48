use std::io;
use std::process;

use gscript_cli::cli::parse_args;
use gscript_cli::commands::execute;
use gscript_cli::{Config, Result};
use gscript_core::ContextId;

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = parse_args();

    let mut config = Config::load()?;
    config.apply_cli(&cli)?;

    setup_logging(&config);

    let context = ContextId(cli.context);
    let command = cli.command.unwrap_or(gscript_cli::cli::Commands::Repl);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    execute(command, &config, context, &mut out)
}

fn setup_logging(config: &Config) {
    let log_level = match config.debug.verbosity {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    env_logger::Builder::new().filter_level(log_level).init();
}
