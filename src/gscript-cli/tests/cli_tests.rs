use std::fs;
use std::path::Path;

use gscript_cli::cli::{parse_args_from, Commands};
use gscript_cli::commands::execute;
use gscript_cli::{Config, Error};
use gscript_core::{ContextId, ScriptError};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn config_for(dir: &Path) -> Config {
    let mut config = Config::new();
    config.store.path = Some(dir.join("functions.json"));
    config
}

fn command(args: &[&str]) -> Commands {
    let mut argv = vec!["gscript"];
    argv.extend_from_slice(args);
    parse_args_from(argv).unwrap().command.unwrap()
}

fn exec(config: &Config, args: &[&str]) -> Result<String, Error> {
    let mut out = Vec::new();
    execute(command(args), config, ContextId(0), &mut out)?;
    Ok(String::from_utf8(out).unwrap())
}

#[test]
fn test_functions_persist_between_invocations() {
    let dir = TempDir::new().unwrap();
    let config = config_for(dir.path());

    assert_eq!(
        exec(&config, &["register", "greet", "function(name) { return 'hi ' + name }"]).unwrap(),
        "{\"message\":\"Added Function greet\"}\n"
    );
    assert_eq!(exec(&config, &["run", "greet", "bob"]).unwrap(), "{\"value\":\"hi bob\"}\n");
    assert_eq!(exec(&config, &["list"]).unwrap(), "greet\n");
    assert_eq!(
        exec(&config, &["register", "greet", "function(name) { return 'yo ' + name }"]).unwrap(),
        "{\"message\":\"Updated Function greet\"}\n"
    );
    assert_eq!(exec(&config, &["call", "greet", "\"ann\""]).unwrap(), "\"yo ann\"\n");
}

#[test]
fn test_run_streams_array_elements() {
    let dir = TempDir::new().unwrap();
    let config = config_for(dir.path());

    exec(&config, &["register", "nums", "function(n) { r = []; for (var i = 0; i < n; i++) { r.push(i) } return r }"])
        .unwrap();
    assert_eq!(
        exec(&config, &["run", "nums", "3"]).unwrap(),
        "{\"value\":0}\n{\"value\":1}\n{\"value\":2}\n"
    );
}

#[test]
fn test_register_from_file() {
    let dir = TempDir::new().unwrap();
    let config = config_for(dir.path());
    let source = dir.path().join("sum.js");
    fs::write(&source, "function(a, b) { return a + b }\n").unwrap();

    exec(&config, &["register", "sum", "--file", source.to_str().unwrap()]).unwrap();
    assert_eq!(exec(&config, &["call", "sum", "2", "3"]).unwrap(), "5\n");
}

#[test]
fn test_errors_surface_as_script_errors() {
    let dir = TempDir::new().unwrap();
    let config = config_for(dir.path());

    let err = exec(&config, &["run", "missing"]).unwrap_err();
    assert!(matches!(
        err,
        Error::Script(ScriptError::DefinitionNotFound { .. })
    ));

    let err = exec(&config, &["register", "bad", "function( {"]).unwrap_err();
    assert!(matches!(err, Error::Script(ScriptError::Compile { .. })));
    assert_eq!(exec(&config, &["list"]).unwrap(), "");

    assert!(exec(&config, &["show", "missing"]).is_err());
}

#[test]
fn test_delete_and_show() {
    let dir = TempDir::new().unwrap();
    let config = config_for(dir.path());

    exec(&config, &["register", "f", "function() { return 1 }"]).unwrap();
    assert_eq!(exec(&config, &["show", "f"]).unwrap(), "function() { return 1 }\n");
    assert_eq!(
        exec(&config, &["delete", "f"]).unwrap(),
        "{\"message\":\"Function 'f' removed\"}\n"
    );
    assert_eq!(exec(&config, &["list"]).unwrap(), "");
}

#[test]
fn test_graph_seed_is_queryable() {
    let dir = TempDir::new().unwrap();
    let seed = dir.path().join("graph.json");
    fs::write(
        &seed,
        r#"{"nodes": [
            {"id": 1, "labels": ["Person"], "properties": {"name": "Ann"}},
            {"id": 2, "labels": ["Person"], "properties": {"name": "Bob"}}
        ]}"#,
    )
    .unwrap();

    let mut config = config_for(dir.path());
    config.graph.seed = Some(seed);

    exec(
        &config,
        &["register", "names", "function() { return collection(db.findNodes(label('Person'))).map(function(n) { return n.getProperty('name') }) }"],
    )
    .unwrap();
    assert_eq!(
        exec(&config, &["run", "names"]).unwrap(),
        "{\"value\":\"Ann\"}\n{\"value\":\"Bob\"}\n"
    );
}

#[test]
fn test_config_init_and_check() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("gscript.toml");
    let config = Config::new();
    let path_arg = path.to_str().unwrap();

    let out = exec(&config, &["config", "init", path_arg]).unwrap();
    assert!(out.starts_with("Created config file"));
    assert!(exec(&config, &["config", "init", path_arg]).is_err());
    assert!(exec(&config, &["config", "init", path_arg, "--force"]).is_ok());

    let out = exec(&config, &["config", "check", path_arg]).unwrap();
    assert!(out.starts_with("Config file is valid"));

    let shown = exec(&config, &["config", "show"]).unwrap();
    assert!(shown.contains("max_call_depth: 256"));
}

#[test]
fn test_eval_with_in_memory_store() {
    let config = Config::new();
    assert_eq!(exec(&config, &["eval", "[1, 2].length"]).unwrap(), "2\n");
}
