use std::sync::Arc;
use std::thread;

use gscript_core::{ContextId, MemoryGraph, ScriptError, Scripts, ScriptsConfig};
use gscript_shared::Value;
use gscript_store::{FilePropertyStore, MemoryPropertyStore, PropertyStore};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use tempfile::TempDir;

const CTX: ContextId = ContextId(1);

fn scripts() -> Scripts {
    Scripts::new(
        Arc::new(MemoryPropertyStore::new()),
        Arc::new(MemoryGraph::new()),
        ScriptsConfig::default(),
    )
}

fn run_values(scripts: &mut Scripts, name: &str, params: Vec<Value>) -> Vec<Value> {
    scripts
        .run(CTX, name, Some(params))
        .unwrap()
        .map(|r| r.unwrap().value)
        .collect()
}

#[test]
fn test_register_then_run_returns_single_record() {
    let mut scripts = scripts();
    let status = scripts
        .register("greet", "function(who){ return 'hi ' + who }")
        .unwrap();
    assert_eq!(status.message, "Added Function greet");
    assert_eq!(
        run_values(&mut scripts, "greet", vec![Value::string("bob")]),
        vec![Value::string("hi bob")]
    );
}

#[test]
fn test_reregister_reports_update_and_runs_new_code() {
    let mut scripts = scripts();
    scripts
        .register("greet", "function(who){ return 'hi ' + who }")
        .unwrap();
    run_values(&mut scripts, "greet", vec![Value::string("bob")]);

    let status = scripts
        .register("greet", "function(who){ return 'yo ' + who }")
        .unwrap();
    assert_eq!(status.message, "Updated Function greet");
    assert_eq!(
        run_values(&mut scripts, "greet", vec![Value::string("bob")]),
        vec![Value::string("yo bob")]
    );
}

#[test]
fn test_array_result_fans_out_in_order() {
    let mut scripts = scripts();
    scripts
        .register("nums", "function(){ return [1,2,3] }")
        .unwrap();
    assert_eq!(
        run_values(&mut scripts, "nums", vec![]),
        vec![Value::Int(1), Value::Int(2), Value::Int(3)]
    );
}

#[test]
fn test_deleted_function_is_not_defined() {
    let mut scripts = scripts();
    scripts
        .register("nums", "function(){ return [1,2,3] }")
        .unwrap();
    let status = scripts.delete("nums").unwrap();
    assert_eq!(status.message, "Function 'nums' removed");

    let err = scripts.run(CTX, "nums", Some(vec![])).unwrap_err();
    assert!(matches!(err, ScriptError::DefinitionNotFound { ref name } if name == "nums"));
}

#[test]
fn test_invalid_code_is_rejected_and_not_listed() {
    let scripts = scripts();
    let err = scripts.register("bad", "not valid syntax (").unwrap_err();
    assert!(matches!(err, ScriptError::Compile { ref name, .. } if name == "bad"));
    assert!(!scripts.list().unwrap().contains(&"bad".to_string()));
}

#[test]
fn test_run_on_empty_store_is_not_defined() {
    let mut scripts = scripts();
    let err = scripts.run(CTX, "anything", Some(vec![])).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Function anything not defined, use register('name', 'code')"
    );
    assert!(scripts.pool().is_empty());
    assert!(scripts.list().unwrap().is_empty());
}

#[test]
fn test_invalid_names_are_rejected() {
    let scripts = scripts();
    for name in ["", "1abc", "has space", "return", "a-b"] {
        let err = scripts.register(name, "function() {}").unwrap_err();
        assert!(err.is_compile_error(), "{name:?} should be rejected");
    }
    assert!(scripts.list().unwrap().is_empty());
}

#[test]
fn test_delete_is_idempotent_and_list_tracks_state() {
    let scripts = scripts();
    scripts.register("a", "function() { return 1 }").unwrap();
    scripts.register("b", "function() { return 2 }").unwrap();
    scripts.delete("a").unwrap();
    scripts.delete("a").unwrap();
    scripts.delete("never").unwrap();
    assert_eq!(scripts.list().unwrap(), vec!["b"]);
    assert_eq!(
        scripts.source("b").unwrap().as_deref(),
        Some("function() { return 2 }")
    );
}

#[test]
fn test_missing_params_mean_no_arguments() {
    let mut scripts = scripts();
    scripts
        .register("count", "function() { return arguments.length }")
        .unwrap();
    assert_eq!(scripts.call(CTX, "count", None).unwrap(), Value::Int(0));
    assert_eq!(
        scripts
            .call(CTX, "count", Some(vec![Value::Int(1), Value::Null]))
            .unwrap(),
        Value::Int(2)
    );
}

#[test]
fn test_lazy_infinite_iterator_can_be_consumed_partially() {
    let mut scripts = scripts();
    scripts
        .register(
            "naturals",
            "function() { var i = 0; return { hasNext: () => true, next: () => i++ } }",
        )
        .unwrap();
    let first: Vec<Value> = scripts
        .run(CTX, "naturals", None)
        .unwrap()
        .take(5)
        .map(|r| r.unwrap().value)
        .collect();
    assert_eq!(first, (0..5).map(Value::Int).collect::<Vec<_>>());
}

#[test]
fn test_thrown_errors_keep_the_value() {
    let mut scripts = scripts();
    scripts
        .register(
            "fail",
            "function(code) { throw {message: 'failed with ' + code, code: code} }",
        )
        .unwrap();
    let err = scripts
        .call(CTX, "fail", Some(vec![Value::Int(7)]))
        .unwrap_err();
    assert_eq!(err.to_string(), "Error invoking function fail: failed with 7");
    assert_eq!(err.thrown_value().unwrap()["code"], 7);
}

#[test]
fn test_bootstrap_bindings_and_database_access() {
    let mut scripts = scripts();
    scripts
        .register(
            "seed",
            "function(n) { for (var i = 0; i < n; i++) { db.createNode(label('User')).setProperty('i', i) } }",
        )
        .unwrap();
    scripts
        .register(
            "users",
            "function() { return collection(db.findNodes(label('User'))).map(n => n.getProperty('i')) }",
        )
        .unwrap();
    scripts
        .register("lazyUsers", "function() { return db.findNodes(label('User')) }")
        .unwrap();

    scripts.call(CTX, "seed", Some(vec![Value::Int(3)])).unwrap();
    assert_eq!(
        run_values(&mut scripts, "users", vec![]),
        vec![Value::Int(0), Value::Int(1), Value::Int(2)]
    );

    let nodes = run_values(&mut scripts, "lazyUsers", vec![]);
    assert_eq!(nodes.len(), 3);
    assert_eq!(nodes[0].type_name(), "Node");

    let label = scripts.call(CTX, "label", Some(vec![Value::string("X")])).unwrap();
    assert_eq!(label.to_string(), "X");
}

#[test]
fn test_contexts_are_isolated() {
    let mut scripts = scripts();
    scripts
        .register("remember", "function(v) { if (v) { memo = v } return memo }")
        .unwrap();
    scripts
        .call(ContextId(1), "remember", Some(vec![Value::string("one")]))
        .unwrap();
    assert_eq!(
        scripts.call(ContextId(1), "remember", None).unwrap(),
        Value::string("one")
    );
    assert!(scripts.call(ContextId(2), "remember", None).is_err());
    assert_eq!(scripts.pool().len(), 2);
    assert!(scripts.release(ContextId(2)));
}

#[test]
fn test_recursion_limit_is_an_invocation_error() {
    let mut scripts = Scripts::new(
        Arc::new(MemoryPropertyStore::new()),
        Arc::new(MemoryGraph::new()),
        ScriptsConfig {
            max_call_depth: 32,
            ..ScriptsConfig::default()
        },
    );
    scripts
        .register("loop", "function(n) { return loop(n + 1) }")
        .unwrap();
    let err = scripts.call(CTX, "loop", Some(vec![Value::Int(0)])).unwrap_err();
    assert!(matches!(err, ScriptError::Invocation { .. }));
    assert!(err.to_string().contains("maximum call depth of 32"));
}

#[test]
fn test_reuse_still_runs_latest_definition() {
    let mut scripts = Scripts::new(
        Arc::new(MemoryPropertyStore::new()),
        Arc::new(MemoryGraph::new()),
        ScriptsConfig {
            reuse_compiled_functions: true,
            ..ScriptsConfig::default()
        },
    );
    scripts.register("v", "function() { return 1 }").unwrap();
    assert_eq!(scripts.call(CTX, "v", None).unwrap(), Value::Int(1));
    assert_eq!(scripts.call(CTX, "v", None).unwrap(), Value::Int(1));
    scripts.register("v", "function() { return 2 }").unwrap();
    assert_eq!(scripts.call(CTX, "v", None).unwrap(), Value::Int(2));
}

#[test]
fn test_eval_sees_registered_functions_after_run() {
    let mut scripts = scripts();
    scripts.register("sq", "function(x) { return x * x }").unwrap();
    scripts.call(CTX, "sq", Some(vec![Value::Int(3)])).unwrap();
    assert_eq!(scripts.eval(CTX, "sq(4) + 1").unwrap(), Value::Int(17));
    assert!(scripts.eval(CTX, "log.info('hello %s', 'world')").is_ok());
}

#[test]
fn test_registries_on_worker_threads_share_the_store() {
    let properties: Arc<dyn PropertyStore> = Arc::new(MemoryPropertyStore::new());
    let graph = Arc::new(MemoryGraph::new());

    let admin = Scripts::new(Arc::clone(&properties), graph.clone(), ScriptsConfig::default());
    admin
        .register("add", "function(a, b) { return a + b }")
        .unwrap();

    let workers: Vec<_> = (0..4i64)
        .map(|i| {
            let properties = Arc::clone(&properties);
            let graph = graph.clone();
            thread::spawn(move || {
                let mut scripts = Scripts::new(properties, graph, ScriptsConfig::default());
                scripts
                    .call(ContextId(0), "add", Some(vec![Value::Int(i), Value::Int(10)]))
                    .unwrap()
                    .as_i64()
                    .unwrap()
            })
        })
        .collect();
    let mut results: Vec<i64> = workers.into_iter().map(|w| w.join().unwrap()).collect();
    results.sort_unstable();
    assert_eq!(results, vec![10, 11, 12, 13]);
}

#[test]
fn test_definitions_persist_in_file_store() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("properties.json");
    {
        let scripts = Scripts::new(
            Arc::new(FilePropertyStore::open(&path).unwrap()),
            Arc::new(MemoryGraph::new()),
            ScriptsConfig::default(),
        );
        scripts.register("hello", "function() { return 'hello' }").unwrap();
    }
    let mut scripts = Scripts::new(
        Arc::new(FilePropertyStore::open(&path).unwrap()),
        Arc::new(MemoryGraph::new()),
        ScriptsConfig::default(),
    );
    assert_eq!(
        scripts.call(CTX, "hello", None).unwrap(),
        Value::string("hello")
    );
}

#[test]
fn test_deep_recursion_on_default_thread_stack() {
    let handle = thread::spawn(|| {
        let mut scripts = scripts();
        scripts
            .register(
                "down",
                "function(n){ if (n == 0) { return 0 } return 1 + down(n - 1) }",
            )
            .unwrap();
        let shallow = scripts.call(CTX, "down", Some(vec![Value::Int(200)]));
        let deep = scripts.call(CTX, "down", Some(vec![Value::Int(1000)]));
        // Value holds Rc and is not Send, so the checks run on the spawned thread
        let (shallow, deep) = (shallow.unwrap(), deep.unwrap_err());
        assert_eq!(shallow, Value::Int(200));
        assert!(matches!(deep, ScriptError::Invocation { .. }));
        assert!(deep.to_string().contains("maximum call depth of 256"));
    });
    handle.join().unwrap();
}

#[test]
fn test_failed_store_write_registers_nothing() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("missing").join("properties.json");
    let mut scripts = Scripts::new(
        Arc::new(FilePropertyStore::open(&path).unwrap()),
        Arc::new(MemoryGraph::new()),
        ScriptsConfig::default(),
    );
    let err = scripts
        .register("ghost", "function() { return 1 }")
        .unwrap_err();
    assert!(matches!(err, ScriptError::StoreAccess(_)));
    assert!(scripts.list().unwrap().is_empty());
    assert!(matches!(
        scripts.call(CTX, "ghost", None),
        Err(ScriptError::DefinitionNotFound { .. })
    ));
}

#[test]
fn test_released_contexts_drop_their_graph_handles() {
    let graph = Arc::new(MemoryGraph::new());
    let mut scripts = Scripts::new(
        Arc::new(MemoryPropertyStore::new()),
        graph.clone(),
        ScriptsConfig::default(),
    );
    let baseline = Arc::strong_count(&graph);
    scripts
        .register(
            "closes",
            "function() { var g = db; var keep = function() { return g }; return 1 }",
        )
        .unwrap();

    for id in 0..20 {
        let context = ContextId(id);
        for _ in 0..3 {
            assert_eq!(scripts.call(context, "closes", None).unwrap(), Value::Int(1));
        }
    }
    assert!(Arc::strong_count(&graph) > baseline);

    for id in 0..20 {
        assert!(scripts.release(ContextId(id)));
    }
    assert_eq!(Arc::strong_count(&graph), baseline);
}

#[test]
fn test_deeply_nested_code_is_rejected() {
    let scripts = scripts();
    let code = format!(
        "function() {{ return {}1{} }}",
        "(".repeat(3000),
        ")".repeat(3000)
    );
    let err = scripts.register("deep", &code).unwrap_err();
    assert!(matches!(err, ScriptError::Compile { .. }));
    assert!(scripts.list().unwrap().is_empty());
}

#[test]
fn test_eval_separates_compile_and_runtime_errors() {
    let mut scripts = scripts();
    assert!(matches!(
        scripts.eval(CTX, "1 +"),
        Err(ScriptError::Compile { .. })
    ));
    assert!(matches!(
        scripts.eval(CTX, "throw 'boom'"),
        Err(ScriptError::Invocation { .. })
    ));
    assert_eq!(scripts.eval(CTX, "1 + 1").unwrap(), Value::Int(2));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_registered_source_round_trips(
        name in "[a-z_][a-z0-9_]{0,10}",
        value in -1000i64..1000,
    ) {
        prop_assume!(gscript_parser::is_identifier(&name));
        let mut scripts = scripts();
        let code = format!("function() {{ return {value} }}");
        scripts.register(&name, &code).unwrap();
        prop_assert_eq!(scripts.source(&name).unwrap(), Some(code));
        prop_assert_eq!(scripts.list().unwrap(), vec![name.clone()]);
        prop_assert_eq!(scripts.call(CTX, &name, None).unwrap(), Value::Int(value));
    }
}
