use std::hint::black_box;
use std::sync::Arc;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use graphscript::store::MemoryPropertyStore;
use graphscript::{ContextId, GraphSeed, MemoryGraph, NodeRecord, Scripts, ScriptsConfig, Value};

fn seeded_graph(nodes: usize) -> MemoryGraph {
    let nodes = (0..nodes)
        .map(|i| NodeRecord {
            id: i as u64,
            labels: vec![if i % 2 == 0 { "Person" } else { "Place" }.to_string()],
            properties: [("name".to_string(), serde_json::json!(format!("n{}", i)))]
                .into_iter()
                .collect(),
        })
        .collect();
    MemoryGraph::from_seed(GraphSeed {
        nodes,
        relationships: Vec::new(),
    })
    .unwrap()
}

fn scripts(reuse: bool, nodes: usize) -> Scripts {
    let config = ScriptsConfig {
        reuse_compiled_functions: reuse,
        ..ScriptsConfig::default()
    };
    Scripts::new(
        Arc::new(MemoryPropertyStore::new()),
        Arc::new(seeded_graph(nodes)),
        config,
    )
}

// Benchmark registration (validate + store)
fn bench_register(c: &mut Criterion) {
    let scripts = scripts(false, 0);
    let mut i = 0u64;
    c.bench_function("register", |b| {
        b.iter(|| {
            i += 1;
            let name = format!("f{}", i % 64);
            black_box(
                scripts
                    .register(&name, "function(a, b) { var s = 0; for (var i = a; i < b; i++) { s += i } return s }")
                    .unwrap(),
            )
        })
    });
}

// Benchmark repeated runs, binding fresh vs reusing compiled functions
fn bench_run(c: &mut Criterion) {
    let mut group = c.benchmark_group("run_scalar");

    for reuse in [false, true] {
        let mut scripts = scripts(reuse, 0);
        scripts
            .register("fib", "function(n) { var a = 0, b = 1; for (var i = 0; i < n; i++) { var t = a + b; a = b; b = t } return a }")
            .unwrap();

        group.bench_with_input(BenchmarkId::new("reuse", reuse), &reuse, |b, _| {
            b.iter(|| {
                let records = scripts
                    .run(ContextId(1), "fib", Some(vec![Value::Int(30)]))
                    .unwrap();
                black_box(records.count())
            })
        });
    }

    group.finish();
}

// Benchmark streaming graph query results
fn bench_graph_query(c: &mut Criterion) {
    let mut group = c.benchmark_group("graph_query");

    for size in [100, 1000, 10000].iter() {
        group.throughput(Throughput::Elements(*size as u64));
        let mut scripts = scripts(true, *size);
        scripts
            .register("people", "function() { return db.findNodes(label('Person')) }")
            .unwrap();

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| {
                let records = scripts.run(ContextId(1), "people", None).unwrap();
                black_box(records.count())
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_register, bench_run, bench_graph_query);
criterion_main!(benches);
