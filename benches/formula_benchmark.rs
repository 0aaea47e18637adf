//! Formula Engine Performance Benchmarks
//!
//! Parser throughput and evaluation through the tree walker versus compiled closures.

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use octo_formula::{FormulaEngine, JsonContext, parse};
use serde_json::json;
use std::hint::black_box;

const TEST_EXPRESSIONS: &[(&str, &str)] = &[
    ("simple", "unit.hp * 2"),
    ("medium", "unit.hp / unit.max_hp < 0.25 && !unit.fleeing"),
    (
        "complex",
        "clamp(base * (1 + bonus) - armor[0] + max(unit.hp, 10) ^ 2 / 100, 0, 1000)",
    ),
];

fn context() -> JsonContext {
    JsonContext::new(json!({
        "unit": { "hp": 30, "max_hp": 120, "fleeing": false },
        "base": 40,
        "bonus": 0.5,
        "armor": [7, 3]
    }))
}

fn bench_parser(c: &mut Criterion) {
    let mut group = c.benchmark_group("parser");
    group.throughput(Throughput::Elements(1));

    for (complexity, expression) in TEST_EXPRESSIONS {
        group.bench_with_input(
            BenchmarkId::new("parse", complexity),
            expression,
            |b, expr| b.iter(|| black_box(parse(black_box(expr), false))),
        );
        group.bench_with_input(
            BenchmarkId::new("parse_and_compile", complexity),
            expression,
            |b, expr| b.iter(|| black_box(parse(black_box(expr), true))),
        );
    }

    group.finish();
}

fn bench_evaluator(c: &mut Criterion) {
    let mut group = c.benchmark_group("evaluator");
    group.throughput(Throughput::Elements(1));
    let ctx = context();

    for (complexity, expression) in TEST_EXPRESSIONS {
        let walked = parse(expression, false).expect("benchmark formula parses");
        let compiled = parse(expression, true).expect("benchmark formula parses");

        group.bench_function(BenchmarkId::new("tree_walk", complexity), |b| {
            b.iter(|| black_box(walked.calc(&ctx, true)))
        });
        group.bench_function(BenchmarkId::new("compiled", complexity), |b| {
            b.iter(|| black_box(compiled.calc(&ctx, true)))
        });
    }

    group.finish();
}

fn bench_engine(c: &mut Criterion) {
    let mut group = c.benchmark_group("engine");
    group.throughput(Throughput::Elements(1));
    let engine = FormulaEngine::new();
    let ctx = context();

    for (complexity, expression) in TEST_EXPRESSIONS {
        group.bench_with_input(
            BenchmarkId::new("evaluate_cached", complexity),
            expression,
            |b, expr| b.iter(|| black_box(engine.evaluate(black_box(expr), &ctx))),
        );
    }

    group.finish();
}

criterion_group!(benches, bench_parser, bench_evaluator, bench_engine);
criterion_main!(benches);
