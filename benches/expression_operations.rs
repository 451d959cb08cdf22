//! Benchmarks for expression building, negation and SQL rendering.

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;
use strata::prelude::*;
use strata::{InlineFormatter, SqlFormatter};

fn age() -> Argument<i64> {
    Argument::of(PropertyPath::new("age"))
}

fn name() -> Argument<String> {
    Argument::of(PropertyPath::new("name"))
}

/// An OR of `width` range checks.
fn create_wide_expression(width: usize) -> Expression {
    or((0..width).map(|i| age().between(i as i64 * 10, i as i64 * 10 + 5)))
}

/// Alternating AND/OR nesting `depth` levels deep.
fn create_nested_expression(depth: usize) -> Expression {
    if depth == 0 {
        name().starts_with("J")
    } else if depth % 2 == 0 {
        create_nested_expression(depth - 1).and(age().gt(depth as i64))
    } else {
        create_nested_expression(depth - 1).or(age().lt(-(depth as i64)))
    }
}

// ============================================================================
// Construction Benchmarks
// ============================================================================

fn bench_construction(c: &mut Criterion) {
    let mut group = c.benchmark_group("expression_construction");

    group.bench_function("single_predicate", |b| b.iter(|| black_box(age().gt(18))));

    group.bench_function("literal_folding", |b| {
        b.iter(|| black_box(Argument::literal(3_i64).gt(2).and(age().gt(18))))
    });

    for width in [4, 16, 64] {
        group.throughput(Throughput::Elements(width as u64));
        group.bench_with_input(BenchmarkId::new("wide_or", width), &width, |b, &width| {
            b.iter(|| black_box(create_wide_expression(width)))
        });
    }

    group.finish();
}

// ============================================================================
// Negation Benchmarks
// ============================================================================

fn bench_negation(c: &mut Criterion) {
    let mut group = c.benchmark_group("expression_negation");

    for depth in [2, 8, 32] {
        let expr = create_nested_expression(depth);
        group.bench_with_input(BenchmarkId::new("nested", depth), &expr, |b, expr| {
            b.iter(|| black_box(expr.negate()))
        });
    }

    group.finish();
}

// ============================================================================
// Rendering Benchmarks
// ============================================================================

fn bench_rendering(c: &mut Criterion) {
    let mut group = c.benchmark_group("expression_rendering");

    for width in [4, 16, 64] {
        let expr = create_wide_expression(width);

        group.bench_with_input(BenchmarkId::new("inline", width), &expr, |b, expr| {
            b.iter(|| {
                let mut formatter = InlineFormatter::new();
                expr.format(&mut formatter, false);
                black_box(formatter.into_string())
            })
        });

        group.bench_with_input(BenchmarkId::new("postgres", width), &expr, |b, expr| {
            b.iter(|| {
                let mut formatter = SqlFormatter::postgres();
                expr.format(&mut formatter, false);
                black_box(formatter.build())
            })
        });
    }

    let negated = create_nested_expression(16).negate();
    group.bench_function("negated_resolved", |b| {
        b.iter(|| {
            let mut formatter = SqlFormatter::postgres().with_negation_resolution(true);
            negated.format(&mut formatter, false);
            black_box(formatter.build())
        })
    });

    group.finish();
}

criterion_group!(benches, bench_construction, bench_negation, bench_rendering);
criterion_main!(benches);
