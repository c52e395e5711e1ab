//! Failure accumulation benchmarks
//!
//! Measures entity validation through adapters, combinators and the recursive
//! adapter.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use validated_core::{
    member, member_validator, EntityValidator, InvalidEntry, Validated, ValidationBuilder,
};

struct Line {
    sku: String,
    quantity: u32,
}

struct Order {
    reference: String,
    lines: Vec<Line>,
}

struct Category {
    name: String,
    children: Vec<Category>,
}

fn order(lines: usize, valid: bool) -> Order {
    let quantity = if valid { 1 } else { 0 };
    Order {
        reference: "ORD-1".into(),
        lines: (0..lines)
            .map(|i| Line {
                sku: format!("SKU-{i}"),
                quantity,
            })
            .collect(),
    }
}

fn tree(depth: usize, fan_out: usize) -> Category {
    let children = if depth == 0 {
        Vec::new()
    } else {
        (0..fan_out).map(|_| tree(depth - 1, fan_out)).collect()
    };
    Category {
        name: String::new(),
        children,
    }
}

fn bench_and_then_chain(c: &mut Criterion) {
    let failure = |i: usize| {
        Validated::<u32>::invalid_entry(InvalidEntry::new(
            format!("failure {i}"),
            "value",
            "value",
            "Value",
        ))
    };

    c.bench_function("accumulate_100_failures", |b| {
        b.iter(|| {
            (0..100).fold(Validated::valid(0u32), |acc, i| {
                acc.accumulate(black_box(failure(i)))
            })
        })
    });
}

fn bench_each_entity(c: &mut Criterion) {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap_or_else(|err| panic!("runtime: {err}"));

    let line = ValidationBuilder::<Line>::new()
        .for_member(
            member!(Line, sku),
            member_validator(|s: &String| !s.is_empty(), "sku", "SKU", "{DisplayName} is required"),
        )
        .for_member(
            member!(Line, quantity),
            member_validator(|q: &u32| *q > 0, "quantity", "Quantity", "{DisplayName} must be positive"),
        )
        .build()
        .unwrap_or_else(|err| panic!("line validator: {err}"));
    let validator = ValidationBuilder::<Order>::new()
        .for_member(
            member!(Order, reference),
            member_validator(|r: &String| !r.is_empty(), "reference", "Reference", "required"),
        )
        .for_each_entity(member!(Order, lines, slice), line)
        .build()
        .unwrap_or_else(|err| panic!("order validator: {err}"));

    let mut group = c.benchmark_group("for_each_entity");
    for size in [10, 100, 1000] {
        for valid in [true, false] {
            let order = order(size, valid);
            let label = if valid { "valid" } else { "invalid" };
            group.bench_with_input(BenchmarkId::new(label, size), &order, |b, order| {
                b.iter(|| runtime.block_on(validator.check(black_box(order))).is_valid())
            });
        }
    }
    group.finish();
}

fn bench_recursive(c: &mut Criterion) {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap_or_else(|err| panic!("runtime: {err}"));

    let validator = ValidationBuilder::<Category>::new()
        .for_member(
            member!(Category, name),
            member_validator(|n: &String| !n.is_empty(), "name", "Name", "required"),
        )
        .for_recursive_collection(member!(Category, children, slice))
        .build()
        .unwrap_or_else(|err| panic!("category validator: {err}"));

    let mut group = c.benchmark_group("recursive_collection");
    for depth in [2, 4, 6] {
        let root = tree(depth, 3);
        group.bench_with_input(BenchmarkId::from_parameter(depth), &root, |b, root| {
            b.iter(|| runtime.block_on(validator.check(black_box(root))).failures().len())
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_and_then_chain,
    bench_each_entity,
    bench_recursive,
);
criterion_main!(benches);
