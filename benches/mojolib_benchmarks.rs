// Copyright (c) 2025 MojoLib Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! Criterion benchmarks for the containers and the expression algebra.

use criterion::{
    black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput,
};

use mojolib::{
    AbstractSet, Intersection, InverseClosedDeep, KeySet, Relation, SetCollector,
};

fn filled_set(name: &str, count: u32) -> KeySet<u32> {
    let mut set = KeySet::new();
    set.create(name, None).expect("create");
    for key in 1..=count {
        set.insert(&key).expect("insert");
    }
    set
}

fn bench_key_set(c: &mut Criterion) {
    let mut group = c.benchmark_group("key_set");

    for size in [100u32, 1_000, 10_000] {
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("insert", size), &size, |b, &size| {
            b.iter(|| {
                let mut set = KeySet::<u32>::new();
                set.create("bench", None).expect("create");
                for key in 1..=size {
                    set.insert(black_box(&key)).expect("insert");
                }
            });
        });

        let set = filled_set("bench", size);
        group.bench_with_input(BenchmarkId::new("contains", size), &size, |b, &size| {
            b.iter(|| {
                for key in 1..=size {
                    black_box(set.contains(black_box(&key)));
                }
            });
        });

        group.bench_with_input(
            BenchmarkId::new("insert_remove_churn", size),
            &size,
            |b, &size| {
                b.iter(|| {
                    let mut set = KeySet::<u32>::new();
                    set.create("bench", None).expect("create");
                    for key in 1..=size {
                        set.insert(&key).expect("insert");
                    }
                    for key in 1..=size {
                        set.remove(&key).expect("remove");
                    }
                });
            },
        );
    }

    group.finish();
}

fn bench_expressions(c: &mut Criterion) {
    let mut group = c.benchmark_group("expressions");

    let big = filled_set("big", 10_000);
    let small = filled_set("small", 100);
    let operands: [&dyn AbstractSet<u32>; 2] = [&big, &small];

    // The planner drives from the small side, so cost tracks the small
    // operand, not the big one.
    group.bench_function("intersection_small_driver", |b| {
        b.iter(|| {
            let node = Intersection::new(&operands);
            let mut sink = KeySet::new();
            sink.create("sink", None).expect("create");
            node.enumerate(&mut SetCollector::new(&mut sink), None);
            black_box(sink.len());
        });
    });

    let mut relation = Relation::<u32>::new();
    relation.create("tree", None).expect("create");
    // A shallow forest: 100 roots, 10 children each.
    for root in 1..=100u32 {
        for child in 0..10u32 {
            let child_key = 1_000 + root * 10 + child;
            relation.insert(&child_key, &root).expect("edge");
        }
    }
    let roots = filled_set("roots", 100);

    group.bench_function("inverse_closed_deep_forest", |b| {
        b.iter(|| {
            let node = InverseClosedDeep::new(&relation, &roots);
            let mut sink = KeySet::new();
            sink.create("sink", None).expect("create");
            node.enumerate(&mut SetCollector::new(&mut sink), None);
            black_box(sink.len());
        });
    });

    group.finish();
}

criterion_group!(benches, bench_key_set, bench_expressions);
criterion_main!(benches);
