//! Performance benchmarks for the RGA CRDT implementation.
//!
//! This module benchmarks various aspects of the RGA including:
//! - Sequential typing and deletion
//! - Replicating operations between replicas, in order and reversed
//! - Concurrent insertions at the same position
//! - Snapshot loading and materialization
//!
//! Run with: cargo bench

use collab_rga::edit::apply_text;
use collab_rga::{Operation, RGA};
use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

fn typed(size: usize) -> (RGA, Vec<Operation>) {
    let mut rga = RGA::new(1);
    let mut ops = Vec::with_capacity(size);
    for i in 0..size {
        let ch = (b'A' + (i % 26) as u8) as char;
        ops.push(Operation::Insert(rga.insert_local(i, ch)));
    }
    (rga, ops)
}

/// Benchmark typing at the end of the document
fn bench_sequential_insertions(c: &mut Criterion) {
    let mut group = c.benchmark_group("sequential_insertions");

    for size in [100, 500, 1000].iter() {
        group.throughput(Throughput::Elements(*size as u64));
        group.bench_with_input(BenchmarkId::new("insert_chars", size), size, |b, &size| {
            b.iter(|| {
                let (rga, _) = typed(size);
                black_box(rga.materialize())
            });
        });
    }
    group.finish();
}

/// Benchmark deleting every character after typing them
fn bench_sequential_deletions(c: &mut Criterion) {
    let mut group = c.benchmark_group("sequential_deletions");

    for size in [100, 500, 1000].iter() {
        group.throughput(Throughput::Elements(*size as u64));
        group.bench_with_input(BenchmarkId::new("delete_chars", size), size, |b, &size| {
            b.iter_batched(
                || typed(size).0,
                |mut rga| {
                    while rga.delete_local(0).is_some() {}
                    black_box(rga.total_len())
                },
                criterion::BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

/// Benchmark applying a replica's operation log on another replica
fn bench_replication(c: &mut Criterion) {
    let mut group = c.benchmark_group("replication");

    for size in [100, 500, 1000].iter() {
        let (_, ops) = typed(*size);
        group.throughput(Throughput::Elements(*size as u64));

        group.bench_with_input(BenchmarkId::new("in_order", size), &ops, |b, ops| {
            b.iter(|| {
                let mut target = RGA::new(2);
                for op in ops {
                    target.apply(op.clone());
                }
                black_box(target.len())
            });
        });

        // Every insert arrives before its origin and waits in the buffer
        group.bench_with_input(BenchmarkId::new("reversed", size), &ops, |b, ops| {
            b.iter(|| {
                let mut target = RGA::new(2);
                for op in ops.iter().rev() {
                    target.apply(op.clone());
                }
                black_box(target.len())
            });
        });
    }
    group.finish();
}

/// Benchmark conflict resolution under extreme conditions
fn bench_conflict_resolution(c: &mut Criterion) {
    let mut group = c.benchmark_group("conflict_resolution");

    group.bench_function("simultaneous_insertions_same_position", |b| {
        b.iter(|| {
            let num_replicas = 10u64;
            let mut rgas: Vec<RGA> = (1..=num_replicas).map(RGA::new).collect();
            let mut ops = Vec::new();

            // Every replica types 10 characters at the start of an empty document
            for (replica, rga) in rgas.iter_mut().enumerate() {
                for _ in 0..10 {
                    let ch = (b'A' + replica as u8) as char;
                    ops.push(Operation::Insert(rga.insert_local(0, ch)));
                }
            }

            for rga in rgas.iter_mut() {
                for op in &ops {
                    rga.apply(op.clone());
                }
            }

            // Verify all replicas converged to the same deterministic order
            let first_content = rgas[0].materialize();
            for rga in &rgas[1..] {
                assert_eq!(first_content, rga.materialize(), "Conflict resolution failed");
            }

            black_box(first_content.len())
        });
    });

    group.finish();
}

/// Benchmark diffing and applying a whole-text edit
fn bench_text_edits(c: &mut Criterion) {
    let mut group = c.benchmark_group("text_edits");
    let text = "The quick brown fox jumps over the lazy dog. ".repeat(20);
    let edited = text.replacen("lazy", "sleepy", 3);

    group.bench_function("apply_text", |b| {
        b.iter_batched(
            || {
                let mut rga = RGA::new(1);
                apply_text(&mut rga, &text);
                rga
            },
            |mut rga| black_box(apply_text(&mut rga, &edited).len()),
            criterion::BatchSize::SmallInput,
        );
    });

    group.finish();
}

/// Benchmark materialization and snapshot loading
fn bench_snapshots(c: &mut Criterion) {
    let mut group = c.benchmark_group("snapshots");

    for size in [100, 1000, 5000].iter() {
        let (mut rga, _) = typed(*size);
        // Delete every 3rd character to create tombstones
        for i in (0..*size / 3).rev() {
            rga.delete_local(i * 2);
        }
        let snapshot = rga.snapshot();

        group.throughput(Throughput::Elements(*size as u64));
        group.bench_with_input(BenchmarkId::new("materialize", size), &rga, |b, rga| {
            b.iter(|| black_box(rga.materialize()));
        });
        group.bench_with_input(BenchmarkId::new("load_snapshot", size), &snapshot, |b, snapshot| {
            b.iter(|| black_box(RGA::from_snapshot(9, snapshot.clone()).len()));
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_sequential_insertions,
    bench_sequential_deletions,
    bench_replication,
    bench_conflict_resolution,
    bench_text_edits,
    bench_snapshots
);

criterion_main!(benches);
