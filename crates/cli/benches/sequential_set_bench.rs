use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use engine::Database;
use tempfile::tempdir;

const N_KEYS: usize = 1_000;

fn sequential_set_benchmark(c: &mut Criterion) {
    c.bench_function("sequential_set_1k_no_sync", |b| {
        b.iter_batched(
            || {
                let dir = tempdir().unwrap();
                let db: Database<String> = Database::open(dir.path().join("bench.daybreak")).unwrap();
                (dir, db)
            },
            |(_dir, db)| {
                for i in 0..N_KEYS {
                    db.set(&format!("key{i}"), format!("v{i}")).unwrap();
                }
            },
            BatchSize::SmallInput,
        );
    });
}

fn sequential_set_sync_benchmark(c: &mut Criterion) {
    c.bench_function("sequential_set_sync_1k", |b| {
        b.iter_batched(
            || {
                let dir = tempdir().unwrap();
                let db: Database<String> = Database::open(dir.path().join("bench.daybreak")).unwrap();
                (dir, db)
            },
            |(_dir, db)| {
                for i in 0..N_KEYS {
                    db.set_sync(&format!("key{i}"), format!("v{i}")).unwrap();
                }
            },
            BatchSize::SmallInput,
        );
    });
}

criterion_group!(benches, sequential_set_benchmark, sequential_set_sync_benchmark);
criterion_main!(benches);
