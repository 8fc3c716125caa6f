use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use journal::Record;

fn sample_put() -> Record {
    Record::Put {
        key: b"bench-key".to_vec(),
        value: vec![b'x'; 100],
    }
}

fn encode_benchmark(c: &mut Criterion) {
    c.bench_function("record_encode_put_100b", |b| {
        b.iter_batched(sample_put, |record| journal::encode(&record), BatchSize::SmallInput);
    });
}

fn decode_benchmark(c: &mut Criterion) {
    c.bench_function("record_decode_put_100b", |b| {
        b.iter_batched(
            || journal::encode(&sample_put()),
            |bytes| journal::decode(&mut std::io::Cursor::new(bytes)).unwrap(),
            BatchSize::SmallInput,
        );
    });
}

criterion_group!(benches, encode_benchmark, decode_benchmark);
criterion_main!(benches);
