//! Hashing and scanning benchmarks.
//!
//! Run with: cargo bench -p mad-engine --bench hasher_bench

use std::io::Cursor;
use std::sync::Arc;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use mad_core::keywords::KeywordSchema;
use mad_engine::hasher::hash_reader;
use mad_engine::scanner::{ScanOptions, Scanner};
use mad_engine::Context;
use mad_storage::SqliteStore;
use tempfile::TempDir;

fn hash_in_memory(c: &mut Criterion) {
    let mut group = c.benchmark_group("hash_reader");
    for size in [4 << 10, 1 << 20, 16 << 20] {
        let data = vec![0x5au8; size];
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &data, |b, data| {
            b.iter(|| hash_reader(Cursor::new(data.as_slice())).unwrap());
        });
    }
    group.finish();
}

fn create_tree(count: usize) -> TempDir {
    let dir = TempDir::new().unwrap();
    for i in 0..count {
        let sub = dir.path().join(format!("d{:03}", i / 100));
        std::fs::create_dir_all(&sub).unwrap();
        std::fs::write(sub.join(format!("f{i:05}.dat")), format!("sample {i}\n")).unwrap();
    }
    dir
}

fn scan_tree(c: &mut Criterion) {
    let mut group = c.benchmark_group("scan");
    group.sample_size(10);

    let dir = create_tree(1000);
    group.bench_function("cold_1000", |b| {
        b.iter(|| {
            let store = SqliteStore::open_in_memory().unwrap();
            let ctx = Context::new(Arc::new(store), "bench", KeywordSchema::default());
            Scanner::new(&ctx, ScanOptions::default()).scan(dir.path()).unwrap()
        });
    });

    let store = SqliteStore::open_in_memory().unwrap();
    let ctx = Context::new(Arc::new(store), "bench", KeywordSchema::default());
    Scanner::new(&ctx, ScanOptions::default()).scan(dir.path()).unwrap();
    group.bench_function("warm_1000", |b| {
        b.iter(|| Scanner::new(&ctx, ScanOptions::default()).scan(dir.path()).unwrap());
    });
    group.finish();
}

criterion_group!(benches, hash_in_memory, scan_tree);
criterion_main!(benches);
