//! Benchmarks for the cache store hot paths.

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use graph_cache_core::{batch, Config, SoaStore, Tier};

fn populated_store(keys: usize) -> SoaStore {
    let mut cfg = Config::default();
    cfg.store.max_keys = keys.next_power_of_two();
    cfg.store.shards = 8;
    let store = SoaStore::new(Arc::new(cfg));
    for i in 0..keys {
        store
            .add_key(format!("node:{i:08}").as_bytes(), Tier::Ram)
            .unwrap();
    }
    store
}

fn bench_find_keys(c: &mut Criterion) {
    let store = populated_store(10_000);
    let queries: Vec<Vec<u8>> = (0..64)
        .map(|i| format!("node:{:08}", i * 100).into_bytes())
        .collect();

    c.bench_function("find_64_keys_in_10k", |b| {
        b.iter(|| {
            let matches = store.find_keys(black_box(&queries));
            black_box(matches);
        })
    });
}

fn bench_hash_keys(c: &mut Criterion) {
    let keys: Vec<Vec<u8>> = (0..1_000)
        .map(|i| format!("node:{i:08}").into_bytes())
        .collect();

    c.bench_function("hash_1k_keys", |b| {
        b.iter(|| {
            let hashes = batch::hash_keys(black_box(&keys), 8);
            black_box(hashes);
        })
    });
}

fn bench_compress_values(c: &mut Criterion) {
    let values: Vec<Vec<u8>> = (0..32).map(|i| vec![i as u8; 4096]).collect();
    let mut out = vec![0u8; values.iter().map(|v| batch::compressed_bound(v.len())).sum()];

    c.bench_function("compress_32x4kb", |b| {
        b.iter(|| {
            let sizes = batch::compress_values(black_box(&values), 3, &mut out).unwrap();
            black_box(sizes);
        })
    });
}

criterion_group!(benches, bench_find_keys, bench_hash_keys, bench_compress_values);
criterion_main!(benches);
