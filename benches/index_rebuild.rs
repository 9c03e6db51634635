use std::collections::BTreeSet;
use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use session_vault::models::{NewRecord, Source};
use session_vault::{IndexCache, MemoryStore, Vault};

/// Fill an in-memory vault with records spread across a few projects
fn populate(num_records: usize) -> MemoryStore {
    let store = MemoryStore::new();
    let vault = Vault::new(&store);
    for i in 0..num_records {
        let new = NewRecord {
            project_path: format!("/Users/test/project-{}", i % 10),
            summary: format!("Conversation {} about refactoring", i),
            message_count: 12,
            tags: BTreeSet::from([format!("tag-{}", i % 5)]),
            source: Source::Manual,
            ..Default::default()
        };
        if let Err(e) = vault.save("# Session\n", &new) {
            panic!("failed to seed record {}: {}", i, e);
        }
    }
    store
}

fn bench_rebuild(c: &mut Criterion) {
    let mut group = c.benchmark_group("index_rebuild");

    for size in [100, 1_000, 5_000].iter() {
        let store = populate(*size);
        group.throughput(Throughput::Elements(*size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &store, |b, store| {
            b.iter(|| IndexCache::new(black_box(store)).rebuild());
        });
    }

    group.finish();
}

fn bench_load_cached(c: &mut Criterion) {
    let store = populate(1_000);
    let cache = IndexCache::new(&store);
    if let Err(e) = cache.rebuild() {
        panic!("failed to build index: {}", e);
    }

    c.bench_function("index_load_cached_1000", |b| b.iter(|| black_box(&cache).load()));
}

criterion_group!(benches, bench_rebuild, bench_load_cached);
criterion_main!(benches);
