use criterion::{black_box, BatchSize, BenchmarkId, Criterion};
use criterion::{criterion_group, criterion_main};
use tempfile::tempdir;

use listings::{NewListing, RecordStore, SortDir, SortKey, SortSpec, StoreConfig};

fn seeded_store(records: usize) -> (tempfile::TempDir, RecordStore) {
    let dir = tempdir().expect("tempdir");
    let store = RecordStore::open(StoreConfig::in_dir(dir.path()));
    store.register("alice").expect("register");
    let lines: Vec<String> = (1..=records)
        .map(|id| {
            format!(
                "{id}|alice|item {id}|description {id}|{}|cat{}|01-01-2020-10:00AM",
                (id * 7919) % 1000,
                id % 8
            )
        })
        .collect();
    store.compact_rewrite(&lines).expect("seed");
    (dir, store)
}

fn bench_create(c: &mut Criterion) {
    let mut group = c.benchmark_group("create");
    for &records in &[100_usize, 1_000] {
        group.bench_with_input(BenchmarkId::from_parameter(records), &records, |b, &records| {
            b.iter_batched(
                || seeded_store(records),
                |(_dir, store)| {
                    store
                        .create(NewListing {
                            owner: "alice".to_string(),
                            title: "fresh".to_string(),
                            description: "new item".to_string(),
                            price: 10,
                            category: "cat0".to_string(),
                        })
                        .expect("create");
                },
                BatchSize::LargeInput,
            );
        });
    }
    group.finish();
}

fn bench_category(c: &mut Criterion) {
    let mut group = c.benchmark_group("by_category_sorted");
    for &records in &[100_usize, 1_000] {
        let (_dir, store) = seeded_store(records);
        let sort = Some(SortSpec::new(SortKey::Price, SortDir::Asc));
        group.bench_with_input(BenchmarkId::from_parameter(records), &records, |b, _| {
            b.iter(|| {
                let found = store
                    .by_category(black_box("alice"), black_box("cat3"), sort)
                    .expect("query");
                black_box(found);
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_create, bench_category);
criterion_main!(benches);
