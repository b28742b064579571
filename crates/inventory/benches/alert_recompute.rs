use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use chrono::Utc;
use stockarium_inventory::{
    InventoryStore, MovementDirection, NewProduct, RecordMovement, recompute_alerts,
};

fn catalogue(size: usize) -> InventoryStore {
    let mut store = InventoryStore::new();
    let now = Utc::now();
    for i in 0..size {
        store
            .add_product(
                NewProduct {
                    name: format!("Product {i}"),
                    sku: format!("SKU-{i:05}"),
                    category: format!("Category {}", i % 7),
                    // Roughly a third of the catalogue sits at or below threshold.
                    stock: (i % 30) as i64,
                    min_stock: 10,
                    price: 9.99,
                    description: String::new(),
                },
                now,
            )
            .unwrap();
    }
    store
}

fn bench_recompute(c: &mut Criterion) {
    let mut group = c.benchmark_group("recompute_alerts");
    for size in [100usize, 1_000, 10_000] {
        let store = catalogue(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &store, |b, store| {
            b.iter(|| {
                black_box(recompute_alerts(
                    black_box(store.products()),
                    black_box(store.alerts()),
                    Utc::now(),
                ))
            })
        });
    }
    group.finish();
}

fn bench_record_movement(c: &mut Criterion) {
    let mut group = c.benchmark_group("record_movement");
    for size in [100usize, 1_000] {
        let store = catalogue(size);
        let target = store.products()[size / 2].id;
        group.bench_with_input(BenchmarkId::from_parameter(size), &store, |b, store| {
            b.iter_batched(
                || store.clone(),
                |mut store| {
                    let cmd = RecordMovement::new(target, 5, MovementDirection::In, "bench", Utc::now());
                    black_box(store.record_movement(cmd).map(|m| m.id))
                },
                criterion::BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

criterion_group!(benches, bench_recompute, bench_record_movement);
criterion_main!(benches);
