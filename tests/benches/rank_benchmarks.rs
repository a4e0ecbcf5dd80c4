//! # Position Ordering Benchmarks
//!
//! | Area | Operation | Expectation |
//! |------|-----------|-------------|
//! | Allocator | `between` on short ranks | sub-microsecond |
//! | Allocator | `between` on deep ranks | linear in rank length |
//! | Allocator | `spread` | linear in sibling count |
//! | Manager | insert into a random gap | one read-compute-write cycle |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use position_ordering::{
    InMemoryPositionStore, ItemId, ParentId, Placement, PositionApi, PositionManager,
    RankAllocator, RankValue,
};
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;

// ============================================================================
// Allocator
// ============================================================================

fn bench_between(c: &mut Criterion) {
    let mut group = c.benchmark_group("allocator-between");
    let allocator = RankAllocator::default();

    let (lower, upper) = match (RankValue::parse("m"), RankValue::parse("n")) {
        (Ok(lower), Ok(upper)) => (lower, upper),
        _ => return,
    };
    group.bench_function("short_gap", |b| {
        b.iter(|| black_box(allocator.between(&lower, &upper).is_ok()))
    });

    // Gaps after repeated nesting, where ranks grow long.
    for depth in [100usize, 1_000, 10_000] {
        let mut deep_upper = upper.clone();
        for _ in 0..depth {
            match allocator.between(&lower, &deep_upper) {
                Ok(mid) => deep_upper = mid,
                Err(_) => break,
            }
        }

        group.throughput(Throughput::Bytes(deep_upper.len() as u64));
        group.bench_with_input(
            BenchmarkId::new("nested_gap", depth),
            &deep_upper,
            |b, deep_upper| b.iter(|| black_box(allocator.between(&lower, deep_upper).is_ok())),
        );
    }

    group.finish();
}

fn bench_spread(c: &mut Criterion) {
    let mut group = c.benchmark_group("allocator-spread");
    let allocator = RankAllocator::default();

    for count in [10usize, 100, 1_000, 10_000] {
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::new("spread", count), &count, |b, &count| {
            b.iter(|| black_box(allocator.spread(count).map(|ranks| ranks.len())))
        });
    }

    group.finish();
}

// ============================================================================
// Position Manager
// ============================================================================

fn bench_manager_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("manager-insert");
    group.measurement_time(Duration::from_secs(10));

    let runtime = match tokio::runtime::Builder::new_current_thread().build() {
        Ok(runtime) => runtime,
        Err(_) => return,
    };

    for size in [10usize, 100, 1_000] {
        let store = Arc::new(InMemoryPositionStore::new());
        let manager = PositionManager::new(store);
        let list = ParentId::from("bench-list");

        let ids: Vec<ItemId> = runtime.block_on(async {
            let mut ids = Vec::with_capacity(size);
            for _ in 0..size {
                if let Ok(item) = manager.insert_at_end(&list).await {
                    ids.push(item.id);
                }
            }
            ids
        });

        group.throughput(Throughput::Elements(1));
        group.bench_with_input(BenchmarkId::new("random_gap", size), &ids, |b, ids| {
            let mut rng = rand::thread_rng();
            b.iter(|| {
                let prev = ids[rng.gen_range(0..ids.len())].clone();
                let placed = runtime.block_on(manager.insert_between(&list, Placement::after(prev)));
                black_box(placed.is_ok())
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_between, bench_spread, bench_manager_insert);

criterion_main!(benches);
