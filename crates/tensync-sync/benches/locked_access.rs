//! Benchmarks for locked cell access.
//!
//! Compares the locking policies for single-threaded point access, contended
//! multi-threaded writes and bulk snapshots.
//!
//! Run with:
//! ```bash
//! cargo bench --bench locked_access
//! ```

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::hint::black_box;
use std::sync::Arc;
use std::thread;
use tensync_core::{Abacus, IndexEnumerator};
use tensync_sync::{
    DimensionLockPolicy, GlobalLockPolicy, LockPolicy, LockedTensor, PerCellLockPolicy,
    StripedLockPolicy,
};

const SHAPE: [usize; 3] = [16, 16, 16];

fn shared<P: LockPolicy + 'static>(policy: P) -> Arc<dyn LockPolicy> {
    Arc::new(policy)
}

fn policies() -> Vec<(&'static str, Arc<dyn LockPolicy>)> {
    vec![
        ("global", shared(GlobalLockPolicy::new())),
        ("striped_64", shared(StripedLockPolicy::default())),
        ("per_cell", shared(PerCellLockPolicy::new())),
        ("dimension_0", shared(DimensionLockPolicy::new(&SHAPE, 0).unwrap())),
    ]
}

/// Sequential get + set over every cell from one thread
fn bench_point_access(c: &mut Criterion) {
    let mut group = c.benchmark_group("point_access");
    let points: Vec<Vec<usize>> = Abacus::new(&SHAPE).unwrap().map(|p| p.to_vec()).collect();
    group.throughput(Throughput::Elements(points.len() as u64));

    for (name, policy) in policies() {
        let tensor = LockedTensor::<f64, dyn LockPolicy>::zeros(&SHAPE, policy).unwrap();
        group.bench_function(BenchmarkId::from_parameter(name), |b| {
            b.iter(|| {
                for point in &points {
                    let value = tensor.get(point).unwrap();
                    tensor.set(point, black_box(value + 1.0)).unwrap();
                }
            });
        });
    }

    group.finish();
}

/// Four threads updating disjoint slices along axis 0
fn bench_parallel_updates(c: &mut Criterion) {
    let mut group = c.benchmark_group("parallel_updates");
    let total = Abacus::new(&SHAPE).unwrap().state_count();
    group.throughput(Throughput::Elements(total));

    for (name, policy) in policies() {
        let tensor =
            Arc::new(LockedTensor::<i64, dyn LockPolicy>::zeros(&SHAPE, policy).unwrap());
        group.bench_function(BenchmarkId::from_parameter(name), |b| {
            b.iter(|| {
                let handles: Vec<_> = (0..4)
                    .map(|worker| {
                        let tensor = Arc::clone(&tensor);
                        thread::spawn(move || {
                            for i in (worker * 4)..(worker * 4 + 4) {
                                for j in 0..SHAPE[1] {
                                    for k in 0..SHAPE[2] {
                                        tensor.update(&[i, j, k], |v| v + 1).unwrap();
                                    }
                                }
                            }
                        })
                    })
                    .collect();
                for handle in handles {
                    handle.join().unwrap();
                }
            });
        });
    }

    group.finish();
}

/// Whole-tensor snapshot
fn bench_bulk_get(c: &mut Criterion) {
    let mut group = c.benchmark_group("bulk_get");

    for size in [8usize, 32, 64] {
        let shape = [size, size, 4];
        let tensor =
            LockedTensor::<f32, _>::zeros(&shape, Arc::new(StripedLockPolicy::default())).unwrap();
        group.throughput(Throughput::Elements(tensor.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &tensor, |b, tensor| {
            b.iter(|| black_box(tensor.bulk_get().unwrap()));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_point_access,
    bench_parallel_updates,
    bench_bulk_get
);
criterion_main!(benches);
