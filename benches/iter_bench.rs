//! Ordered-scan benchmarks: full iteration, value-only iteration and range
//! scans over trees whose nodes span all four flavors.

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};

use ramify::{ArrayKey, RadixMap};

const TREE_SIZES: [u64; 3] = [1 << 12, 1 << 16, 1 << 20];

fn dense_map(size: u64) -> RadixMap<ArrayKey<8>, u64> {
    let mut map = RadixMap::new();
    for i in 0..size {
        map.insert(i, i);
    }
    map
}

pub fn full_scan(c: &mut Criterion) {
    let mut group = c.benchmark_group("full_scan");
    for size in TREE_SIZES {
        group.throughput(Throughput::Elements(size));
        let map = dense_map(size);
        group.bench_with_input(BenchmarkId::new("iter", size), &map, |b, map| {
            b.iter(|| {
                let mut count = 0u64;
                for kv in map.iter() {
                    criterion::black_box(kv);
                    count += 1;
                }
                count
            })
        });
        group.bench_with_input(BenchmarkId::new("values", size), &map, |b, map| {
            b.iter(|| {
                let mut sum = 0u64;
                for v in map.values() {
                    sum = sum.wrapping_add(*v);
                }
                sum
            })
        });
    }
    group.finish();
}

pub fn range_scan(c: &mut Criterion) {
    let mut group = c.benchmark_group("range_scan");
    let map = dense_map(1 << 20);
    for width in [1u64 << 4, 1 << 10, 1 << 16] {
        group.throughput(Throughput::Elements(width));
        group.bench_with_input(BenchmarkId::from_parameter(width), &width, |b, width| {
            let start: ArrayKey<8> = (1u64 << 19).into();
            let end: ArrayKey<8> = ((1u64 << 19) + width).into();
            b.iter(|| {
                let mut count = 0u64;
                for kv in map.range(start..end) {
                    criterion::black_box(kv);
                    count += 1;
                }
                count
            })
        });
    }
    group.finish();
}

criterion_group!(benches, full_scan, range_scan);
criterion_main!(benches);
