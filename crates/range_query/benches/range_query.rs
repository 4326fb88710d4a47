use bench::apply_runtime_config_for_size;
use bench::default_rng;
use bench::random_ranges;
use bench::random_values;
use criterion::BenchmarkId;
use criterion::Criterion;
use criterion::criterion_group;
use criterion::criterion_main;
use range_query::{LazySegmentTree, RangeAddSum, SegmentTree, SplaySequence, Sum};
use std::hint::black_box;

const SIZES: [usize; 4] = [1_024, 4_096, 16_384, 65_536];
const VALUE_RANGE: std::ops::RangeInclusive<i64> = -1_000_000..=1_000_000;

fn bench_prod(c: &mut Criterion) {
    let mut rng = default_rng();
    let mut group = c.benchmark_group("range_query/prod");

    for &size in &SIZES {
        apply_runtime_config_for_size(&mut group, size);
        let values = random_values(&mut rng, size, VALUE_RANGE);
        let queries = random_ranges(&mut rng, size, size);

        let seg = SegmentTree::<Sum>::from(values.clone());
        group.bench_function(BenchmarkId::new("segtree", size), |bencher| {
            bencher.iter(|| {
                let mut acc = 0_i64;
                for &(l, r) in &queries {
                    acc = acc.wrapping_add(seg.prod(black_box(l)..black_box(r)).unwrap());
                }
                black_box(acc);
            })
        });

        let mut lazy = LazySegmentTree::<RangeAddSum>::from(values.clone());
        group.bench_function(BenchmarkId::new("lazy_segtree", size), |bencher| {
            bencher.iter(|| {
                let mut acc = 0_i64;
                for &(l, r) in &queries {
                    acc = acc.wrapping_add(lazy.prod(black_box(l)..black_box(r)).unwrap());
                }
                black_box(acc);
            })
        });

        let mut seq: SplaySequence<Sum> = values.iter().copied().collect();
        group.bench_function(BenchmarkId::new("splay", size), |bencher| {
            bencher.iter(|| {
                let mut acc = 0_i64;
                for &(l, r) in &queries {
                    acc = acc.wrapping_add(seq.prod(black_box(l)..black_box(r)).unwrap());
                }
                black_box(acc);
            })
        });
    }

    group.finish();
}

fn bench_updates(c: &mut Criterion) {
    let mut rng = default_rng();
    let mut group = c.benchmark_group("range_query/update");

    for &size in &SIZES {
        apply_runtime_config_for_size(&mut group, size);
        let values = random_values(&mut rng, size, VALUE_RANGE);
        let ranges = random_ranges(&mut rng, size, size);

        group.bench_function(BenchmarkId::new("lazy_apply_range", size), |bencher| {
            bencher.iter(|| {
                let mut lazy = LazySegmentTree::<RangeAddSum>::from(values.clone());
                for &(l, r) in &ranges {
                    lazy.apply_range(black_box(l)..black_box(r), &1).unwrap();
                }
                black_box(lazy.all_prod());
            })
        });

        group.bench_function(BenchmarkId::new("splay_shift_by", size), |bencher| {
            bencher.iter(|| {
                let mut seq: SplaySequence<Sum> = values.iter().copied().collect();
                for &(l, r) in &ranges {
                    seq.shift_by(black_box(l)..black_box(r), 1).unwrap();
                }
                black_box(seq.all_prod());
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_prod, bench_updates);
criterion_main!(benches);
