//! Query-path benchmarks: membership tests and count-min estimates
//! against a pre-loaded filter, hit and miss traffic separately.

use criterion::{
    black_box, criterion_group, criterion_main, Criterion, Throughput,
};
use globimap::{Coordinate, FilterConfig, Globimap, LayerConfig};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

fn loaded_filter() -> (Globimap, Vec<Coordinate>) {
    let filter = Globimap::new(
        FilterConfig::new(
            4,
            vec![LayerConfig::new(1, 22), LayerConfig::new(8, 18)],
        )
        .unwrap(),
    );
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let inserted: Vec<Coordinate> = (0..100_000)
        .map(|_| {
            Coordinate::new(rng.gen_range(0..1u64 << 24), rng.gen_range(0..1u64 << 24))
        })
        .collect();
    for &p in &inserted {
        filter.put(p).unwrap();
    }
    (filter, inserted)
}

fn bench_get_bool(c: &mut Criterion) {
    let (filter, inserted) = loaded_filter();
    let misses: Vec<Coordinate> = (0..inserted.len() as u64)
        .map(|i| Coordinate::new((1 << 40) + i, i))
        .collect();

    let mut group = c.benchmark_group("query/get_bool");
    group.throughput(Throughput::Elements(inserted.len() as u64));
    group.bench_function("hits", |b| {
        b.iter(|| {
            inserted
                .iter()
                .filter(|&&p| filter.get_bool(black_box(p)))
                .count()
        });
    });
    group.bench_function("misses", |b| {
        b.iter(|| {
            misses
                .iter()
                .filter(|&&p| filter.get_bool(black_box(p)))
                .count()
        });
    });
    group.finish();
}

fn bench_get_min(c: &mut Criterion) {
    let (filter, inserted) = loaded_filter();

    let mut group = c.benchmark_group("query/get_min");
    group.throughput(Throughput::Elements(inserted.len() as u64));
    group.bench_function("hits", |b| {
        b.iter(|| {
            inserted
                .iter()
                .map(|&p| filter.get_min(black_box(p)))
                .sum::<u64>()
        });
    });
    group.finish();
}

fn bench_estimate_region(c: &mut Criterion) {
    let (filter, _) = loaded_filter();

    let mut group = c.benchmark_group("query/estimate_region");
    group.throughput(Throughput::Elements(256 * 256));
    group.bench_function("256x256", |b| {
        b.iter(|| filter.estimate_region(black_box(0), 0, 256, 256));
    });
    group.finish();
}

criterion_group!(benches, bench_get_bool, bench_get_min, bench_estimate_region);
criterion_main!(benches);
