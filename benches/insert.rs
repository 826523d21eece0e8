//! Insert-path benchmarks: cascade cost by layer stack shape and hash
//! count, and sustained bulk-ingest throughput.

use criterion::{
    black_box, criterion_group, criterion_main, BenchmarkId, Criterion,
    Throughput,
};
use globimap::{Coordinate, FilterConfig, Globimap, LayerConfig};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

fn points(n: usize) -> Vec<Coordinate> {
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    (0..n)
        .map(|_| {
            Coordinate::new(rng.gen_range(0..1u64 << 32), rng.gen_range(0..1u64 << 32))
        })
        .collect()
}

fn bench_insert_by_hash_count(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert/hash_count");
    let input = points(10_000);
    for k in [1u64, 2, 4, 8] {
        group.throughput(Throughput::Elements(input.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(k), &k, |b, &k| {
            let filter = Globimap::new(
                FilterConfig::new(k, vec![LayerConfig::new(8, 22)]).unwrap(),
            );
            b.iter(|| {
                for &p in &input {
                    filter.put(black_box(p)).unwrap();
                }
            });
        });
    }
    group.finish();
}

fn bench_insert_by_stack_depth(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert/stack_depth");
    let input = points(10_000);
    let stacks: &[(&str, Vec<LayerConfig>)] = &[
        ("single_1bit", vec![LayerConfig::new(1, 22)]),
        (
            "bit_plus_byte",
            vec![LayerConfig::new(1, 22), LayerConfig::new(8, 18)],
        ),
        (
            "three_tier",
            vec![
                LayerConfig::new(1, 22),
                LayerConfig::new(8, 18),
                LayerConfig::new(32, 14),
            ],
        ),
    ];
    for (name, layers) in stacks {
        group.throughput(Throughput::Elements(input.len() as u64));
        group.bench_function(*name, |b| {
            let filter =
                Globimap::new(FilterConfig::new(4, layers.clone()).unwrap());
            b.iter(|| {
                for &p in &input {
                    filter.put(black_box(p)).unwrap();
                }
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_insert_by_hash_count, bench_insert_by_stack_depth);
criterion_main!(benches);
