//! Benchmarks for mapping and reading a crossbar.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use memristive_crossbar::{map, CrossbarConfig, QuantMethod, WeightTensor};
use nalgebra::DMatrix;

fn layer(out: usize, fan_in: usize) -> WeightTensor {
    let data = (0..out * fan_in)
        .map(|i| ((i * 31 % 97) as f64 / 48.5) - 1.0)
        .collect();
    WeightTensor::linear(out, fan_in, data).unwrap()
}

fn bench_map(c: &mut Criterion) {
    let weights = layer(256, 256);
    let config = CrossbarConfig::default();
    c.bench_function("map_256x256_direct", |b| {
        b.iter(|| map(black_box(&weights), &config, 0).unwrap())
    });
}

fn bench_read(c: &mut Criterion) {
    let mut group = c.benchmark_group("read");
    for size in [128usize, 256, 512] {
        let weights = layer(size, size);
        let config = CrossbarConfig::default().with_adc(Some(8), 0.1, QuantMethod::Linear);
        let mut mapping = map(&weights, &config, 0).unwrap();
        let inputs = DMatrix::from_fn(32, size, |b, r| ((b + r) % 7) as f64 - 3.0);

        group.bench_with_input(BenchmarkId::from_parameter(size), &inputs, |b, inputs| {
            b.iter(|| mapping.read(black_box(inputs)).unwrap())
        });
    }
    group.finish();
}

criterion_group!(benches, bench_map, bench_read);
criterion_main!(benches);
