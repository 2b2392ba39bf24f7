//! Benchmarks for device integration.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use memristive_devices::{DeviceId, Memristor, ModelConfig, Polarity, StepBudget, Waveform};

fn bench_vteam_simulate(c: &mut Criterion) {
    c.bench_function("vteam_simulate_1000_steps", |b| {
        let device = Memristor::instantiate(
            DeviceId::new(0, 0, 0, Polarity::Positive),
            &ModelConfig::default(),
            0,
        )
        .unwrap();
        let signal = Waveform::sin(1.0, 1e7);

        b.iter(|| {
            let mut d = device.clone();
            d.simulate(black_box(&signal), 1e-7, StepBudget::default())
                .unwrap()
        });
    });
}

fn bench_instantiate_population(c: &mut Criterion) {
    c.bench_function("instantiate_1024_devices", |b| {
        let config = ModelConfig::default();
        b.iter(|| {
            (0..1024u32)
                .map(|i| {
                    Memristor::instantiate(
                        DeviceId::new(0, i / 32, i % 32, Polarity::Positive),
                        black_box(&config),
                        7,
                    )
                    .unwrap()
                })
                .count()
        });
    });
}

criterion_group!(benches, bench_vteam_simulate, bench_instantiate_population);
criterion_main!(benches);
