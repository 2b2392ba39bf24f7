//! Integration tests for mapping, programming and reading crossbars.

use memristive_crossbar::{
    map, CrossbarConfig, Error, NaiveProgramming, ParallelConfig, ProgrammingRoutine,
    QuantMethod, Scheme, WeightTensor,
};
use memristive_devices::{ModelConfig, Polarity, StochasticParameter, VteamConfig};
use nalgebra::DMatrix;

fn ramp_weights(out: usize, fan_in: usize) -> WeightTensor {
    let n = out * fan_in;
    let data = (0..n).map(|i| 2.0 * i as f64 / (n - 1) as f64 - 1.0).collect();
    WeightTensor::linear(out, fan_in, data).unwrap()
}

#[test]
fn test_300_outputs_use_three_tile_columns() {
    let weights = ramp_weights(300, 16);
    let config = CrossbarConfig::default().with_tile_shape(Some((128, 128)));
    let mapping = map(&weights, &config, 0).unwrap();

    let grid = mapping.grid();
    assert_eq!(grid.logical_shape(), (16, 300));
    assert_eq!(grid.grid_shape(), (1, 3));
    let widths: Vec<usize> = mapping.tiles().iter().map(|t| t.active_shape().1).collect();
    assert_eq!(widths, vec![128, 128, 44]);
    assert!(mapping.tiles().iter().all(|t| t.shape() == (128, 128)));
}

#[test]
fn test_conv_weights_flatten_onto_rows() {
    let data = (0..4 * 2 * 3 * 3).map(|i| (i % 5) as f64 - 2.0).collect();
    let weights = WeightTensor::new(vec![4, 2, 3, 3], data).unwrap();
    let config = CrossbarConfig::default().with_tile_shape(Some((8, 8)));
    let mut mapping = map(&weights, &config, 1).unwrap();
    assert_eq!(mapping.grid().logical_shape(), (18, 4));
    assert_eq!(mapping.grid().grid_shape(), (3, 1));

    let inputs = DMatrix::from_fn(2, 18, |b, r| (r as f64 - b as f64) / 9.0);
    let out = mapping.read(&inputs).unwrap();
    let ideal = weights.ideal_forward(&inputs).unwrap();
    for (a, b) in out.outputs.iter().zip(ideal.iter()) {
        assert!((a - b).abs() < 1e-9, "{} vs {}", a, b);
    }
}

#[test]
fn test_eight_bit_adc_levels() {
    let weights = ramp_weights(64, 32);
    let config = CrossbarConfig::default().with_adc(Some(8), 0.0, QuantMethod::Linear);
    let mut mapping = map(&weights, &config, 0).unwrap();
    let inputs = DMatrix::from_fn(64, 32, |b, r| ((b * 13 + r * 7) % 17) as f64 - 8.0);

    let out = mapping.read(&inputs).unwrap();
    let mut levels: Vec<f64> = out.currents.iter().copied().collect();
    levels.sort_by(|a, b| a.total_cmp(b));
    levels.dedup();
    assert!(levels.len() <= 256, "{} distinct currents", levels.len());

    // With no overflow headroom the full scale is exactly the observed span
    let range = out.adc_range.unwrap();
    let (lo, hi) = (levels[0], levels[levels.len() - 1]);
    assert!((range.low - lo).abs() <= 1e-12 * lo.abs());
    assert!((range.high - hi).abs() <= 1e-12 * hi.abs());
}

#[test]
fn test_adc_quantization_error_shrinks_with_bits() {
    let weights = ramp_weights(16, 16);
    let inputs = DMatrix::from_fn(8, 16, |b, r| ((b + 2 * r) % 5) as f64 - 2.0);
    let ideal = weights.ideal_forward(&inputs).unwrap();

    let error = |bits: u32| {
        let config = CrossbarConfig::default().with_adc(Some(bits), 0.0, QuantMethod::Linear);
        let mut mapping = map(&weights, &config, 0).unwrap();
        let out = mapping.read(&inputs).unwrap();
        (&out.outputs - &ideal).norm()
    };
    assert!(error(10) < error(3));
}

#[test]
fn test_1r_requires_programming() {
    let weights = ramp_weights(4, 4);
    let config = CrossbarConfig::default().with_transistor(false);
    assert!(matches!(map(&weights, &config, 0), Err(Error::Configuration(_))));
}

#[test]
fn test_1r_programming_runs_with_half_select() {
    let weights = ramp_weights(3, 3);
    let routine = ProgrammingRoutine::Naive(NaiveProgramming::default().with_max_pulses(20));
    let config = CrossbarConfig::default()
        .with_transistor(false)
        .with_programming(Some(routine));
    let mapping = map(&weights, &config, 0).unwrap();
    let report = mapping.programming_report();
    assert_eq!(report.devices, 18);
    assert_eq!(report.converged + report.warnings.len(), 18);
    for warning in &report.warnings {
        assert!(warning.achieved.is_finite());
    }
}

#[test]
fn test_programmed_stochastic_population_converges() {
    let model = ModelConfig::Vteam(VteamConfig {
        r_off: StochasticParameter::normal_clipped(1000.0, 20.0, Some(900.0), None),
        ..VteamConfig::default()
    });
    let config = CrossbarConfig::default()
        .with_model(model)
        .with_programming(Some(ProgrammingRoutine::default()))
        .with_tile_shape(Some((2, 2)));
    let weights = WeightTensor::linear(2, 2, vec![0.5, -0.5, 0.0, 1.0]).unwrap();
    let mapping = map(&weights, &config, 11).unwrap();

    let report = mapping.programming_report();
    assert_eq!(report.devices, 8);
    for warning in &report.warnings {
        assert!(warning.relative_error() < 0.5, "{:?}", warning);
    }
}

#[test]
fn test_mapping_is_reproducible_and_parallel_invariant() {
    let model = ModelConfig::Vteam(VteamConfig {
        r_on: StochasticParameter::normal(50.0, 2.0),
        r_off: StochasticParameter::normal(1000.0, 40.0),
        ..VteamConfig::default()
    });
    let weights = ramp_weights(40, 40);
    let config = CrossbarConfig::default()
        .with_model(model)
        .with_tile_shape(Some((16, 16)));

    let parallel = map(&weights, &config, 5).unwrap();
    let sequential = map(
        &weights,
        &config.clone().with_parallel(ParallelConfig::sequential()),
        5,
    )
    .unwrap();
    let other_seed = map(&weights, &config, 6).unwrap();

    let g = |m: &memristive_crossbar::CrossbarMapping| -> Vec<f64> {
        m.devices().map(|d| d.conductance()).collect()
    };
    assert_eq!(g(&parallel), g(&sequential));
    assert_ne!(g(&parallel), g(&other_seed));
}

#[test]
fn test_single_column_uses_one_array() {
    let weights = ramp_weights(5, 5);
    let config = CrossbarConfig::default().with_scheme(Scheme::SingleColumn);
    let mapping = map(&weights, &config, 0).unwrap();
    assert_eq!(mapping.device_count(), 25);
    assert!(mapping.tiles()[0].array(Polarity::Negative).is_none());
}

#[test]
fn test_all_zero_weights_read_zero() {
    let weights = WeightTensor::zeros(vec![3, 4]).unwrap();
    let mut mapping = map(&weights, &CrossbarConfig::default(), 0).unwrap();
    assert!(mapping.conductance_per_weight().is_none());
    let out = mapping.read(&DMatrix::from_element(2, 4, 1.0)).unwrap();
    assert!(out.outputs.iter().all(|&y| y == 0.0));
    assert!(out.currents.iter().all(|&i| i == 0.0));
}
