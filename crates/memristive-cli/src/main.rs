//! Memristive command-line interface.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use memristive::{
    map, CrossbarConfig, DMatrix, NonIdeality, NonIdealityEngine, ParameterSampler,
    PopulationStatistics, WeightTensor,
};
use serde::Deserialize;

mod report;

use report::Report;

#[derive(Parser)]
#[command(name = "memristive")]
#[command(about = "Simulate neural network weights on memristive crossbars", long_about = None)]
#[command(version)]
struct Cli {
    /// Weight tensor file (JSON: {"shape": [...], "data": [...]})
    #[arg(value_name = "WEIGHTS")]
    weights: PathBuf,

    /// Simulation bundle (JSON: crossbar config, non-idealities, seeds)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Input batch file (JSON: list of rows); random inputs when omitted
    #[arg(short, long, value_name = "FILE")]
    inputs: Option<PathBuf>,

    /// Number of random input rows
    #[arg(long, default_value_t = 16)]
    batch: usize,

    /// Override the mapping seed of the bundle
    #[arg(long)]
    seed: Option<u64>,

    /// Histogram bins for the conductance distribution
    #[arg(long, default_value_t = 20)]
    bins: usize,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,

    /// Verbose output (repeat for more)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Simulation bundle read from `--config`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Bundle {
    crossbar: CrossbarConfig,
    non_idealities: Vec<NonIdeality>,
    /// Seed for device parameters.
    seed: u64,
    /// Seed for fault draws.
    engine_seed: u64,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut bundle = match &cli.config {
        Some(path) => read_json::<Bundle>(path, "config")?,
        None => Bundle::default(),
    };
    if let Some(seed) = cli.seed {
        bundle.seed = seed;
    }

    let weights = read_json::<WeightTensor>(&cli.weights, "weights")?
        .validated()
        .context("Invalid weight tensor")?;
    let inputs = match &cli.inputs {
        Some(path) => load_inputs(path)?,
        None => random_inputs(cli.batch, weights.in_features(), bundle.seed),
    };

    let report = run(&cli, &bundle, &weights, &inputs)?;
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        report.print();
    }
    Ok(())
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        _ => log::LevelFilter::Debug,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn run(cli: &Cli, bundle: &Bundle, weights: &WeightTensor, inputs: &DMatrix<f64>) -> Result<Report> {
    let mapping = map(weights, &bundle.crossbar, bundle.seed).context("Mapping failed")?;
    log::info!(
        "Mapped {:?} weights onto {} tiles ({} devices)",
        weights.shape(),
        mapping.tiles().len(),
        mapping.device_count()
    );

    let engine = NonIdealityEngine::new(bundle.engine_seed);
    let mut mapping = engine
        .apply(mapping, &bundle.non_idealities)
        .context("Applying non-idealities failed")?;

    let ideal = weights
        .ideal_forward(inputs)
        .context("Inputs do not match the weight tensor")?;
    let output = mapping.read(inputs).context("Read failed")?;
    let effective = mapping
        .effective_weights()
        .context("Effective weight extraction failed")?;
    let statistics = PopulationStatistics::collect(&mapping, cli.bins);

    Ok(Report::new(weights, &mapping, &ideal, &output, &effective, statistics))
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path, what: &str) -> Result<T> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}: {}", what, path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse {}: {}", what, path.display()))
}

fn load_inputs(path: &Path) -> Result<DMatrix<f64>> {
    let rows: Vec<Vec<f64>> = read_json(path, "inputs")?;
    let width = rows.first().map_or(0, Vec::len);
    if let Some(bad) = rows.iter().position(|r| r.len() != width) {
        anyhow::bail!(
            "Input row {} has {} values, expected {}",
            bad,
            rows[bad].len(),
            width
        );
    }
    Ok(DMatrix::from_fn(rows.len(), width, |b, r| rows[b][r]))
}

/// Uniform inputs in `[-1, 1)`, reproducible from `seed`.
fn random_inputs(batch: usize, width: usize, seed: u64) -> DMatrix<f64> {
    let mut sampler = ParameterSampler::new(seed, u64::MAX);
    DMatrix::from_fn(batch, width, |_, _| 2.0 * sampler.next_uniform() - 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundle_defaults() {
        let bundle: Bundle = serde_json::from_str("{}").unwrap();
        assert!(bundle.non_idealities.is_empty());
        assert_eq!(bundle.crossbar, CrossbarConfig::default());
    }

    #[test]
    fn test_bundle_with_non_idealities() {
        let bundle: Bundle = serde_json::from_str(
            r#"{
                "seed": 3,
                "crossbar": {"adc_resolution": 8, "quant_method": "log"},
                "non_idealities": [
                    {"kind": "device_faults", "lrs_proportion": 0.05},
                    {"kind": "finite_conductance_states", "conductance_states": 16}
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(bundle.seed, 3);
        assert_eq!(bundle.crossbar.adc_resolution, Some(8));
        assert_eq!(bundle.non_idealities.len(), 2);
    }

    #[test]
    fn test_random_inputs_reproducible() {
        let a = random_inputs(4, 3, 9);
        let b = random_inputs(4, 3, 9);
        assert_eq!(a, b);
        assert!(a.iter().all(|x| (-1.0..1.0).contains(x)));
    }
}
