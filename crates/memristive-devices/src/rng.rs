//! Stateless, seedable random numbers for device populations.
//!
//! Every random value is a pure function of `(seed, stream, draw)`, so a
//! device population can be sampled in any order (or in parallel) and still
//! reproduce bit-for-bit from the same seed. A stream usually identifies a
//! single device; the draw index counts the values taken from that stream.
//!
//! # Algorithm
//!
//! SplitMix64 is used as the mixing function. Gaussian values come from the
//! Box-Muller transform over two consecutive uniform draws of a stream.

use std::f64::consts::PI;

/// SplitMix64 hash function.
#[inline]
pub fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9e3779b97f4a7c15);
    x = (x ^ (x >> 30)).wrapping_mul(0xbf58476d1ce4e5b9);
    x = (x ^ (x >> 27)).wrapping_mul(0x94d049bb133111eb);
    x ^ (x >> 31)
}

/// Combine seed, stream and draw index into a single hash input.
///
/// The stream is hashed first so that neighbouring streams do not produce
/// correlated sequences.
#[inline]
pub fn combine_indices(seed: u64, stream: u64, draw: u32) -> u64 {
    seed ^ splitmix64(stream).wrapping_mul(0x517cc1b727220a95)
        ^ (draw as u64).wrapping_mul(0x5851f42d4c957f2d)
}

/// Uniform f64 in [0, 1) at the given coordinates.
///
/// # Example
/// ```
/// use memristive_devices::rng::uniform;
///
/// let value = uniform(42, 0, 0);
/// assert!((0.0..1.0).contains(&value));
/// assert_eq!(uniform(42, 0, 0), uniform(42, 0, 0));
/// assert_ne!(uniform(42, 0, 0), uniform(42, 0, 1));
/// ```
#[inline]
pub fn uniform(seed: u64, stream: u64, draw: u32) -> f64 {
    let hash = splitmix64(combine_indices(seed, stream, draw));
    // Upper 53 bits fill the f64 mantissa
    (hash >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
}

/// Box-Muller transform of two uniform values into a standard normal value.
#[inline]
fn box_muller(u1: f64, u2: f64) -> f64 {
    // Avoid log(0)
    let u1 = u1.max(1e-10);
    (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
}

/// Sequential view over one stream.
///
/// Each call advances the draw counter, so consecutive calls return
/// independent values while the whole sequence stays reproducible.
#[derive(Debug, Clone)]
pub struct ParameterSampler {
    seed: u64,
    stream: u64,
    draw: u32,
}

impl ParameterSampler {
    /// Create a sampler for `stream` under `seed`.
    pub fn new(seed: u64, stream: u64) -> Self {
        Self {
            seed,
            stream,
            draw: 0,
        }
    }

    /// Seed this sampler draws from.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Stream identifier.
    pub fn stream(&self) -> u64 {
        self.stream
    }

    /// Next uniform value in [0, 1).
    pub fn next_uniform(&mut self) -> f64 {
        let value = uniform(self.seed, self.stream, self.draw);
        self.draw = self.draw.wrapping_add(1);
        value
    }

    /// Next standard normal value.
    ///
    /// Consumes two uniform draws.
    pub fn next_gaussian(&mut self) -> f64 {
        let u1 = self.next_uniform();
        let u2 = self.next_uniform();
        box_muller(u1, u2)
    }
}
