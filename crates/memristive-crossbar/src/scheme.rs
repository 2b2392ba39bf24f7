//! Weight representation schemes: how a signed weight becomes conductances.

use serde::{Deserialize, Serialize};

/// Weight representation scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scheme {
    /// One device per weight, offset around the mid conductance. The offset
    /// is removed by a reference column at read time.
    SingleColumn,
    /// A positive and a negative device per weight; the weight is their
    /// conductance difference.
    #[default]
    DoubleColumn,
}

/// Linear map between weight space and conductance space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConductanceScale {
    /// Nominal high-resistance conductance.
    pub g_off: f64,
    /// Nominal low-resistance conductance.
    pub g_on: f64,
    /// Weight magnitude mapped to the full conductance swing. Zero for an
    /// all-zero tensor.
    pub weight_reference: f64,
}

impl ConductanceScale {
    /// Mid-range conductance used by the single-column reference column.
    pub fn reference_conductance(&self) -> f64 {
        0.5 * (self.g_on + self.g_off)
    }
}

impl Scheme {
    /// Number of devices used per weight.
    pub fn devices_per_weight(&self) -> usize {
        match self {
            Scheme::SingleColumn => 1,
            Scheme::DoubleColumn => 2,
        }
    }

    /// Conductance change per unit weight, `None` when every weight is zero.
    pub fn conductance_per_weight(&self, scale: &ConductanceScale) -> Option<f64> {
        if scale.weight_reference <= 0.0 {
            return None;
        }
        let swing = scale.g_on - scale.g_off;
        Some(match self {
            Scheme::SingleColumn => swing / (2.0 * scale.weight_reference),
            Scheme::DoubleColumn => swing / scale.weight_reference,
        })
    }

    /// Target conductances `(positive, negative)` for `weight`.
    ///
    /// Weights beyond the reference magnitude saturate. The negative device
    /// is `None` in the single-column scheme.
    pub fn targets(&self, weight: f64, scale: &ConductanceScale) -> (f64, Option<f64>) {
        let per_weight = self.conductance_per_weight(scale).unwrap_or(0.0);
        let w = weight.clamp(-scale.weight_reference, scale.weight_reference);
        match self {
            Scheme::SingleColumn => (scale.reference_conductance() + w * per_weight, None),
            Scheme::DoubleColumn => {
                let delta = w.abs() * per_weight;
                if w >= 0.0 {
                    (scale.g_off + delta, Some(scale.g_off))
                } else {
                    (scale.g_off, Some(scale.g_off + delta))
                }
            }
        }
    }
}
