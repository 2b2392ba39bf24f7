//! Weight tensors and their crossbar (rows = inputs, columns = outputs) view.

use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A dense weight tensor in layer layout `[out, in, k...]`.
///
/// Linear layers use `[out_features, in_features]`; convolutions append the
/// kernel dimensions. Data is row-major over `shape`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightTensor {
    shape: Vec<usize>,
    data: Vec<f64>,
}

impl WeightTensor {
    /// Create a tensor, checking that `data` fills `shape`.
    pub fn new(shape: Vec<usize>, data: Vec<f64>) -> Result<Self> {
        if shape.len() < 2 {
            return Err(Error::InvalidShape(format!(
                "expected at least 2 dimensions, got {:?}",
                shape
            )));
        }
        if shape.iter().any(|&d| d == 0) {
            return Err(Error::InvalidShape(format!("zero-sized dimension in {:?}", shape)));
        }
        let expected: usize = shape.iter().product();
        if data.len() != expected {
            return Err(Error::DimensionMismatch {
                what: "weight data",
                expected,
                actual: data.len(),
            });
        }
        if let Some(bad) = data.iter().find(|w| !w.is_finite()) {
            return Err(Error::Configuration(format!("non-finite weight {}", bad)));
        }
        Ok(Self { shape, data })
    }

    /// Linear-layer weights `[out_features, in_features]`.
    pub fn linear(out_features: usize, in_features: usize, data: Vec<f64>) -> Result<Self> {
        Self::new(vec![out_features, in_features], data)
    }

    /// All-zero tensor.
    pub fn zeros(shape: Vec<usize>) -> Result<Self> {
        let len = shape.iter().product();
        Self::new(shape, vec![0.0; len])
    }

    /// Validate a deserialized tensor.
    pub fn validated(self) -> Result<Self> {
        Self::new(self.shape, self.data)
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn data(&self) -> &[f64] {
        &self.data
    }

    /// Number of output channels/features (crossbar columns).
    pub fn out_features(&self) -> usize {
        self.shape[0]
    }

    /// Flattened fan-in (crossbar rows).
    pub fn in_features(&self) -> usize {
        self.shape[1..].iter().product()
    }

    /// Crossbar view: `rows = in_features`, `cols = out_features`.
    pub fn to_crossbar_matrix(&self) -> DMatrix<f64> {
        let fan_in = self.in_features();
        DMatrix::from_fn(fan_in, self.out_features(), |r, c| self.data[c * fan_in + r])
    }

    /// Ideal layer output `inputs · W^T` for `inputs` of shape `batch × in_features`.
    pub fn ideal_forward(&self, inputs: &DMatrix<f64>) -> Result<DMatrix<f64>> {
        if inputs.ncols() != self.in_features() {
            return Err(Error::DimensionMismatch {
                what: "input",
                expected: self.in_features(),
                actual: inputs.ncols(),
            });
        }
        Ok(inputs * self.to_crossbar_matrix())
    }

    /// Largest absolute weight.
    pub fn max_abs(&self) -> f64 {
        self.data.iter().fold(0.0f64, |acc, w| acc.max(w.abs()))
    }
}
