// src/discretizer.rs
//
// Maps one or more continuous observation dimensions to a single bounded
// integer state index.
//
// Each dimension carries an ascending boundary table. A value is assigned
// the index of the first boundary it is <= to (ties go to the lower
// bucket); a value beyond the last boundary overflows into bucket
// `boundaries.len()`. Per-dimension bucket indices are folded into one
// flat index with suffix-product strides, so every reachable combination
// maps to a distinct in-range index.

use crate::error::{Result, RlError};

/// One observation dimension: a name (for diagnostics) and its ascending
/// boundary table, fixed at configuration time.
#[derive(Debug, Clone)]
pub struct Dimension {
    name: String,
    boundaries: Vec<f64>,
}

impl Dimension {
    pub fn new(name: impl Into<String>, boundaries: Vec<f64>) -> Result<Self> {
        let name = name.into();
        if boundaries.is_empty() {
            return Err(RlError::Configuration(format!(
                "dimension `{}` has an empty boundary table",
                name
            )));
        }
        for w in boundaries.windows(2) {
            if !(w[1] >= w[0]) {
                return Err(RlError::Configuration(format!(
                    "dimension `{}` boundaries are not monotonically non-decreasing \
                     ({} then {})",
                    name, w[0], w[1]
                )));
            }
        }
        if boundaries.iter().any(|b| !b.is_finite()) {
            return Err(RlError::Configuration(format!(
                "dimension `{}` contains a non-finite boundary",
                name
            )));
        }
        Ok(Self { name, boundaries })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Bucket count including the overflow bucket past the last boundary.
    pub fn bucket_count(&self) -> usize {
        self.boundaries.len() + 1
    }

    /// Assign the bucket index for `value`.
    ///
    /// Non-strict `<=` test: values below the first boundary and values
    /// exactly equal to a boundary both land in that boundary's bucket.
    pub fn bucket(&self, value: f64) -> Result<usize> {
        if !value.is_finite() {
            return Err(RlError::DegenerateInput {
                dimension: self.name.clone(),
                value,
            });
        }
        for (idx, b) in self.boundaries.iter().enumerate() {
            if value <= *b {
                return Ok(idx);
            }
        }
        Ok(self.boundaries.len())
    }
}

/// Folds per-dimension bucket indices into one flat state index.
///
/// Dimension ordering and strides are fixed at construction and must match
/// the Q-table's row dimension (`state_count()`).
#[derive(Debug, Clone)]
pub struct Discretizer {
    dimensions: Vec<Dimension>,
    strides: Vec<usize>,
    state_count: usize,
}

impl Discretizer {
    pub fn new(dimensions: Vec<Dimension>) -> Result<Self> {
        if dimensions.is_empty() {
            return Err(RlError::Configuration(
                "discretizer needs at least one dimension".into(),
            ));
        }

        // Suffix products: the last dimension varies fastest.
        let mut strides = vec![1usize; dimensions.len()];
        for i in (0..dimensions.len().saturating_sub(1)).rev() {
            strides[i] = strides[i + 1] * dimensions[i + 1].bucket_count();
        }
        let state_count = strides[0] * dimensions[0].bucket_count();

        Ok(Self {
            dimensions,
            strides,
            state_count,
        })
    }

    /// Total number of distinct flat indices this discretizer can produce.
    pub fn state_count(&self) -> usize {
        self.state_count
    }

    pub fn dimensions(&self) -> &[Dimension] {
        &self.dimensions
    }

    /// Encode one observation (one value per dimension) to a flat index.
    ///
    /// Any finite input produces a valid in-range index; NaN/infinite
    /// values are rejected.
    pub fn encode(&self, values: &[f64]) -> Result<usize> {
        if values.len() != self.dimensions.len() {
            return Err(RlError::Configuration(format!(
                "expected {} observation values, got {}",
                self.dimensions.len(),
                values.len()
            )));
        }
        let mut index = 0usize;
        for ((dim, stride), value) in self
            .dimensions
            .iter()
            .zip(self.strides.iter())
            .zip(values.iter())
        {
            index += dim.bucket(*value)? * stride;
        }
        Ok(index)
    }

    /// Boundary tables of the balancing controller: pitch (deg),
    /// smoothed pitch rate (deg/s), linear acceleration (m/s^2).
    pub fn pitch_default() -> Result<Self> {
        Discretizer::new(vec![
            Dimension::new("pitch", vec![-5.0, -3.0, -2.0, -1.0, -0.5, 0.0, 0.5, 1.0, 2.0, 3.0, 5.0])?,
            Dimension::new(
                "pitch_dot",
                vec![-2.0, -1.5, -1.0, -0.6, -0.2, 0.0, 0.2, 0.6, 1.0, 1.5, 2.0],
            )?,
            Dimension::new(
                "linear_accel",
                vec![-2.0, -1.5, -1.0, -0.5, 0.0, 0.5, 1.0, 1.5, 2.0],
            )?,
        ])
    }
}
