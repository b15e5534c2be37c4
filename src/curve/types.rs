//! Curve types

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Observed probability of the over at a line
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    pub line: f64,
    pub probability: f64,
    /// Pooling weight (e.g. consensus weight behind the point)
    #[serde(default = "default_weight")]
    pub weight: f64,
}

fn default_weight() -> f64 {
    1.0
}

impl DataPoint {
    pub fn new(line: f64, probability: f64) -> Self {
        Self {
            line,
            probability,
            weight: 1.0,
        }
    }

    pub fn weighted(line: f64, probability: f64, weight: f64) -> Self {
        Self {
            line,
            probability,
            weight,
        }
    }

    pub(crate) fn is_usable(&self) -> bool {
        self.line.is_finite()
            && self.probability.is_finite()
            && (0.0..=1.0).contains(&self.probability)
            && self.weight.is_finite()
            && self.weight >= 0.0
    }
}

/// A sampled point on a fitted curve
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurvePoint {
    pub line: f64,
    pub probability: f64,
}

/// Scan range for a curve
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LineRange {
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

impl LineRange {
    pub fn new(min: f64, max: f64, step: f64) -> Self {
        Self { min, max, step }
    }

    /// Number of grid samples, or an error if the range is unusable
    pub fn grid_len(&self, max_samples: usize) -> Result<usize, CurveError> {
        if !(self.min.is_finite() && self.max.is_finite() && self.step.is_finite()) {
            return Err(CurveError::InvalidRange(*self));
        }
        if self.step <= 0.0 || self.max < self.min {
            return Err(CurveError::InvalidRange(*self));
        }
        // counted in f64; huge spans must not overflow usize
        let len = ((self.max - self.min) / self.step + 1e-9).floor() + 1.0;
        if !len.is_finite() || len > max_samples as f64 {
            return Err(CurveError::TooManySamples {
                samples: if len.is_finite() { len as usize } else { usize::MAX },
                max: max_samples,
            });
        }
        Ok(len as usize)
    }
}

/// Recoverable problems found while fitting
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "issue", rename_all = "snake_case")]
pub enum CurveIssue {
    /// Fewer than two distinct lines; the curve is constant
    Flat,
    /// Isotonic correction moved a point further than tolerated
    NonMonotonic { max_correction: f64 },
}

/// Curve errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CurveError {
    /// No usable data point
    #[error("Insufficient data: no usable sample points")]
    InsufficientData,
    /// Range is not finite, reversed, or has a non-positive step
    #[error("Invalid line range: {0:?}")]
    InvalidRange(LineRange),
    /// Range and step would produce too many samples
    #[error("Line range needs {samples} samples, limit is {max}")]
    TooManySamples { samples: usize, max: usize },
}
