//! Solver types

use serde::{Deserialize, Serialize};

use crate::curve::ProbabilityCurve;

/// Root-finding method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SolverMethod {
    #[default]
    Bisection,
    /// Newton steps on a numerical derivative, safeguarded by the bracket
    Newton,
}

/// Lines searched for the 0.5 crossing
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SearchRange {
    pub min: f64,
    pub max: f64,
}

impl SearchRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// The curve's own scan range
    pub fn of(curve: &ProbabilityCurve) -> Self {
        let range = curve.range();
        Self::new(range.min, range.max)
    }

    /// Ordered, finite range; falls back to the curve's scan range
    pub(crate) fn normalised(self, curve: &ProbabilityCurve) -> Self {
        if !(self.min.is_finite() && self.max.is_finite()) {
            return Self::of(curve);
        }
        if self.min > self.max {
            Self::new(self.max, self.min)
        } else {
            self
        }
    }

    pub fn width(&self) -> f64 {
        self.max - self.min
    }
}

/// Interval of lines around the fair line
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceInterval {
    pub lower: f64,
    pub upper: f64,
}

/// Conditions that lowered the solver's confidence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolverFlag {
    /// Curve never crosses 0.5 in range; the closest boundary was returned
    NoCrossing,
    /// Curve sits at 0.5 over an interval; its midpoint was returned
    Plateau,
    /// Iteration budget ran out before the bracket met the tolerance
    DidNotConverge,
    /// Newton could not proceed and bisection finished the solve
    NewtonFallback,
    /// Curve built from a single line
    FlatCurve,
    /// Curve needed a large isotonic correction
    NonMonotonicCurve,
}

/// Solved zero-crossing of a probability curve
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FairMarketLine {
    /// Line at which P(over) = 0.5
    pub line: f64,
    /// Steepness and data density near the crossing, in [0, 1]
    pub confidence: f64,
    pub confidence_interval: ConfidenceInterval,
    /// Method that produced `line`
    pub method: SolverMethod,
    pub iterations: u32,
    pub flags: Vec<SolverFlag>,
}

impl FairMarketLine {
    pub fn has_flag(&self, flag: SolverFlag) -> bool {
        self.flags.contains(&flag)
    }
}
