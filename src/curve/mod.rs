//! Probability curve module
//!
//! Monotone probability-of-over curves across a continuum of lines

mod builder;
mod isotonic;
mod types;

pub use builder::{CurveBuilder, ProbabilityCurve};
pub use isotonic::{fit_non_increasing, IsotonicFit};
pub use types::{CurveError, CurveIssue, CurvePoint, DataPoint, LineRange};
