//! Monte Carlo pricing module
//!
//! Fair value, interval and edge from a single player prior, used when no
//! multi-book curve is available

mod engine;
mod evidence;
mod reservoir;
mod types;

pub use engine::MonteCarloEngine;
pub use evidence::apply_evidence_adjustments;
pub use reservoir::{percentile, Reservoir};
pub use types::{
    AdjustedPrior, Evidence, MonteCarloRequest, PercentileMode, PlayerPrior, PricingError,
    PricingResult, RejectedEvidence, RejectionReason,
};
