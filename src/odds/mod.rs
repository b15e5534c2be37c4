//! Odds module
//!
//! American odds conversion and vig removal

pub mod american;
mod devig;
mod types;

pub use devig::{devig, SHIN_MAX_ITERATIONS};
pub use types::{DevigMethod, DeviggedProbabilities, OddsError, OddsTick};
