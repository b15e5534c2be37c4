//! Fair-line solver module
//!
//! Solves a probability curve for the line at which the over is a coin flip

mod fair_line;
mod types;

pub use fair_line::FairLineSolver;
pub use types::{ConfidenceInterval, FairMarketLine, SearchRange, SolverFlag, SolverMethod};
