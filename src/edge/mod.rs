//! Edge calculator module
//!
//! Compares each book's price to the fair curve and sizes the bet with
//! fractional Kelly

mod calculator;
mod kelly;
mod types;

pub use calculator::{sort_by_abs_edge, EdgeCalculator};
pub use kelly::KellyCalculator;
pub use types::{BookLine, EdgeCalculation, Side};
