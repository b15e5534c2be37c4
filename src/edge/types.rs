//! Edge types

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A book's two-sided quote at one line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookLine {
    pub book: String,
    pub line: f64,
    /// American odds for the over
    pub over_price: i32,
    /// American odds for the under
    pub under_price: i32,
}

impl BookLine {
    pub fn new(book: impl Into<String>, line: f64, over_price: i32, under_price: i32) -> Self {
        Self {
            book: book.into(),
            line,
            over_price,
            under_price,
        }
    }
}

/// Side of a two-way prop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Over,
    Under,
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Over => write!(f, "over"),
            Side::Under => write!(f, "under"),
        }
    }
}

/// Value of one side of one book's quote against the fair curve
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeCalculation {
    pub book: String,
    pub side: Side,
    pub line: f64,
    /// Book's American price for this side
    pub market_price: i32,
    /// Curve probability for this side
    pub fair_probability: f64,
    /// Book's raw implied probability, margin included
    pub implied_probability: f64,
    /// fair - implied; positive favours the bettor
    pub edge: f64,
    /// Expected profit per unit stake
    pub expected_value: f64,
    /// Recommended bankroll fraction, in [0, kelly_cap]
    pub kelly_fraction: f64,
    /// American price with no margin at the fair probability
    pub fair_price: Option<i32>,
    /// kelly_fraction of the bankroll, when one was given
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stake: Option<Decimal>,
}
