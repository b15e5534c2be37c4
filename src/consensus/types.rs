//! Consensus types

use serde::{Deserialize, Serialize};

/// How much to trust a book's line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookWeight {
    /// Bookmaker identifier
    pub book: String,
    /// Base trust weight, must be non-negative
    pub weight: f64,
    /// How often the book's line leads the market, in [0, 1]
    #[serde(default = "default_unit")]
    pub sharpness: f64,
    /// Depth of the book's limits, in [0, 1]
    #[serde(default = "default_unit")]
    pub liquidity: f64,
}

fn default_unit() -> f64 {
    1.0
}

impl BookWeight {
    pub fn new(book: impl Into<String>, weight: f64) -> Self {
        Self {
            book: book.into(),
            weight,
            sharpness: 1.0,
            liquidity: 1.0,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if !(self.weight.is_finite() && self.weight >= 0.0) {
            return Err(format!("{}: weight must be non-negative", self.book));
        }
        if !(0.0..=1.0).contains(&self.sharpness) {
            return Err(format!("{}: sharpness must be in [0, 1]", self.book));
        }
        if !(0.0..=1.0).contains(&self.liquidity) {
            return Err(format!("{}: liquidity must be in [0, 1]", self.book));
        }
        Ok(())
    }

    /// Weight used for averaging; sharpness and liquidity each scale it by 0.5 to 1
    pub fn effective(&self) -> f64 {
        self.weight * (0.5 + 0.5 * self.sharpness) * (0.5 + 0.5 * self.liquidity)
    }
}

/// One book's devigged probability at its quoted line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookProbability {
    pub book: String,
    pub line: f64,
    pub p_over: f64,
}

/// Weighted consensus across books
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Consensus {
    pub p_over: f64,
    pub p_under: f64,
    /// In [0, 1]; capped for a single source
    pub confidence: f64,
    /// Contributing books
    pub books: usize,
    /// Sum of effective weights
    pub total_weight: f64,
    /// Weighted standard deviation of book p_over
    pub dispersion: f64,
}
