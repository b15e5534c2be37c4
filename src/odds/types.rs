//! Odds types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One book's quote for one player/market/line at a point in time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OddsTick {
    /// Bookmaker identifier
    pub book: String,
    /// Sport key (e.g. "nfl")
    pub sport: String,
    /// Event identifier from the feed
    pub event_id: String,
    /// Player identifier
    pub player_id: String,
    /// Market key (e.g. "passing_yards")
    pub market: String,
    /// Quoted line
    pub line: f64,
    /// American odds for the over
    pub over_price: i32,
    /// American odds for the under
    pub under_price: i32,
    /// Time the quote was observed
    pub timestamp: DateTime<Utc>,
    /// Optional feed metadata
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

/// Method used to strip the bookmaker margin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DevigMethod {
    /// Scale both implied probabilities by their sum
    #[default]
    Multiplicative,
    /// Shin's insider-trading model
    Shin,
}

/// Vig-free probabilities for a two-sided quote
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeviggedProbabilities {
    /// Fair probability of the over
    pub p_over: f64,
    /// Fair probability of the under
    pub p_under: f64,
    /// Implied probability mass attributable to margin
    pub vig_removed: f64,
    /// Method actually applied (Shin may fall back to multiplicative)
    pub method: DevigMethod,
}

/// Odds errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OddsError {
    /// American odds must be <= -100 or >= +100
    #[error("Invalid American odds: {0}")]
    InvalidOdds(i32),
}
