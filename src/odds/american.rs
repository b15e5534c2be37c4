//! American odds conversions
//!
//! +150 wins 150 on a 100 stake; -150 stakes 150 to win 100.

use super::OddsError;

/// Reject values that are not a valid American encoding
pub fn validate(odds: i32) -> Result<i32, OddsError> {
    if odds >= 100 || odds <= -100 {
        Ok(odds)
    } else {
        Err(OddsError::InvalidOdds(odds))
    }
}

/// Raw implied probability, margin included
pub fn implied_probability(odds: i32) -> Result<f64, OddsError> {
    let odds = validate(odds)?;
    let odds = odds as f64;
    if odds > 0.0 {
        Ok(100.0 / (odds + 100.0))
    } else {
        Ok(-odds / (-odds + 100.0))
    }
}

/// Decimal price (total return per unit stake)
pub fn to_decimal(odds: i32) -> Result<f64, OddsError> {
    let odds = validate(odds)?;
    let odds = odds as f64;
    if odds > 0.0 {
        Ok(1.0 + odds / 100.0)
    } else {
        Ok(1.0 + 100.0 / -odds)
    }
}

/// Fair American odds for a probability, rounded to the nearest integer
///
/// Returns `None` for probabilities outside the open interval (0, 1).
pub fn from_probability(prob: f64) -> Option<i32> {
    if !(prob > 0.0 && prob < 1.0) {
        return None;
    }
    let odds = if prob >= 0.5 {
        -(prob / (1.0 - prob)) * 100.0
    } else {
        (1.0 - prob) / prob * 100.0
    };
    let odds = odds.round();
    if !odds.is_finite() || odds.abs() > i32::MAX as f64 {
        return None;
    }
    // -100 and +100 are the same price; prefer +100 for even money
    Some(if odds as i32 == -100 { 100 } else { odds as i32 })
}
