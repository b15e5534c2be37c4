//! Kelly criterion sizing

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;

/// Fractional Kelly with a hard cap
#[derive(Debug, Clone, Copy)]
pub struct KellyCalculator {
    /// Kelly fraction (e.g. 0.25 for quarter Kelly)
    pub multiplier: f64,
    /// Maximum bet as a fraction of bankroll
    pub cap: f64,
}

impl KellyCalculator {
    /// Create a new Kelly calculator
    pub fn new(multiplier: f64, cap: f64) -> Self {
        Self { multiplier, cap }
    }

    /// Bankroll fraction for a bet at `decimal_odds` that wins with `probability`
    ///
    /// - b = decimal_odds - 1 (net odds)
    /// - f* = (b*p - q) / b
    ///
    /// Scaled by the multiplier and clipped to [0, cap]; never negative.
    pub fn fraction(&self, probability: f64, decimal_odds: f64) -> f64 {
        let b = decimal_odds - 1.0;
        if !(b > 0.0) || !probability.is_finite() {
            return 0.0;
        }
        let p = probability.clamp(0.0, 1.0);
        let full = (b * p - (1.0 - p)) / b;
        let cap = self.cap.max(0.0);
        (full * self.multiplier).clamp(0.0, cap)
    }

    /// Stake for `fraction` of `bankroll`, rounded to cents
    pub fn stake(&self, fraction: f64, bankroll: Decimal) -> Option<Decimal> {
        let fraction = Decimal::from_f64(fraction)?;
        Some((bankroll * fraction).round_dp(2).max(Decimal::ZERO))
    }
}

impl Default for KellyCalculator {
    fn default() -> Self {
        Self::new(0.25, 0.05)
    }
}
