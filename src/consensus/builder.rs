//! Weighted multi-book consensus

use crate::config::ConsensusConfig;

use super::{BookProbability, BookWeights, Consensus};

/// Books at which the count factor reaches 1 - 1/e
const COUNT_SCALE: f64 = 4.0;

/// Dispersion (in probability) at which agreement halves
const AGREEMENT_SCALE: f64 = 0.02;

/// Total weight at which the mass factor reaches one half
const MASS_SCALE: f64 = 0.5;

/// Combines per-book devigged probabilities into one consensus
pub struct ConsensusBuilder {
    single_source_cap: f64,
}

impl ConsensusBuilder {
    /// Create a builder with the given single-source confidence ceiling
    pub fn new(single_source_cap: f64) -> Self {
        Self { single_source_cap }
    }

    /// Create from ConsensusConfig
    pub fn from_config(config: &ConsensusConfig) -> Self {
        Self::new(config.single_source_cap)
    }

    pub fn single_source_cap(&self) -> f64 {
        self.single_source_cap
    }

    /// Weighted consensus, or `None` when no book has a usable probability
    ///
    /// Confidence grows with the number of books, their agreement and the total
    /// weight behind them. A lone book never exceeds the single-source cap.
    pub fn calculate_consensus(
        &self,
        books: &[BookProbability],
        weights: &BookWeights,
    ) -> Option<Consensus> {
        let usable: Vec<(&BookProbability, f64)> = books
            .iter()
            .filter(|b| b.p_over.is_finite() && (0.0..=1.0).contains(&b.p_over))
            .map(|b| (b, weights.weight_for(&b.book)))
            .collect();
        if usable.is_empty() {
            return None;
        }

        let n = usable.len();
        let total_weight: f64 = usable.iter().map(|(_, w)| w).sum();
        // all-zero weights still average, but contribute no confidence mass
        let averaging: Vec<f64> = if total_weight > 0.0 {
            usable.iter().map(|(_, w)| *w).collect()
        } else {
            vec![1.0; n]
        };
        let averaging_total: f64 = averaging.iter().sum();

        let p_over = usable
            .iter()
            .zip(&averaging)
            .map(|((b, _), w)| w * b.p_over)
            .sum::<f64>()
            / averaging_total;
        let variance = usable
            .iter()
            .zip(&averaging)
            .map(|((b, _), w)| w * (b.p_over - p_over).powi(2))
            .sum::<f64>()
            / averaging_total;
        let dispersion = variance.sqrt();

        let count_factor = 1.0 - (-(n as f64) / COUNT_SCALE).exp();
        let agreement = 1.0 / (1.0 + dispersion / AGREEMENT_SCALE);
        let mass_factor = total_weight / (total_weight + MASS_SCALE);
        let mut confidence = (count_factor * agreement * mass_factor).clamp(0.0, 1.0);
        if n == 1 {
            confidence = confidence.min(self.single_source_cap);
        }

        Some(Consensus {
            p_over,
            p_under: 1.0 - p_over,
            confidence,
            books: n,
            total_weight,
            dispersion,
        })
    }
}

impl Default for ConsensusBuilder {
    fn default() -> Self {
        Self::from_config(&ConsensusConfig::default())
    }
}
