//! Monte Carlo types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Belief about a player's stat for one market
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerPrior {
    pub player_id: String,
    pub market: String,
    pub mu: f64,
    pub sigma: f64,
    pub updated_at: DateTime<Utc>,
}

impl PlayerPrior {
    pub fn new(player_id: impl Into<String>, market: impl Into<String>, mu: f64, sigma: f64) -> Self {
        Self {
            player_id: player_id.into(),
            market: market.into(),
            mu,
            sigma,
            updated_at: Utc::now(),
        }
    }

    /// Finite mean and positive finite spread
    pub fn is_valid(&self) -> bool {
        self.mu.is_finite() && self.sigma.is_finite() && self.sigma > 0.0
    }
}

/// A news or injury signal that nudges a prior
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evidence {
    pub id: String,
    pub source: String,
    /// Shift applied to mu at full weight
    #[serde(default)]
    pub mu_delta: f64,
    /// Shift applied to sigma at full weight
    #[serde(default)]
    pub sigma_delta: f64,
    /// Source reliability in [0, 1]
    pub weight: f64,
    pub observed_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

/// Why an evidence item was left out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionReason {
    LowWeight,
    Stale,
    NonFinite,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RejectedEvidence {
    pub id: String,
    pub reason: RejectionReason,
}

/// Prior after evidence adjustments
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdjustedPrior {
    pub mu: f64,
    pub sigma: f64,
    /// Ids of evidence that passed the filters, in input order
    pub applied: Vec<String>,
    pub rejected: Vec<RejectedEvidence>,
}

/// How percentiles are computed from the draws
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PercentileMode {
    /// Fixed-size uniform sample of the draws
    #[default]
    Reservoir,
    /// Every draw retained
    Exact,
}

/// Input to a single-prior pricing run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonteCarloRequest {
    pub market_line: f64,
    pub prior: PlayerPrior,
    #[serde(default)]
    pub evidence: Vec<Evidence>,
    /// Defaults to the configured count when unset or zero
    #[serde(default)]
    pub simulations: Option<usize>,
    /// Reference time for evidence ages; now when unset
    #[serde(default)]
    pub as_of: Option<DateTime<Utc>>,
}

impl MonteCarloRequest {
    pub fn new(market_line: f64, prior: PlayerPrior) -> Self {
        Self {
            market_line,
            prior,
            evidence: Vec::new(),
            simulations: None,
            as_of: None,
        }
    }

    pub fn with_simulations(mut self, simulations: usize) -> Self {
        self.simulations = Some(simulations);
        self
    }

    pub fn with_evidence(mut self, evidence: Vec<Evidence>) -> Self {
        self.evidence = evidence;
        self
    }
}

/// Simulated fair value against a market line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingResult {
    /// Median draw
    pub fair_line: f64,
    /// p_over - 0.5
    pub edge: f64,
    /// Share of draws strictly above the market line
    pub p_over: f64,
    /// 16th percentile
    pub conf_low: f64,
    /// 84th percentile
    pub conf_high: f64,
    /// Adjusted mean used for sampling
    pub mu: f64,
    /// Adjusted spread used for sampling
    pub sigma: f64,
    pub simulations: usize,
    pub applied_evidence: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rejected_evidence: Vec<RejectedEvidence>,
}

/// Pricing errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PricingError {
    /// Sigma not positive or parameters not finite; nothing was sampled
    #[error("prior_invalid: mu={mu}, sigma={sigma}")]
    PriorInvalid { mu: f64, sigma: f64 },

    #[error("Invalid market line: {0}")]
    InvalidLine(f64),

    /// Missing prior or missing/non-numeric line
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Prior store error: {0}")]
    Store(String),

    /// Simulation task panicked or was cancelled
    #[error("Simulation failed: {0}")]
    Simulation(String),
}
