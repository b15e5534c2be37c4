//! Monte Carlo fair value from a single prior
//!
//! Draws Normal(mu, sigma) samples with Box-Muller. p_over is counted over every
//! draw; percentiles come from a fixed-size reservoir unless exact mode keeps
//! every draw.

use std::f64::consts::PI;
use std::time::Instant;

use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::{EvidenceConfig, MonteCarloConfig};
use crate::telemetry::{record_latency, LatencyMetric};

use super::evidence::apply_evidence_adjustments;
use super::reservoir::{percentile, Reservoir};
use super::{MonteCarloRequest, PercentileMode, PricingError, PricingResult};

const MEDIAN: f64 = 0.50;
const LOWER: f64 = 0.16;
const UPPER: f64 = 0.84;

/// Single-prior pricing engine
pub struct MonteCarloEngine {
    config: MonteCarloConfig,
    evidence: EvidenceConfig,
}

impl MonteCarloEngine {
    /// Create a new engine with default configuration
    pub fn new() -> Self {
        Self::with_config(MonteCarloConfig::default(), EvidenceConfig::default())
    }

    /// Create an engine with custom configuration
    pub fn with_config(config: MonteCarloConfig, evidence: EvidenceConfig) -> Self {
        Self { config, evidence }
    }

    pub fn config(&self) -> &MonteCarloConfig {
        &self.config
    }

    /// Simulations a request will run: default when unset or zero, clamped to the maximum
    pub fn simulation_count(&self, requested: Option<usize>) -> usize {
        let count = match requested {
            Some(n) if n > 0 => n,
            _ => self.config.default_simulations,
        };
        if count > self.config.max_simulations {
            tracing::debug!(
                requested = count,
                max = self.config.max_simulations,
                "Simulation count clamped"
            );
        }
        count.min(self.config.max_simulations).max(1)
    }

    /// Price with the configured seed, or an entropy-seeded generator
    pub fn fair_value_default(&self, request: &MonteCarloRequest) -> Result<PricingResult, PricingError> {
        match self.config.seed {
            Some(seed) => self.fair_value_seeded(request, seed),
            None => self.fair_value(request, &mut StdRng::from_entropy()),
        }
    }

    /// Deterministic run for a given seed
    pub fn fair_value_seeded(
        &self,
        request: &MonteCarloRequest,
        seed: u64,
    ) -> Result<PricingResult, PricingError> {
        self.fair_value(request, &mut StdRng::seed_from_u64(seed))
    }

    /// Simulate the adjusted prior against the request's market line
    pub fn fair_value<R: Rng + ?Sized>(
        &self,
        request: &MonteCarloRequest,
        rng: &mut R,
    ) -> Result<PricingResult, PricingError> {
        let start = Instant::now();
        let prior = &request.prior;
        if !prior.is_valid() {
            tracing::warn!(
                player_id = %prior.player_id,
                market = %prior.market,
                mu = prior.mu,
                sigma = prior.sigma,
                "Refusing to sample degenerate prior"
            );
            return Err(PricingError::PriorInvalid {
                mu: prior.mu,
                sigma: prior.sigma,
            });
        }
        if !request.market_line.is_finite() {
            return Err(PricingError::InvalidLine(request.market_line));
        }

        let now = request.as_of.unwrap_or_else(Utc::now);
        let adjusted = apply_evidence_adjustments(prior, &request.evidence, &self.evidence, now);
        if !(adjusted.mu.is_finite() && adjusted.sigma.is_finite() && adjusted.sigma > 0.0) {
            return Err(PricingError::PriorInvalid {
                mu: adjusted.mu,
                sigma: adjusted.sigma,
            });
        }

        let simulations = self.simulation_count(request.simulations);
        let (mu, sigma) = (adjusted.mu, adjusted.sigma);
        let mut sink = match self.config.percentile_mode {
            PercentileMode::Reservoir => Sink::Reservoir(Reservoir::new(self.config.reservoir_size)),
            PercentileMode::Exact => Sink::Exact(Vec::with_capacity(simulations)),
        };

        // reservoir replacement uses its own stream so the draws do not depend on the mode
        let mut sampler = StdRng::seed_from_u64(rng.gen());
        let mut over = 0usize;
        let mut drawn = 0usize;
        while drawn < simulations {
            let (z0, z1) = box_muller(rng);
            for z in [z0, z1] {
                if drawn == simulations {
                    break;
                }
                let value = mu + sigma * z;
                if value > request.market_line {
                    over += 1;
                }
                sink.push(value, &mut sampler);
                drawn += 1;
            }
        }

        let sorted = sink.into_sorted();
        let p_over = over as f64 / simulations as f64;
        let result = PricingResult {
            fair_line: percentile(&sorted, MEDIAN),
            edge: p_over - 0.5,
            p_over,
            conf_low: percentile(&sorted, LOWER),
            conf_high: percentile(&sorted, UPPER),
            mu,
            sigma,
            simulations,
            applied_evidence: adjusted.applied,
            rejected_evidence: adjusted.rejected,
        };

        record_latency(LatencyMetric::Simulation, start.elapsed());
        tracing::debug!(
            player_id = %prior.player_id,
            market = %prior.market,
            market_line = request.market_line,
            fair_line = result.fair_line,
            p_over,
            simulations,
            elapsed_us = start.elapsed().as_micros() as u64,
            "Monte Carlo fair value"
        );
        Ok(result)
    }
}

impl Default for MonteCarloEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Where draws go for percentile estimation
enum Sink {
    Reservoir(Reservoir),
    Exact(Vec<f64>),
}

impl Sink {
    fn push(&mut self, value: f64, rng: &mut StdRng) {
        match self {
            Sink::Reservoir(reservoir) => reservoir.offer(value, rng),
            Sink::Exact(values) => values.push(value),
        }
    }

    fn into_sorted(self) -> Vec<f64> {
        match self {
            Sink::Reservoir(reservoir) => reservoir.into_sorted(),
            Sink::Exact(mut values) => {
                values.sort_by(f64::total_cmp);
                values
            }
        }
    }
}

/// Two independent standard normal draws
fn box_muller<R: Rng + ?Sized>(rng: &mut R) -> (f64, f64) {
    // gen() is in [0, 1); shift u1 into (0, 1] so ln is finite
    let u1 = 1.0 - rng.gen::<f64>();
    let u2 = rng.gen::<f64>();
    let r = (-2.0 * u1.ln()).sqrt();
    let theta = 2.0 * PI * u2;
    (r * theta.cos(), r * theta.sin())
}
