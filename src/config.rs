//! Configuration types for fairline

use serde::Deserialize;
use std::sync::{Arc, PoisonError, RwLock};
use thiserror::Error;

use crate::consensus::BookWeight;
use crate::distribution::{FeatureSensitivity, MarketBaseline};
use crate::montecarlo::PercentileMode;
use crate::odds::DevigMethod;
use crate::solver::SolverMethod;
use crate::telemetry::LogFormat;

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub devig: DevigConfig,
    pub consensus: ConsensusConfig,
    pub distribution: DistributionConfig,
    pub curve: CurveConfig,
    pub solver: SolverConfig,
    pub edge: EdgeConfig,
    pub monte_carlo: MonteCarloConfig,
    pub evidence: EvidenceConfig,
    pub cache: CacheConfig,
    pub telemetry: TelemetryConfig,
}

/// Devig configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DevigConfig {
    pub method: DevigMethod,
}

/// Consensus configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ConsensusConfig {
    /// Weight for books without an entry in `books`
    pub default_weight: f64,
    /// Confidence ceiling when only one book contributes
    pub single_source_cap: f64,
    /// Per-book trust weights
    pub books: Vec<BookWeight>,
}

impl Default for ConsensusConfig {
    fn default() -> Self {
        Self {
            default_weight: 1.0,
            single_source_cap: 0.35,
            books: Vec::new(),
        }
    }
}

/// Distribution predictor configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DistributionConfig {
    /// Baselines overriding or extending the built-in table
    pub baselines: Vec<MarketBaseline>,
    pub sensitivity: FeatureSensitivity,
}

/// Probability curve configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CurveConfig {
    /// Scan resolution in line units
    pub step: f64,
    /// Scan range extension beyond the outermost quoted lines
    pub padding: f64,
    /// Largest isotonic correction tolerated before the curve is flagged
    pub non_monotonic_tolerance: f64,
    /// Upper bound on scan samples per curve
    pub max_samples: usize,
}

impl Default for CurveConfig {
    fn default() -> Self {
        Self {
            step: 0.5,
            padding: 5.0,
            non_monotonic_tolerance: 0.05,
            max_samples: 10_000,
        }
    }
}

/// Fair-line solver configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    pub method: SolverMethod,
    /// Bracket width at which the solve is converged
    pub tolerance: f64,
    pub max_iterations: u32,
    /// Step for central-difference slopes
    pub derivative_step: f64,
    /// Probability distance from 0.5 spanned by the confidence interval
    pub probability_band: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            method: SolverMethod::Bisection,
            tolerance: 0.05,
            max_iterations: 64,
            derivative_step: 0.05,
            probability_band: 0.05,
        }
    }
}

/// Edge calculation configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EdgeConfig {
    /// Fraction of full Kelly (e.g. 0.25 for quarter Kelly)
    pub kelly_multiplier: f64,
    /// Hard ceiling on the recommended bankroll fraction
    pub kelly_cap: f64,
    /// Edge above which a row counts as an edge found
    pub min_edge: f64,
}

impl Default for EdgeConfig {
    fn default() -> Self {
        Self {
            kelly_multiplier: 0.25,
            kelly_cap: 0.05,
            min_edge: 0.0,
        }
    }
}

/// Monte Carlo configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MonteCarloConfig {
    pub default_simulations: usize,
    /// Requests above this are clamped
    pub max_simulations: usize,
    pub reservoir_size: usize,
    pub percentile_mode: PercentileMode,
    /// Fixed seed for reproducible runs
    pub seed: Option<u64>,
}

impl Default for MonteCarloConfig {
    fn default() -> Self {
        Self {
            default_simulations: 20_000,
            max_simulations: 200_000,
            reservoir_size: 2_000,
            percentile_mode: PercentileMode::Reservoir,
            seed: None,
        }
    }
}

/// Evidence filtering configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EvidenceConfig {
    /// Items below this reliability are ignored
    pub min_weight: f64,
    /// Items older than this are ignored
    pub max_age_hours: f64,
    /// Age at which an item's influence halves
    pub half_life_hours: f64,
    /// Adjusted sigma never drops below this share of the prior sigma
    pub min_sigma_ratio: f64,
}

impl Default for EvidenceConfig {
    fn default() -> Self {
        Self {
            min_weight: 0.1,
            max_age_hours: 72.0,
            half_life_hours: 24.0,
            min_sigma_ratio: 0.25,
        }
    }
}

/// Prior cache configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub capacity: usize,
    pub ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: 1_024,
            ttl_secs: 300,
        }
    }
}

/// Telemetry configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    pub log_level: String,
    pub log_format: LogFormat,
    /// Prometheus listener port; metrics are not exported when unset
    pub metrics_port: Option<u16>,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_port: None,
        }
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid config value {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check ranges that serde cannot express
    pub fn validate(&self) -> Result<(), ConfigError> {
        let consensus = &self.consensus;
        if !(consensus.default_weight.is_finite() && consensus.default_weight >= 0.0) {
            return Err(invalid("consensus.default_weight", "must be non-negative"));
        }
        if !(consensus.single_source_cap > 0.0 && consensus.single_source_cap <= 0.5) {
            return Err(invalid("consensus.single_source_cap", "must be in (0, 0.5]"));
        }
        for book in &consensus.books {
            book.validate()
                .map_err(|reason| invalid("consensus.books", reason))?;
        }
        for baseline in &self.distribution.baselines {
            baseline
                .validate()
                .map_err(|e| invalid("distribution.baselines", e.to_string()))?;
        }
        if !(self.curve.step.is_finite() && self.curve.step > 0.0) {
            return Err(invalid("curve.step", "must be positive"));
        }
        if !(self.curve.padding.is_finite() && self.curve.padding >= 0.0) {
            return Err(invalid("curve.padding", "must be non-negative"));
        }
        if !(self.curve.non_monotonic_tolerance.is_finite()
            && self.curve.non_monotonic_tolerance >= 0.0)
        {
            return Err(invalid("curve.non_monotonic_tolerance", "must be non-negative"));
        }
        if self.curve.max_samples == 0 {
            return Err(invalid("curve.max_samples", "must be at least 1"));
        }
        if !(self.solver.tolerance.is_finite() && self.solver.tolerance > 0.0) {
            return Err(invalid("solver.tolerance", "must be positive"));
        }
        if self.solver.max_iterations == 0 {
            return Err(invalid("solver.max_iterations", "must be at least 1"));
        }
        if !(self.solver.derivative_step.is_finite() && self.solver.derivative_step > 0.0) {
            return Err(invalid("solver.derivative_step", "must be positive"));
        }
        if !(self.solver.probability_band > 0.0 && self.solver.probability_band < 0.5) {
            return Err(invalid("solver.probability_band", "must be in (0, 0.5)"));
        }
        if !(self.edge.kelly_multiplier >= 0.0 && self.edge.kelly_multiplier <= 1.0) {
            return Err(invalid("edge.kelly_multiplier", "must be in [0, 1]"));
        }
        if !(self.edge.kelly_cap >= 0.0 && self.edge.kelly_cap <= 1.0) {
            return Err(invalid("edge.kelly_cap", "must be in [0, 1]"));
        }
        let mc = &self.monte_carlo;
        if mc.default_simulations == 0 || mc.default_simulations > mc.max_simulations {
            return Err(invalid(
                "monte_carlo.default_simulations",
                "must be between 1 and max_simulations",
            ));
        }
        if mc.reservoir_size < 100 {
            return Err(invalid("monte_carlo.reservoir_size", "must be at least 100"));
        }
        if !(self.evidence.min_weight >= 0.0 && self.evidence.min_weight <= 1.0) {
            return Err(invalid("evidence.min_weight", "must be in [0, 1]"));
        }
        if !(self.evidence.max_age_hours.is_finite() && self.evidence.max_age_hours > 0.0) {
            return Err(invalid("evidence.max_age_hours", "must be positive"));
        }
        if !(self.evidence.half_life_hours.is_finite() && self.evidence.half_life_hours > 0.0) {
            return Err(invalid("evidence.half_life_hours", "must be positive"));
        }
        if !(self.evidence.min_sigma_ratio > 0.0 && self.evidence.min_sigma_ratio <= 1.0) {
            return Err(invalid("evidence.min_sigma_ratio", "must be in (0, 1]"));
        }
        if self.cache.capacity == 0 {
            return Err(invalid("cache.capacity", "must be at least 1"));
        }
        Ok(())
    }
}

/// Read-mostly configuration shared between concurrent requests
///
/// Readers take an `Arc` snapshot; writers swap in a whole new value so a reader
/// never observes a partial update.
#[derive(Debug)]
pub struct SharedConfig<T> {
    inner: RwLock<Arc<T>>,
}

impl<T> SharedConfig<T> {
    pub fn new(value: T) -> Self {
        Self {
            inner: RwLock::new(Arc::new(value)),
        }
    }

    /// Current value
    pub fn snapshot(&self) -> Arc<T> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replace the whole value
    pub fn replace(&self, value: T) {
        *self.inner.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(value);
    }
}
