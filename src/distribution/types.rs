//! Distribution types

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use super::special::{ln_gamma, normal_sf};

/// Remaining PMF mass below which a tail sum stops
const TAIL_EPSILON: f64 = 1e-10;

/// Hard cap on summed PMF terms
const MAX_TAIL_TERMS: u64 = 100_000;

/// Sports with built-in market baselines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sport {
    Nfl,
    Nba,
    Mlb,
    Nhl,
}

impl fmt::Display for Sport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Sport::Nfl => "nfl",
            Sport::Nba => "nba",
            Sport::Mlb => "mlb",
            Sport::Nhl => "nhl",
        };
        f.write_str(name)
    }
}

impl FromStr for Sport {
    type Err = DistributionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "nfl" | "americanfootball_nfl" => Ok(Sport::Nfl),
            "nba" | "basketball_nba" => Ok(Sport::Nba),
            "mlb" | "baseball_mlb" => Ok(Sport::Mlb),
            "nhl" | "icehockey_nhl" => Ok(Sport::Nhl),
            _ => Err(DistributionError::UnknownSport(s.to_string())),
        }
    }
}

/// Distribution family chosen for a (sport, market) pairing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Family {
    Normal,
    LogNormal,
    Poisson,
    NegBinomial,
}

/// Parametric outcome distribution
///
/// `LogNormal` parameters describe the underlying normal of `ln X`.
/// `NegBinomial` counts failures before the `r`-th success with success probability `p`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "family", rename_all = "snake_case")]
pub enum Distribution {
    Normal { mu: f64, sigma: f64 },
    LogNormal { mu: f64, sigma: f64 },
    Poisson { lambda: f64 },
    NegBinomial { r: f64, p: f64 },
}

impl Distribution {
    /// Reject parameters that cannot describe a proper distribution
    pub fn validate(&self) -> Result<(), DistributionError> {
        let valid = match *self {
            Distribution::Normal { mu, sigma } | Distribution::LogNormal { mu, sigma } => {
                mu.is_finite() && sigma.is_finite() && sigma > 0.0
            }
            Distribution::Poisson { lambda } => lambda.is_finite() && lambda > 0.0,
            Distribution::NegBinomial { r, p } => {
                r.is_finite() && r > 0.0 && p.is_finite() && p > 0.0 && p < 1.0
            }
        };
        if valid {
            Ok(())
        } else {
            Err(DistributionError::Degenerate(*self))
        }
    }

    pub fn family(&self) -> Family {
        match self {
            Distribution::Normal { .. } => Family::Normal,
            Distribution::LogNormal { .. } => Family::LogNormal,
            Distribution::Poisson { .. } => Family::Poisson,
            Distribution::NegBinomial { .. } => Family::NegBinomial,
        }
    }

    pub fn mean(&self) -> f64 {
        match *self {
            Distribution::Normal { mu, .. } => mu,
            Distribution::LogNormal { mu, sigma } => (mu + 0.5 * sigma * sigma).exp(),
            Distribution::Poisson { lambda } => lambda,
            Distribution::NegBinomial { r, p } => r * (1.0 - p) / p,
        }
    }

    pub fn std_dev(&self) -> f64 {
        match *self {
            Distribution::Normal { sigma, .. } => sigma,
            Distribution::LogNormal { mu, sigma } => {
                let s2 = sigma * sigma;
                ((s2.exp() - 1.0) * (2.0 * mu + s2).exp()).sqrt()
            }
            Distribution::Poisson { lambda } => lambda.sqrt(),
            Distribution::NegBinomial { r, p } => (r * (1.0 - p)).sqrt() / p,
        }
    }

    /// Probability that the outcome strictly exceeds `line`
    pub fn probability_over(&self, line: f64) -> f64 {
        let prob = match *self {
            Distribution::Normal { mu, sigma } => normal_sf((line - mu) / sigma),
            Distribution::LogNormal { mu, sigma } => {
                if line <= 0.0 {
                    1.0
                } else {
                    normal_sf((line.ln() - mu) / sigma)
                }
            }
            Distribution::Poisson { lambda } => discrete_over(line, self.mean(), |k| {
                (k * lambda.ln() - lambda - ln_gamma(k + 1.0)).exp()
            }),
            Distribution::NegBinomial { r, p } => discrete_over(line, self.mean(), |k| {
                (ln_gamma(k + r) - ln_gamma(k + 1.0) - ln_gamma(r)
                    + r * p.ln()
                    + k * (1.0 - p).ln())
                .exp()
            }),
        };
        prob.clamp(0.0, 1.0)
    }
}

/// P(X > line) for a count distribution given its PMF
///
/// Below the mean the complement of the (short) lower sum is used; above it the upper
/// tail is summed until the remaining terms are negligible.
fn discrete_over(line: f64, mean: f64, pmf: impl Fn(f64) -> f64) -> f64 {
    if line < 0.0 {
        return 1.0;
    }
    let first_over = line.floor() + 1.0;

    if first_over <= mean {
        let mut cdf = 0.0;
        let mut k = 0.0;
        while k < first_over {
            cdf += pmf(k);
            k += 1.0;
        }
        return 1.0 - cdf;
    }

    let mut tail = 0.0;
    let mut k = first_over;
    for _ in 0..MAX_TAIL_TERMS {
        let term = pmf(k);
        tail += term;
        if term < TAIL_EPSILON {
            break;
        }
        k += 1.0;
    }
    tail
}

/// Player features feeding the predictor; `None` means neutral
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerFeatures {
    /// Player's season average for the market (replaces the league baseline mean)
    pub season_average: Option<f64>,
    /// Share of team opportunities used by the player
    pub usage_rate: Option<f64>,
    /// Expected possessions or plays
    pub pace: Option<f64>,
    /// Opponent defensive rating, 1.0 = league average, above 1.0 = softer
    pub opponent_defense: Option<f64>,
    /// Playing at home
    pub is_home: Option<bool>,
    /// Days of rest before the event
    pub rest_days: Option<f64>,
    /// Recent average divided by season average
    pub recent_form: Option<f64>,
    /// Probability the player is limited by injury
    pub injury_probability: Option<f64>,
}

/// Multiplicative nudge applied by a single feature
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureAdjustment {
    pub feature: String,
    pub factor: f64,
}

/// Predicted outcome distribution for a player/market
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionParams {
    pub player_id: String,
    pub market: String,
    pub sport: Sport,
    pub distribution: Distribution,
    /// Features that moved mu, in application order
    pub adjustments: Vec<FeatureAdjustment>,
}

/// Distribution errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DistributionError {
    /// Parameters do not describe a proper distribution
    #[error("Degenerate distribution: {0:?}")]
    Degenerate(Distribution),
    /// No baseline is configured for the pairing
    #[error("No baseline for {sport} market '{market}'")]
    UnknownMarket { sport: Sport, market: String },
    /// Sport key not recognised
    #[error("Unknown sport: {0}")]
    UnknownSport(String),
    /// Baseline values are unusable
    #[error("Invalid baseline for {sport} market '{market}': {reason}")]
    InvalidBaseline {
        sport: Sport,
        market: String,
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_float_eq::*;

    #[test]
    fn test_normal_probability_over() {
        let dist = Distribution::Normal {
            mu: 25.0,
            sigma: 5.0,
        };
        assert_float_absolute_eq!(0.5, dist.probability_over(25.0), 1e-7);
        assert_float_absolute_eq!(0.158_655_254, dist.probability_over(30.0), 1e-7);
        assert!(dist.probability_over(20.0) > 0.84);
    }

    #[test]
    fn test_lognormal_probability_over() {
        let dist = Distribution::LogNormal {
            mu: 4.0,
            sigma: 0.5,
        };
        // median of a log-normal is exp(mu)
        assert_float_absolute_eq!(0.5, dist.probability_over(4f64.exp()), 1e-7);
        assert_eq!(1.0, dist.probability_over(0.0));
        assert_eq!(1.0, dist.probability_over(-3.0));
    }

    #[test]
    fn test_poisson_probability_over() {
        let dist = Distribution::Poisson { lambda: 1.5 };
        let p0 = (-1.5f64).exp();
        // P(X > 0.5) = 1 - P(0)
        assert_float_absolute_eq!(1.0 - p0, dist.probability_over(0.5), 1e-9);
        // P(X > 1) = 1 - P(0) - P(1); integer lines are strict
        assert_float_absolute_eq!(1.0 - p0 - 1.5 * p0, dist.probability_over(1.0), 1e-9);
        assert_float_absolute_eq!(1.0 - p0 - 1.5 * p0, dist.probability_over(1.5), 1e-9);
        assert_eq!(1.0, dist.probability_over(-0.5));
    }

    #[test]
    fn test_poisson_far_tail() {
        let dist = Distribution::Poisson { lambda: 2.0 };
        let tail = dist.probability_over(12.5);
        assert!(tail > 0.0 && tail < 1e-6);
    }

    #[test]
    fn test_neg_binomial_probability_over() {
        // r = 1 is geometric: P(X > k) = (1 - p)^(k + 1)
        let dist = Distribution::NegBinomial { r: 1.0, p: 0.4 };
        assert_float_absolute_eq!(0.6f64.powi(3), dist.probability_over(2.5), 1e-8);
        assert_float_absolute_eq!(0.6f64.powi(6), dist.probability_over(5.0), 1e-8);
    }

    #[test]
    fn test_moments() {
        let nb = Distribution::NegBinomial { r: 4.0, p: 0.5 };
        assert_float_absolute_eq!(4.0, nb.mean(), 1e-12);
        assert_float_absolute_eq!(8f64.sqrt(), nb.std_dev(), 1e-12);

        let ln = Distribution::LogNormal {
            mu: 0.0,
            sigma: 1.0,
        };
        assert_float_absolute_eq!(0.5f64.exp(), ln.mean(), 1e-12);
    }

    #[test]
    fn test_validate_rejects_degenerate() {
        assert!(Distribution::Normal {
            mu: 10.0,
            sigma: 0.0
        }
        .validate()
        .is_err());
        assert!(Distribution::Poisson { lambda: -1.0 }.validate().is_err());
        assert!(Distribution::NegBinomial { r: 2.0, p: 1.0 }.validate().is_err());
        assert!(Distribution::LogNormal {
            mu: f64::NAN,
            sigma: 1.0
        }
        .validate()
        .is_err());
        assert!(Distribution::Poisson { lambda: 2.0 }.validate().is_ok());
    }

    #[test]
    fn test_sport_parse() {
        assert_eq!(Sport::Nfl, "NFL".parse().unwrap());
        assert_eq!(Sport::Nba, "basketball_nba".parse().unwrap());
        assert!("cricket".parse::<Sport>().is_err());
    }

    #[test]
    fn test_distribution_serde_tagged() {
        let json = serde_json::to_string(&Distribution::Poisson { lambda: 2.0 }).unwrap();
        assert_eq!(r#"{"family":"poisson","lambda":2.0}"#, json);
    }
}
