//! Player outcome predictor
//!
//! Starts from a league baseline for the (sport, market) pairing and nudges the
//! mean by each present feature. Absent features leave the baseline untouched.

use serde::{Deserialize, Serialize};

use crate::config::{DistributionConfig, SharedConfig};

use super::baseline::{BaselineTable, MarketBaseline};
use super::{
    Distribution, DistributionError, DistributionParams, Family, FeatureAdjustment,
    PlayerFeatures, Sport,
};

/// Smallest mean handed to a family constructor
const MIN_MEAN: f64 = 1e-6;

/// Sensitivity coefficients for each feature
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureSensitivity {
    /// Usage rate producing no adjustment
    pub neutral_usage: f64,
    /// mu scales with (usage / neutral)^elasticity
    pub usage_elasticity: f64,
    pub neutral_pace: f64,
    pub pace_elasticity: f64,
    /// mu scales with rating^elasticity
    pub defense_elasticity: f64,
    /// Fractional boost at home, penalty away
    pub home_advantage: f64,
    pub neutral_rest_days: f64,
    pub max_rest_days: f64,
    pub rest_per_day: f64,
    /// Share of the recent-form deviation that is trusted
    pub form_weight: f64,
    /// mu is scaled by (1 - penalty * injury_probability)
    pub injury_mu_penalty: f64,
    /// spread is scaled by (1 + inflation * injury_probability)
    pub injury_sigma_inflation: f64,
}

impl Default for FeatureSensitivity {
    fn default() -> Self {
        Self {
            neutral_usage: 0.20,
            usage_elasticity: 1.0,
            neutral_pace: 100.0,
            pace_elasticity: 0.8,
            defense_elasticity: 0.6,
            home_advantage: 0.02,
            neutral_rest_days: 2.0,
            max_rest_days: 4.0,
            rest_per_day: 0.01,
            form_weight: 0.3,
            injury_mu_penalty: 0.5,
            injury_sigma_inflation: 0.5,
        }
    }
}

/// Maps player features to a parametric outcome distribution
pub struct DistributionPredictor {
    baselines: SharedConfig<BaselineTable>,
    sensitivity: FeatureSensitivity,
}

impl DistributionPredictor {
    /// Create a predictor over the built-in baselines
    pub fn new() -> Self {
        Self {
            baselines: SharedConfig::new(BaselineTable::default()),
            sensitivity: FeatureSensitivity::default(),
        }
    }

    /// Create from DistributionConfig
    pub fn from_config(config: &DistributionConfig) -> Result<Self, DistributionError> {
        Ok(Self {
            baselines: SharedConfig::new(BaselineTable::with_overrides(&config.baselines)?),
            sensitivity: config.sensitivity.clone(),
        })
    }

    /// Swap in a new baseline table; in-flight predictions keep their snapshot
    pub fn replace_baselines(&self, table: BaselineTable) {
        self.baselines.replace(table);
    }

    /// Predict the outcome distribution for a player in a market
    pub fn predict_player_outcome(
        &self,
        player_id: &str,
        market: &str,
        features: &PlayerFeatures,
        sport: Sport,
    ) -> Result<DistributionParams, DistributionError> {
        let table = self.baselines.snapshot();
        let baseline = table
            .get(sport, market)
            .ok_or_else(|| DistributionError::UnknownMarket {
                sport,
                market: market.to_string(),
            })?;

        let mut adjustments = Vec::new();
        let mut mu = positive(features.season_average).unwrap_or(baseline.mean);
        let mut spread_scale = 1.0;
        let s = &self.sensitivity;

        let mut nudge = |feature: &str, factor: f64, mu: &mut f64| {
            if factor.is_finite() && factor > 0.0 {
                *mu *= factor;
                adjustments.push(FeatureAdjustment {
                    feature: feature.to_string(),
                    factor,
                });
            }
        };

        if let Some(usage) = positive(features.usage_rate) {
            nudge(
                "usage_rate",
                (usage / s.neutral_usage).powf(s.usage_elasticity),
                &mut mu,
            );
        }
        if let Some(pace) = positive(features.pace) {
            nudge(
                "pace",
                (pace / s.neutral_pace).powf(s.pace_elasticity),
                &mut mu,
            );
        }
        if let Some(rating) = positive(features.opponent_defense) {
            nudge(
                "opponent_defense",
                rating.powf(s.defense_elasticity),
                &mut mu,
            );
        }
        if let Some(is_home) = features.is_home {
            let factor = if is_home {
                1.0 + s.home_advantage
            } else {
                1.0 - s.home_advantage
            };
            nudge("is_home", factor, &mut mu);
        }
        if let Some(rest) = features.rest_days.filter(|r| r.is_finite() && *r >= 0.0) {
            let days = rest.min(s.max_rest_days) - s.neutral_rest_days;
            nudge("rest_days", 1.0 + days * s.rest_per_day, &mut mu);
        }
        if let Some(form) = positive(features.recent_form) {
            nudge("recent_form", 1.0 + s.form_weight * (form - 1.0), &mut mu);
        }
        if let Some(injury) = features.injury_probability.filter(|p| p.is_finite()) {
            let injury = injury.clamp(0.0, 1.0);
            nudge(
                "injury_probability",
                1.0 - s.injury_mu_penalty * injury,
                &mut mu,
            );
            spread_scale *= 1.0 + s.injury_sigma_inflation * injury;
        }

        let distribution = shape(baseline, mu.max(MIN_MEAN), spread_scale);
        distribution.validate()?;

        tracing::debug!(
            player_id,
            market,
            %sport,
            family = ?distribution.family(),
            mean = distribution.mean(),
            std_dev = distribution.std_dev(),
            adjustments = adjustments.len(),
            "Predicted player outcome"
        );

        Ok(DistributionParams {
            player_id: player_id.to_string(),
            market: market.to_string(),
            sport,
            distribution,
            adjustments,
        })
    }
}

impl Default for DistributionPredictor {
    fn default() -> Self {
        Self::new()
    }
}

/// Upper-tail probability of the predicted distribution above a line
pub fn calculate_probability_over(line: f64, distribution: &Distribution) -> f64 {
    distribution.probability_over(line)
}

fn positive(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite() && *v > 0.0)
}

/// Build the family's parameters for a target mean, keeping the baseline's shape
fn shape(baseline: &MarketBaseline, mu: f64, spread_scale: f64) -> Distribution {
    match baseline.family {
        Family::Normal => Distribution::Normal {
            mu,
            sigma: mu * baseline.cv() * spread_scale,
        },
        Family::LogNormal => {
            let sd = mu * baseline.cv() * spread_scale;
            let log_var = (1.0 + (sd * sd) / (mu * mu)).ln();
            Distribution::LogNormal {
                mu: mu.ln() - 0.5 * log_var,
                sigma: log_var.sqrt(),
            }
        }
        Family::Poisson => count_model(mu, mu * spread_scale * spread_scale),
        Family::NegBinomial => {
            let base_var = baseline.std_dev * baseline.std_dev;
            if base_var <= baseline.mean {
                return count_model(mu, mu * spread_scale * spread_scale);
            }
            // dispersion k is held fixed so variance grows as mu + mu^2 / k
            let k = baseline.mean * baseline.mean / (base_var - baseline.mean);
            count_model(mu, (mu + mu * mu / k) * spread_scale * spread_scale)
        }
    }
}

/// Poisson when variance equals the mean, negative binomial when overdispersed
fn count_model(mean: f64, variance: f64) -> Distribution {
    if variance <= mean * (1.0 + 1e-9) {
        Distribution::Poisson { lambda: mean }
    } else {
        Distribution::NegBinomial {
            r: mean * mean / (variance - mean),
            p: mean / variance,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_float_eq::*;

    fn predictor() -> DistributionPredictor {
        DistributionPredictor::new()
    }

    #[test]
    fn test_missing_features_are_neutral() {
        let params = predictor()
            .predict_player_outcome("qb1", "passing_yards", &PlayerFeatures::default(), Sport::Nfl)
            .unwrap();
        assert!(params.adjustments.is_empty());
        assert_eq!(
            Distribution::Normal {
                mu: 235.0,
                sigma: 60.0
            },
            params.distribution
        );
    }

    #[test]
    fn test_season_average_replaces_baseline_mean() {
        let features = PlayerFeatures {
            season_average: Some(280.0),
            ..Default::default()
        };
        let params = predictor()
            .predict_player_outcome("qb1", "passing_yards", &features, Sport::Nfl)
            .unwrap();
        assert_float_absolute_eq!(280.0, params.distribution.mean(), 1e-9);
        // spread follows the baseline coefficient of variation
        assert_float_absolute_eq!(280.0 * 60.0 / 235.0, params.distribution.std_dev(), 1e-9);
    }

    #[test]
    fn test_usage_rate_scales_mu_proportionally() {
        let features = PlayerFeatures {
            usage_rate: Some(0.30),
            ..Default::default()
        };
        let params = predictor()
            .predict_player_outcome("p1", "points", &features, Sport::Nba)
            .unwrap();
        assert_float_absolute_eq!(18.0 * 1.5, params.distribution.mean(), 1e-9);
        assert_eq!("usage_rate", params.adjustments[0].feature);
    }

    #[test]
    fn test_injury_suppresses_mu_and_widens_spread() {
        let healthy = predictor()
            .predict_player_outcome("p1", "points", &PlayerFeatures::default(), Sport::Nba)
            .unwrap()
            .distribution;
        let features = PlayerFeatures {
            injury_probability: Some(0.4),
            ..Default::default()
        };
        let injured = predictor()
            .predict_player_outcome("p1", "points", &features, Sport::Nba)
            .unwrap()
            .distribution;
        assert!(injured.mean() < healthy.mean());
        let healthy_cv = healthy.std_dev() / healthy.mean();
        let injured_cv = injured.std_dev() / injured.mean();
        assert!(injured_cv > healthy_cv);
    }

    #[test]
    fn test_injury_turns_poisson_overdispersed() {
        let features = PlayerFeatures {
            injury_probability: Some(0.5),
            ..Default::default()
        };
        let params = predictor()
            .predict_player_outcome("p1", "strikeouts", &features, Sport::Mlb)
            .unwrap();
        assert_eq!(Family::NegBinomial, params.distribution.family());
        assert_float_absolute_eq!(5.5 * 0.75, params.distribution.mean(), 1e-9);
    }

    #[test]
    fn test_poisson_market_without_adjustments() {
        let params = predictor()
            .predict_player_outcome("p1", "strikeouts", &PlayerFeatures::default(), Sport::Mlb)
            .unwrap();
        assert_eq!(Distribution::Poisson { lambda: 5.5 }, params.distribution);
    }

    #[test]
    fn test_neg_binomial_matches_baseline_moments() {
        let params = predictor()
            .predict_player_outcome("p1", "rebounds", &PlayerFeatures::default(), Sport::Nba)
            .unwrap();
        assert_eq!(Family::NegBinomial, params.distribution.family());
        assert_float_absolute_eq!(6.5, params.distribution.mean(), 1e-9);
        assert_float_absolute_eq!(3.2, params.distribution.std_dev(), 1e-9);
    }

    #[test]
    fn test_lognormal_matches_baseline_moments() {
        let params = predictor()
            .predict_player_outcome("rb1", "rushing_yards", &PlayerFeatures::default(), Sport::Nfl)
            .unwrap();
        assert_eq!(Family::LogNormal, params.distribution.family());
        assert_float_absolute_eq!(55.0, params.distribution.mean(), 1e-9);
        assert_float_absolute_eq!(30.0, params.distribution.std_dev(), 1e-9);
    }

    #[test]
    fn test_invalid_features_ignored() {
        let features = PlayerFeatures {
            usage_rate: Some(f64::NAN),
            pace: Some(-3.0),
            ..Default::default()
        };
        let params = predictor()
            .predict_player_outcome("p1", "points", &features, Sport::Nba)
            .unwrap();
        assert!(params.adjustments.is_empty());
    }

    #[test]
    fn test_unknown_market() {
        let result = predictor().predict_player_outcome(
            "p1",
            "passing_yards",
            &PlayerFeatures::default(),
            Sport::Nhl,
        );
        assert!(matches!(
            result,
            Err(DistributionError::UnknownMarket { .. })
        ));
    }

    #[test]
    fn test_replace_baselines() {
        let predictor = predictor();
        let mut table = BaselineTable::new();
        table
            .insert(MarketBaseline::new(Sport::Nhl, "hits", Family::Poisson, 2.0, 1.4))
            .unwrap();
        predictor.replace_baselines(table);
        assert!(predictor
            .predict_player_outcome("p1", "hits", &PlayerFeatures::default(), Sport::Nhl)
            .is_ok());
        assert!(predictor
            .predict_player_outcome("p1", "points", &PlayerFeatures::default(), Sport::Nba)
            .is_err());
    }

    #[test]
    fn test_probability_over_through_prediction() {
        let params = predictor()
            .predict_player_outcome("qb1", "passing_yards", &PlayerFeatures::default(), Sport::Nfl)
            .unwrap();
        let p = calculate_probability_over(235.0, &params.distribution);
        assert_float_absolute_eq!(0.5, p, 1e-6);
        assert!(calculate_probability_over(260.5, &params.distribution) < 0.5);
    }
}
