//! League/market baselines

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::{DistributionError, Family, Sport};

/// Baseline outcome for an average player in a (sport, market) pairing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketBaseline {
    pub sport: Sport,
    pub market: String,
    pub family: Family,
    pub mean: f64,
    pub std_dev: f64,
}

impl MarketBaseline {
    pub fn new(sport: Sport, market: &str, family: Family, mean: f64, std_dev: f64) -> Self {
        Self {
            sport,
            market: market.to_string(),
            family,
            mean,
            std_dev,
        }
    }

    pub fn validate(&self) -> Result<(), DistributionError> {
        let reason = if !(self.mean.is_finite() && self.mean > 0.0) {
            Some("mean must be positive")
        } else if !(self.std_dev.is_finite() && self.std_dev > 0.0) {
            Some("std_dev must be positive")
        } else {
            None
        };
        match reason {
            Some(reason) => Err(DistributionError::InvalidBaseline {
                sport: self.sport,
                market: self.market.clone(),
                reason: reason.to_string(),
            }),
            None => Ok(()),
        }
    }

    /// Coefficient of variation
    pub fn cv(&self) -> f64 {
        self.std_dev / self.mean
    }
}

/// Baselines keyed by sport and normalised market key
#[derive(Debug, Clone)]
pub struct BaselineTable {
    entries: HashMap<(Sport, String), MarketBaseline>,
}

impl BaselineTable {
    /// Empty table
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Built-in baselines, overridden by any configured entries
    pub fn with_overrides(overrides: &[MarketBaseline]) -> Result<Self, DistributionError> {
        let mut table = Self::default();
        for baseline in overrides {
            table.insert(baseline.clone())?;
        }
        Ok(table)
    }

    pub fn insert(&mut self, baseline: MarketBaseline) -> Result<(), DistributionError> {
        baseline.validate()?;
        self.entries
            .insert((baseline.sport, normalise_market(&baseline.market)), baseline);
        Ok(())
    }

    pub fn get(&self, sport: Sport, market: &str) -> Option<&MarketBaseline> {
        self.entries.get(&(sport, normalise_market(market)))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for BaselineTable {
    fn default() -> Self {
        use Family::*;
        use Sport::*;

        let defaults = [
            MarketBaseline::new(Nfl, "passing_yards", Normal, 235.0, 60.0),
            MarketBaseline::new(Nfl, "rushing_yards", LogNormal, 55.0, 30.0),
            MarketBaseline::new(Nfl, "receiving_yards", LogNormal, 50.0, 28.0),
            MarketBaseline::new(Nfl, "receptions", Poisson, 4.5, 2.1),
            MarketBaseline::new(Nfl, "passing_tds", Poisson, 1.6, 1.26),
            MarketBaseline::new(Nfl, "interceptions", Poisson, 0.8, 0.9),
            MarketBaseline::new(Nfl, "rushing_attempts", NegBinomial, 14.0, 5.0),
            MarketBaseline::new(Nfl, "anytime_td", Poisson, 0.5, 0.7),
            MarketBaseline::new(Nba, "points", Normal, 18.0, 6.5),
            MarketBaseline::new(Nba, "rebounds", NegBinomial, 6.5, 3.2),
            MarketBaseline::new(Nba, "assists", NegBinomial, 4.5, 2.6),
            MarketBaseline::new(Nba, "threes_made", Poisson, 2.1, 1.45),
            MarketBaseline::new(Nba, "steals", Poisson, 1.0, 1.0),
            MarketBaseline::new(Nba, "points_rebounds_assists", Normal, 30.0, 8.0),
            MarketBaseline::new(Mlb, "strikeouts", Poisson, 5.5, 2.35),
            MarketBaseline::new(Mlb, "hits", Poisson, 1.0, 1.0),
            MarketBaseline::new(Mlb, "total_bases", NegBinomial, 1.5, 1.4),
            MarketBaseline::new(Mlb, "runs", Poisson, 0.6, 0.77),
            MarketBaseline::new(Nhl, "shots_on_goal", Poisson, 2.6, 1.6),
            MarketBaseline::new(Nhl, "goals", Poisson, 0.35, 0.6),
            MarketBaseline::new(Nhl, "points", Poisson, 0.7, 0.85),
            MarketBaseline::new(Nhl, "saves", Normal, 27.0, 6.0),
        ];

        let entries = defaults
            .into_iter()
            .map(|b| ((b.sport, normalise_market(&b.market)), b))
            .collect();
        Self { entries }
    }
}

/// Market keys are matched case-insensitively with `player_` prefixes and dashes ignored
pub fn normalise_market(market: &str) -> String {
    let lower = market.trim().to_ascii_lowercase().replace(['-', ' '], "_");
    lower
        .strip_prefix("player_")
        .map(str::to_string)
        .unwrap_or(lower)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table_lookup() {
        let table = BaselineTable::default();
        let baseline = table.get(Sport::Nfl, "passing_yards").unwrap();
        assert_eq!(Family::Normal, baseline.family);
        assert!(table.get(Sport::Nba, "Player-Points").is_some());
        assert!(table.get(Sport::Nba, "passing_yards").is_none());
    }

    #[test]
    fn test_overrides_replace_defaults() {
        let table = BaselineTable::with_overrides(&[MarketBaseline::new(
            Sport::Nfl,
            "passing_yards",
            Family::LogNormal,
            250.0,
            70.0,
        )])
        .unwrap();
        let baseline = table.get(Sport::Nfl, "passing_yards").unwrap();
        assert_eq!(Family::LogNormal, baseline.family);
        assert_eq!(250.0, baseline.mean);
    }

    #[test]
    fn test_invalid_baseline_rejected() {
        let mut table = BaselineTable::new();
        let result = table.insert(MarketBaseline::new(Sport::Mlb, "hits", Family::Poisson, 0.0, 1.0));
        assert!(matches!(
            result,
            Err(DistributionError::InvalidBaseline { .. })
        ));
    }

    #[test]
    fn test_normalise_market() {
        assert_eq!("passing_yards", normalise_market("player_passing_yards"));
        assert_eq!("shots_on_goal", normalise_market(" Shots-On-Goal "));
    }
}
