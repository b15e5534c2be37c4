//! Predict command implementation

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use serde::Serialize;

use crate::config::Config;
use crate::curve::{CurveBuilder, LineRange};
use crate::distribution::{
    calculate_probability_over, DistributionParams, DistributionPredictor, PlayerFeatures, Sport,
};
use crate::solver::{FairLineSolver, FairMarketLine, SearchRange};

use super::{print_json, read_input};

/// Standard deviations either side of the mean scanned for the model fair line
const SCAN_SIGMAS: f64 = 4.0;

#[derive(Args, Debug)]
pub struct PredictArgs {
    #[arg(long)]
    pub player_id: String,

    /// nfl, nba, mlb or nhl
    #[arg(long)]
    pub sport: Sport,

    #[arg(long)]
    pub market: String,

    /// JSON player features file
    #[arg(long)]
    pub features: Option<PathBuf>,

    /// Line to report P(over) for
    #[arg(long, allow_negative_numbers = true)]
    pub line: Option<f64>,
}

#[derive(Serialize)]
struct PredictOutput {
    params: DistributionParams,
    mean: f64,
    std_dev: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    p_over: Option<f64>,
    fair_line: FairMarketLine,
}

impl PredictArgs {
    pub fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let features: PlayerFeatures = match &self.features {
            Some(path) => serde_json::from_str(&read_input(path)?).context("Invalid features file")?,
            None => PlayerFeatures::default(),
        };

        let predictor = DistributionPredictor::from_config(&config.distribution)?;
        let params =
            predictor.predict_player_outcome(&self.player_id, &self.market, &features, self.sport)?;
        let distribution = &params.distribution;
        let (mean, std_dev) = (distribution.mean(), distribution.std_dev());

        let step = config.curve.step;
        let min = ((mean - SCAN_SIGMAS * std_dev) / step).floor() * step;
        let max = ((mean + SCAN_SIGMAS * std_dev) / step).ceil() * step;
        let curve = CurveBuilder::with_config(config.curve.clone())
            .from_distribution(distribution, LineRange::new(min.max(0.0), max, step))?;
        let fair_line = FairLineSolver::with_config(config.solver.clone())
            .solve_fair_market_line(&curve, SearchRange::of(&curve));

        print_json(&PredictOutput {
            p_over: self.line.map(|line| calculate_probability_over(line, distribution)),
            mean,
            std_dev,
            fair_line,
            params,
        })
    }
}
