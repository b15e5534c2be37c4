//! Analyze and batch command implementations

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Args;
use tokio::task::JoinSet;

use crate::analysis::{BatchAnalysis, MarketAnalyzer, MarketInput};
use crate::config::Config;
use crate::montecarlo::PlayerPrior;

use super::{print_json, read_input};

#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// JSON market file, or - for stdin
    #[arg(long, default_value = "-")]
    pub input: PathBuf,

    /// Prior mean used when no book is usable
    #[arg(long, requires = "prior_sigma")]
    pub prior_mu: Option<f64>,

    /// Prior standard deviation
    #[arg(long, requires = "prior_mu")]
    pub prior_sigma: Option<f64>,
}

impl AnalyzeArgs {
    pub fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let input: MarketInput = serde_json::from_str(&read_input(&self.input)?)
            .context("Invalid market input")?;
        let prior = match (self.prior_mu, self.prior_sigma) {
            (Some(mu), Some(sigma)) => Some(PlayerPrior::new(
                input.player_id.clone(),
                input.market.clone(),
                mu,
                sigma,
            )),
            _ => None,
        };

        let analyzer = MarketAnalyzer::from_config(config);
        print_json(&analyzer.analyze(&input, prior.as_ref()))
    }
}

#[derive(Args, Debug)]
pub struct BatchArgs {
    /// JSON array of markets, or - for stdin
    #[arg(long, default_value = "-")]
    pub input: PathBuf,
}

impl BatchArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let inputs: Vec<MarketInput> = serde_json::from_str(&read_input(&self.input)?)
            .context("Invalid batch input")?;
        let analyzer = Arc::new(MarketAnalyzer::from_config(config));
        tracing::info!(markets = inputs.len(), "Analysing batch");

        // analyses are CPU-bound; keep them off the async workers
        let mut tasks = JoinSet::new();
        for (index, input) in inputs.into_iter().enumerate() {
            let analyzer = Arc::clone(&analyzer);
            tasks.spawn_blocking(move || (index, analyzer.analyze(&input, None)));
        }

        let mut results = Vec::with_capacity(tasks.len());
        while let Some(joined) = tasks.join_next().await {
            results.push(joined.context("Analysis task failed")?);
        }
        results.sort_by_key(|(index, _)| *index);

        let batch = BatchAnalysis::from_results(
            results.into_iter().map(|(_, analysis)| analysis).collect(),
            analyzer.min_edge(),
        );
        print_json(&batch)
    }
}
