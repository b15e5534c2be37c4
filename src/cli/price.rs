//! Price command implementation

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;

use crate::cache::CachedPriorStore;
use crate::config::Config;
use crate::montecarlo::{Evidence, MonteCarloEngine, PlayerPrior};
use crate::pricing::{InMemoryPriorStore, PricingRequest, PricingService};

use super::{print_json, read_input};

#[derive(Args, Debug)]
pub struct PriceArgs {
    #[arg(long)]
    pub player_id: String,

    #[arg(long)]
    pub market: String,

    /// Market line to price against
    #[arg(long, allow_negative_numbers = true)]
    pub line: f64,

    /// JSON array of priors to look the player up in
    #[arg(long)]
    pub priors: Option<PathBuf>,

    /// Prior mean, used instead of --priors
    #[arg(long, requires = "sigma", conflicts_with = "priors")]
    pub mu: Option<f64>,

    /// Prior standard deviation
    #[arg(long, requires = "mu")]
    pub sigma: Option<f64>,

    /// JSON array of evidence items
    #[arg(long)]
    pub evidence: Option<PathBuf>,

    /// Number of draws; defaults to the configured count
    #[arg(long)]
    pub simulations: Option<usize>,

    /// Seed for a reproducible run
    #[arg(long)]
    pub seed: Option<u64>,
}

impl PriceArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let priors: Vec<PlayerPrior> = match (&self.priors, self.mu, self.sigma) {
            (Some(path), _, _) => {
                serde_json::from_str(&read_input(path)?).context("Invalid priors file")?
            }
            (None, Some(mu), Some(sigma)) => {
                vec![PlayerPrior::new(self.player_id.clone(), self.market.clone(), mu, sigma)]
            }
            _ => anyhow::bail!("Either --priors or --mu and --sigma are required"),
        };
        let evidence: Vec<Evidence> = match &self.evidence {
            Some(path) => serde_json::from_str(&read_input(path)?).context("Invalid evidence file")?,
            None => Vec::new(),
        };

        let mut mc_config = config.monte_carlo.clone();
        if self.seed.is_some() {
            mc_config.seed = self.seed;
        }
        let engine = MonteCarloEngine::with_config(mc_config, config.evidence.clone());
        let store = CachedPriorStore::new(InMemoryPriorStore::with_priors(priors), &config.cache);
        let service = PricingService::new(store, engine);

        let mut request = PricingRequest::new(self.player_id.clone(), self.market.clone(), self.line);
        request.simulations = self.simulations;
        let response = service.price(&request, &evidence).await?;
        print_json(&response)
    }
}
