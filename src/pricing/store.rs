//! Prior storage seam

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::distribution::normalise_market;
use crate::montecarlo::{PlayerPrior, PricingError};

/// Source of player priors
#[async_trait]
pub trait PriorStore: Send + Sync {
    /// Prior for a player and market, `None` when unknown
    async fn get_prior(&self, player_id: &str, market: &str) -> Result<Option<PlayerPrior>, PricingError>;
}

/// Lookup key: lowercase player id and normalised market
pub fn prior_key(player_id: &str, market: &str) -> (String, String) {
    (player_id.to_ascii_lowercase(), normalise_market(market))
}

/// Priors held in memory
#[derive(Default)]
pub struct InMemoryPriorStore {
    priors: RwLock<HashMap<(String, String), PlayerPrior>>,
}

impl InMemoryPriorStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded with `priors`; later entries replace earlier ones
    pub fn with_priors(priors: impl IntoIterator<Item = PlayerPrior>) -> Self {
        let map = priors
            .into_iter()
            .map(|p| (prior_key(&p.player_id, &p.market), p))
            .collect();
        Self {
            priors: RwLock::new(map),
        }
    }

    pub async fn insert(&self, prior: PlayerPrior) {
        let key = prior_key(&prior.player_id, &prior.market);
        self.priors.write().await.insert(key, prior);
    }

    pub async fn len(&self) -> usize {
        self.priors.read().await.len()
    }
}

#[async_trait]
impl PriorStore for InMemoryPriorStore {
    async fn get_prior(&self, player_id: &str, market: &str) -> Result<Option<PlayerPrior>, PricingError> {
        let priors = self.priors.read().await;
        Ok(priors.get(&prior_key(player_id, market)).cloned())
    }
}
