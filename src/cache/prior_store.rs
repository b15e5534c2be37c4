//! Caching decorator for a prior store

use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use async_trait::async_trait;

use crate::config::CacheConfig;
use crate::montecarlo::{PlayerPrior, PricingError};
use crate::pricing::{prior_key, PriorStore};

use super::TtlCache;

/// Serves recent priors from memory before asking the wrapped store
///
/// Only hits are cached; an unknown prior is looked up again next time.
pub struct CachedPriorStore<S> {
    inner: S,
    cache: Mutex<TtlCache<(String, String), PlayerPrior>>,
}

impl<S: PriorStore> CachedPriorStore<S> {
    pub fn new(inner: S, config: &CacheConfig) -> Self {
        Self {
            inner,
            cache: Mutex::new(TtlCache::new(
                config.capacity,
                Duration::from_secs(config.ttl_secs),
            )),
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Drop every cached prior
    pub fn invalidate_all(&self) {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner).clear();
    }
}

#[async_trait]
impl<S: PriorStore> PriorStore for CachedPriorStore<S> {
    async fn get_prior(&self, player_id: &str, market: &str) -> Result<Option<PlayerPrior>, PricingError> {
        let key = prior_key(player_id, market);
        let cached = self
            .cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key, Instant::now());
        if let Some(prior) = cached {
            tracing::trace!(player_id, market, "Prior cache hit");
            return Ok(Some(prior));
        }

        let prior = self.inner.get_prior(player_id, market).await?;
        if let Some(prior) = &prior {
            self.cache
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .insert(key, prior.clone(), Instant::now());
        }
        Ok(prior)
    }
}
