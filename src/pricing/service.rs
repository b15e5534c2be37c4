//! Single-prior pricing service

use std::sync::Arc;
use std::time::Instant;

use crate::montecarlo::{Evidence, MonteCarloEngine, MonteCarloRequest, PricingError};
use crate::telemetry::{record_latency, LatencyMetric};

use super::{PriorStore, PricingRequest, PricingResponse};

/// Resolves a prior and prices it with the Monte Carlo engine
pub struct PricingService<S> {
    store: S,
    engine: Arc<MonteCarloEngine>,
}

impl<S: PriorStore> PricingService<S> {
    pub fn new(store: S, engine: MonteCarloEngine) -> Self {
        Self {
            store,
            engine: Arc::new(engine),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn engine(&self) -> &MonteCarloEngine {
        &self.engine
    }

    /// Price a request against its stored prior
    ///
    /// Sampling runs on the blocking pool.
    ///
    /// A missing or non-numeric line and an unknown (player, market) both yield
    /// `NotFound`; a degenerate prior yields `PriorInvalid`.
    pub async fn price(
        &self,
        request: &PricingRequest,
        evidence: &[Evidence],
    ) -> Result<PricingResponse, PricingError> {
        let start = Instant::now();
        let market_line = request.market_line()?;
        let prior = self
            .store
            .get_prior(&request.player_id, &request.market)
            .await?
            .ok_or_else(|| {
                PricingError::NotFound(format!(
                    "no prior for player {} market {}",
                    request.player_id, request.market
                ))
            })?;

        let mc_request = MonteCarloRequest {
            market_line,
            prior,
            evidence: evidence.to_vec(),
            simulations: request.simulations,
            as_of: None,
        };
        let engine = Arc::clone(&self.engine);
        let result = tokio::task::spawn_blocking(move || engine.fair_value_default(&mc_request))
            .await
            .map_err(|e| PricingError::Simulation(e.to_string()))??;
        record_latency(LatencyMetric::Pricing, start.elapsed());

        let response = PricingResponse::from_result(&request.player_id, &request.market, result);
        tracing::info!(
            request_id = %response.request_id,
            player_id = %response.player_id,
            market = %response.market,
            market_line,
            fair_line = response.fair_line,
            edge = response.edge,
            "Priced request"
        );
        Ok(response)
    }
}
