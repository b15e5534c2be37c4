//! Pricing request and response types

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::montecarlo::{PricingError, PricingResult};

/// Single-prior pricing request as received from a caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingRequest {
    pub player_id: String,
    pub market: String,
    /// Market line; kept loose so a missing or non-numeric value can be reported
    #[serde(default)]
    pub line: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub simulations: Option<usize>,
}

impl PricingRequest {
    pub fn new(player_id: impl Into<String>, market: impl Into<String>, line: f64) -> Self {
        Self {
            player_id: player_id.into(),
            market: market.into(),
            line: Some(serde_json::Value::from(line)),
            simulations: None,
        }
    }

    /// Numeric market line, or `NotFound` when missing or not a finite number
    pub fn market_line(&self) -> Result<f64, PricingError> {
        match &self.line {
            None | Some(serde_json::Value::Null) => {
                Err(PricingError::NotFound("line is missing".to_string()))
            }
            Some(value) => value
                .as_f64()
                .filter(|line| line.is_finite())
                .ok_or_else(|| PricingError::NotFound(format!("line is not numeric: {value}"))),
        }
    }
}

/// Pricing response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingResponse {
    pub request_id: Uuid,
    pub player_id: String,
    pub market: String,
    pub fair_line: f64,
    pub edge: f64,
    pub p_over: f64,
    pub conf_low: f64,
    pub conf_high: f64,
    pub mu: f64,
    pub sigma: f64,
    pub simulations: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub applied_evidence: Vec<String>,
}

impl PricingResponse {
    pub fn from_result(player_id: &str, market: &str, result: PricingResult) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            player_id: player_id.to_string(),
            market: market.to_string(),
            fair_line: result.fair_line,
            edge: result.edge,
            p_over: result.p_over,
            conf_low: result.conf_low,
            conf_high: result.conf_high,
            mu: result.mu,
            sigma: result.sigma,
            simulations: result.simulations,
            applied_evidence: result.applied_evidence,
        }
    }
}
