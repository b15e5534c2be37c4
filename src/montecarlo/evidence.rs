//! Evidence adjustments to a prior
//!
//! Each accepted item moves mu and sigma by `weight * recency * delta`, where
//! recency halves every `half_life_hours`.

use chrono::{DateTime, Utc};

use crate::config::EvidenceConfig;

use super::{AdjustedPrior, Evidence, PlayerPrior, RejectedEvidence, RejectionReason};

/// Filter and apply evidence to a prior as of `now`
pub fn apply_evidence_adjustments(
    prior: &PlayerPrior,
    evidence: &[Evidence],
    config: &EvidenceConfig,
    now: DateTime<Utc>,
) -> AdjustedPrior {
    let mut mu = prior.mu;
    let mut sigma = prior.sigma;
    let mut applied = Vec::new();
    let mut rejected = Vec::new();

    for item in evidence {
        let age_hours = (now - item.observed_at).num_seconds().max(0) as f64 / 3600.0;
        let reason = if !(item.weight.is_finite()
            && item.mu_delta.is_finite()
            && item.sigma_delta.is_finite())
        {
            Some(RejectionReason::NonFinite)
        } else if item.weight < config.min_weight {
            Some(RejectionReason::LowWeight)
        } else if age_hours > config.max_age_hours {
            Some(RejectionReason::Stale)
        } else {
            None
        };

        if let Some(reason) = reason {
            tracing::debug!(id = %item.id, source = %item.source, ?reason, age_hours, "Evidence rejected");
            rejected.push(RejectedEvidence {
                id: item.id.clone(),
                reason,
            });
            continue;
        }

        let recency = 0.5_f64.powf(age_hours / config.half_life_hours);
        let influence = item.weight.min(1.0) * recency;
        mu += influence * item.mu_delta;
        sigma += influence * item.sigma_delta;
        applied.push(item.id.clone());
    }

    let floor = config.min_sigma_ratio * prior.sigma;
    if sigma < floor {
        tracing::debug!(sigma, floor, "Adjusted sigma floored");
        sigma = floor;
    }

    AdjustedPrior {
        mu,
        sigma,
        applied,
        rejected,
    }
}
