//! Margin removal for two-sided quotes
//!
//! Multiplicative devig rescales the raw implied probabilities so they sum to one.
//! Shin devig assumes a fraction `z` of the book's turnover comes from insiders and
//! solves for the `z` that makes the adjusted probabilities sum to one:
//!
//! p_i(z) = (sqrt(z^2 + 4(1-z) * pi_i^2 / PI) - z) / (2(1-z))

use super::american::implied_probability;
use super::{DevigMethod, DeviggedProbabilities, OddsError};
use crate::telemetry::{increment_counter, CounterMetric};

/// Iteration budget for the Shin root-find
pub const SHIN_MAX_ITERATIONS: usize = 100;

/// Residual below which the Shin solve counts as converged
const SHIN_TOLERANCE: f64 = 1e-12;

/// Upper bracket for the insider fraction
const SHIN_MAX_Z: f64 = 0.999_999;

/// Convert an over/under pair of American odds to vig-free probabilities
pub fn devig(
    over_price: i32,
    under_price: i32,
    method: DevigMethod,
) -> Result<DeviggedProbabilities, OddsError> {
    let raw_over = implied_probability(over_price)?;
    let raw_under = implied_probability(under_price)?;
    let booksum = raw_over + raw_under;
    let vig_removed = (booksum - 1.0).max(0.0);

    let (p_over, method) = match method {
        DevigMethod::Multiplicative => (raw_over / booksum, DevigMethod::Multiplicative),
        DevigMethod::Shin => match shin(&[raw_over, raw_under]) {
            Some(probs) => (probs[0], DevigMethod::Shin),
            None => {
                tracing::debug!(
                    over_price,
                    under_price,
                    booksum,
                    "Shin devig did not converge, using multiplicative"
                );
                increment_counter(CounterMetric::ShinFallback);
                (raw_over / booksum, DevigMethod::Multiplicative)
            }
        },
    };

    Ok(DeviggedProbabilities {
        p_over,
        p_under: 1.0 - p_over,
        vig_removed,
        method,
    })
}

/// Solve the Shin model for raw implied probabilities
///
/// Returns `None` when the book carries no overround or the bisection exhausts
/// its budget without meeting the tolerance.
fn shin(raw: &[f64]) -> Option<Vec<f64>> {
    let booksum: f64 = raw.iter().sum();
    if booksum <= 1.0 || !booksum.is_finite() {
        return None;
    }

    let probs_at = |z: f64| -> Vec<f64> {
        raw.iter()
            .map(|&pi| {
                ((z * z + 4.0 * (1.0 - z) * pi * pi / booksum).sqrt() - z) / (2.0 * (1.0 - z))
            })
            .collect()
    };
    let residual = |z: f64| probs_at(z).iter().sum::<f64>() - 1.0;

    // residual is positive at z = 0 (sum = sqrt(booksum)) and decreases in z
    let (mut lo, mut hi) = (0.0, SHIN_MAX_Z);
    if residual(hi) > 0.0 {
        return None;
    }

    for _ in 0..SHIN_MAX_ITERATIONS {
        let mid = 0.5 * (lo + hi);
        let r = residual(mid);
        if r.abs() <= SHIN_TOLERANCE {
            return Some(normalise(probs_at(mid)));
        }
        if r > 0.0 {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    None
}

fn normalise(mut probs: Vec<f64>) -> Vec<f64> {
    let sum: f64 = probs.iter().sum();
    for p in &mut probs {
        *p /= sum;
    }
    probs
}
