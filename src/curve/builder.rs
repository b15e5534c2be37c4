//! Monotone probability-of-over curve
//!
//! Sparse per-book observations are merged by line, pooled with isotonic
//! regression so that probability never rises with the line, then sampled over
//! the scan range with linear interpolation between knots.

use serde::Serialize;

use crate::config::CurveConfig;
use crate::distribution::Distribution;
use crate::telemetry::{increment_counter, CounterMetric};

use super::isotonic::fit_non_increasing;
use super::{CurveError, CurveIssue, CurvePoint, DataPoint, LineRange};

/// Lines closer than this are treated as the same line
const LINE_EPSILON: f64 = 1e-9;

/// Fitted probability-of-over curve, read-only once built
#[derive(Debug, Clone, Serialize)]
pub struct ProbabilityCurve {
    range: LineRange,
    samples: Vec<CurvePoint>,
    knots: Vec<CurvePoint>,
    issues: Vec<CurveIssue>,
}

impl ProbabilityCurve {
    /// Probability of the over at `line`
    ///
    /// Queries outside the scan range take the nearest boundary sample.
    pub fn evaluate(&self, line: f64) -> f64 {
        interpolate(&self.samples, line)
    }

    /// Scan samples in increasing line order
    pub fn samples(&self) -> &[CurvePoint] {
        &self.samples
    }

    /// Isotonic-corrected observations the curve passes through
    pub fn knots(&self) -> &[CurvePoint] {
        &self.knots
    }

    pub fn range(&self) -> LineRange {
        self.range
    }

    /// Lowest and highest observed line
    pub fn knot_span(&self) -> (f64, f64) {
        match (self.knots.first(), self.knots.last()) {
            (Some(first), Some(last)) => (first.line, last.line),
            _ => (self.range.min, self.range.max),
        }
    }

    /// Observed lines within `radius` of `line`
    pub fn knots_within(&self, line: f64, radius: f64) -> usize {
        self.knots
            .iter()
            .filter(|k| (k.line - line).abs() <= radius)
            .count()
    }

    pub fn issues(&self) -> &[CurveIssue] {
        &self.issues
    }

    pub fn is_flat(&self) -> bool {
        self.issues.contains(&CurveIssue::Flat)
    }
}

/// Builds probability curves from sparse observations
pub struct CurveBuilder {
    config: CurveConfig,
}

impl CurveBuilder {
    /// Create a new curve builder with default configuration
    pub fn new() -> Self {
        Self {
            config: CurveConfig::default(),
        }
    }

    /// Create a curve builder with custom configuration
    pub fn with_config(config: CurveConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CurveConfig {
        &self.config
    }

    /// Fit a non-increasing curve through `points` over `range`
    pub fn build(
        &self,
        points: &[DataPoint],
        range: LineRange,
    ) -> Result<ProbabilityCurve, CurveError> {
        let grid_len = range.grid_len(self.config.max_samples)?;

        let merged = merge_by_line(points);
        if merged.is_empty() {
            return Err(CurveError::InsufficientData);
        }

        let mut issues = Vec::new();
        let probabilities: Vec<f64> = merged.iter().map(|p| p.probability).collect();
        let weights: Vec<f64> = merged.iter().map(|p| p.weight).collect();
        let fit = fit_non_increasing(&probabilities, &weights);

        if fit.max_correction > self.config.non_monotonic_tolerance {
            tracing::warn!(
                max_correction = fit.max_correction,
                merges = fit.merges,
                tolerance = self.config.non_monotonic_tolerance,
                "Book probabilities contradict a monotone curve; pooled anyway"
            );
            increment_counter(CounterMetric::NonMonotonicCurve);
            issues.push(CurveIssue::NonMonotonic {
                max_correction: fit.max_correction,
            });
        } else if fit.merges > 0 {
            tracing::debug!(
                max_correction = fit.max_correction,
                merges = fit.merges,
                "Isotonic correction applied"
            );
        }

        let knots: Vec<CurvePoint> = merged
            .iter()
            .zip(&fit.values)
            .map(|(point, &probability)| CurvePoint {
                line: point.line,
                probability: probability.clamp(0.0, 1.0),
            })
            .collect();
        if knots.len() < 2 {
            issues.push(CurveIssue::Flat);
        }

        let mut lines: Vec<f64> = (0..grid_len)
            .map(|i| range.min + i as f64 * range.step)
            .collect();
        if lines.last().is_some_and(|&last| last < range.max - LINE_EPSILON) {
            lines.push(range.max);
        }
        lines.extend(
            knots
                .iter()
                .map(|k| k.line)
                .filter(|&line| line >= range.min && line <= range.max),
        );
        lines.sort_by(f64::total_cmp);
        lines.dedup_by(|a, b| (*a - *b).abs() < LINE_EPSILON);

        let samples = lines
            .into_iter()
            .map(|line| CurvePoint {
                line,
                probability: interpolate(&knots, line),
            })
            .collect();

        Ok(ProbabilityCurve {
            range,
            samples,
            knots,
            issues,
        })
    }

    /// Curve sampled from a model distribution over the range grid
    pub fn from_distribution(
        &self,
        distribution: &Distribution,
        range: LineRange,
    ) -> Result<ProbabilityCurve, CurveError> {
        let grid_len = range.grid_len(self.config.max_samples)?;
        let points: Vec<DataPoint> = (0..grid_len)
            .map(|i| {
                let line = range.min + i as f64 * range.step;
                DataPoint::new(line, distribution.probability_over(line))
            })
            .collect();
        self.build(&points, range)
    }
}

impl Default for CurveBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Sort usable points and merge those sharing a line by weighted mean
fn merge_by_line(points: &[DataPoint]) -> Vec<DataPoint> {
    let mut usable: Vec<DataPoint> = points.iter().copied().filter(DataPoint::is_usable).collect();
    usable.sort_by(|a, b| a.line.total_cmp(&b.line));

    let mut merged: Vec<DataPoint> = Vec::with_capacity(usable.len());
    let mut group: Vec<DataPoint> = Vec::new();
    for point in usable {
        if let Some(first) = group.first() {
            if (point.line - first.line).abs() >= LINE_EPSILON {
                merged.push(merge_group(&group));
                group.clear();
            }
        }
        group.push(point);
    }
    if !group.is_empty() {
        merged.push(merge_group(&group));
    }
    merged
}

fn merge_group(group: &[DataPoint]) -> DataPoint {
    let weight: f64 = group.iter().map(|p| p.weight).sum();
    let probability = if weight > 0.0 {
        group.iter().map(|p| p.probability * p.weight).sum::<f64>() / weight
    } else {
        group.iter().map(|p| p.probability).sum::<f64>() / group.len() as f64
    };
    DataPoint::weighted(group[0].line, probability, weight)
}

/// Linear interpolation over points sorted by line, clamped at both ends
fn interpolate(points: &[CurvePoint], line: f64) -> f64 {
    let (Some(first), Some(last)) = (points.first(), points.last()) else {
        return 0.5;
    };
    if line.is_nan() || line <= first.line {
        return first.probability;
    }
    if line >= last.line {
        return last.probability;
    }
    let idx = points.partition_point(|p| p.line <= line);
    let (lo, hi) = (points[idx - 1], points[idx]);
    let span = hi.line - lo.line;
    if span <= 0.0 {
        return lo.probability;
    }
    let t = (line - lo.line) / span;
    lo.probability + t * (hi.probability - lo.probability)
}
