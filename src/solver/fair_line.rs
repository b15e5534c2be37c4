//! Fair-line solver
//!
//! Finds the line where the fair probability of the over is one half. The curve is
//! non-increasing, so the crossing is bracketed by the search range whenever
//! p(min) >= 0.5 >= p(max).

use crate::config::SolverConfig;
use crate::curve::{CurveIssue, ProbabilityCurve};
use crate::telemetry::{increment_counter, CounterMetric};

use super::{ConfidenceInterval, FairMarketLine, SearchRange, SolverFlag, SolverMethod};

const TARGET: f64 = 0.5;

/// Probability distance from 0.5 treated as exactly 0.5
const TARGET_EPSILON: f64 = 1e-9;

/// Slopes below this are treated as flat
const MIN_SLOPE: f64 = 1e-9;

/// Bisection or Newton solver for the fair market line
pub struct FairLineSolver {
    config: SolverConfig,
}

/// Outcome of one bracketed search
struct Bracketed {
    line: f64,
    iterations: u32,
    converged: bool,
}

impl FairLineSolver {
    /// Create a new solver with default configuration
    pub fn new() -> Self {
        Self {
            config: SolverConfig::default(),
        }
    }

    /// Create a solver with custom configuration
    pub fn with_config(config: SolverConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Solve for the 0.5 crossing of `curve` within `range`
    ///
    /// Never fails: a missing crossing, a plateau or an exhausted iteration budget
    /// produce a best estimate with flags and reduced confidence.
    pub fn solve_fair_market_line(
        &self,
        curve: &ProbabilityCurve,
        range: SearchRange,
    ) -> FairMarketLine {
        let range = range.normalised(curve);
        let mut flags = Vec::new();
        if curve.is_flat() {
            flags.push(SolverFlag::FlatCurve);
        }
        if curve
            .issues()
            .iter()
            .any(|issue| matches!(issue, CurveIssue::NonMonotonic { .. }))
        {
            flags.push(SolverFlag::NonMonotonicCurve);
        }

        let p_min = curve.evaluate(range.min);
        let p_max = curve.evaluate(range.max);
        let mut method = self.config.method;
        let mut iterations = 0;

        let line = if p_min < TARGET - TARGET_EPSILON {
            flags.push(SolverFlag::NoCrossing);
            range.min
        } else if p_max > TARGET + TARGET_EPSILON {
            flags.push(SolverFlag::NoCrossing);
            range.max
        } else if range.width() <= self.config.tolerance {
            0.5 * (range.min + range.max)
        } else {
            let newton = match self.config.method {
                SolverMethod::Newton => {
                    let result = self.newton(curve, range);
                    if result.is_none() {
                        flags.push(SolverFlag::NewtonFallback);
                        increment_counter(CounterMetric::SolverFallback);
                        method = SolverMethod::Bisection;
                    }
                    result
                }
                SolverMethod::Bisection => None,
            };
            match newton {
                Some(found) => {
                    iterations = found.iterations;
                    found.line
                }
                None => {
                    let (line, used) = self.bisect(curve, range, &mut flags);
                    iterations = used;
                    line
                }
            }
        };

        if flags.contains(&SolverFlag::NoCrossing) {
            tracing::warn!(
                p_min,
                p_max,
                min = range.min,
                max = range.max,
                "Curve does not cross 0.5 in search range"
            );
        }
        if flags.contains(&SolverFlag::DidNotConverge) {
            tracing::warn!(
                iterations,
                max_iterations = self.config.max_iterations,
                line,
                "Fair-line solve did not converge"
            );
            increment_counter(CounterMetric::SolverNotConverged);
        }

        let (confidence_interval, confidence) = self.assess(curve, range, line, &flags);
        tracing::debug!(
            line,
            confidence,
            iterations,
            ?method,
            ?flags,
            "Solved fair market line"
        );

        FairMarketLine {
            line,
            confidence,
            confidence_interval,
            method,
            iterations,
            flags,
        }
    }

    /// Two transition searches: where p stops exceeding 0.5 and where it drops below.
    /// They coincide on a strictly decreasing curve and bound a plateau otherwise.
    fn bisect(
        &self,
        curve: &ProbabilityCurve,
        range: SearchRange,
        flags: &mut Vec<SolverFlag>,
    ) -> (f64, u32) {
        let above = self.transition(curve, range, |p| p > TARGET + TARGET_EPSILON);
        let not_below = self.transition(curve, range, |p| p >= TARGET - TARGET_EPSILON);
        let iterations = above.iterations + not_below.iterations;
        if !(above.converged && not_below.converged) {
            flags.push(SolverFlag::DidNotConverge);
        }

        let (start, end) = (above.line, not_below.line);
        if end - start <= 2.0 * self.config.tolerance {
            return (0.5 * (start + end), iterations);
        }

        // only the observed part of a plateau is evidence for the fair line
        flags.push(SolverFlag::Plateau);
        let (span_min, span_max) = curve.knot_span();
        let (lo, hi) = (start.max(span_min), end.min(span_max));
        let line = if lo <= hi {
            0.5 * (lo + hi)
        } else {
            0.5 * (start + end)
        };
        (line, iterations)
    }

    /// Last line at which `holds` is still true, assuming it is true then false
    fn transition(
        &self,
        curve: &ProbabilityCurve,
        range: SearchRange,
        holds: impl Fn(f64) -> bool,
    ) -> Bracketed {
        let (mut lo, mut hi) = (range.min, range.max);
        if !holds(curve.evaluate(lo)) {
            return Bracketed {
                line: lo,
                iterations: 0,
                converged: true,
            };
        }
        if holds(curve.evaluate(hi)) {
            return Bracketed {
                line: hi,
                iterations: 0,
                converged: true,
            };
        }

        let mut iterations = 0;
        while hi - lo > self.config.tolerance && iterations < self.config.max_iterations {
            iterations += 1;
            let mid = 0.5 * (lo + hi);
            if holds(curve.evaluate(mid)) {
                lo = mid;
            } else {
                hi = mid;
            }
        }
        Bracketed {
            line: 0.5 * (lo + hi),
            iterations,
            converged: hi - lo <= self.config.tolerance,
        }
    }

    /// Safeguarded Newton iteration; `None` hands over to bisection
    fn newton(&self, curve: &ProbabilityCurve, range: SearchRange) -> Option<Bracketed> {
        let (mut lo, mut hi) = (range.min, range.max);
        let mut x = 0.5 * (lo + hi);

        for iteration in 1..=self.config.max_iterations {
            let residual = curve.evaluate(x) - TARGET;
            let slope = self.slope(curve, x, self.config.derivative_step);
            if slope.abs() < MIN_SLOPE {
                tracing::debug!(x, slope, "Flat derivative, falling back to bisection");
                return None;
            }
            if residual.abs() <= TARGET_EPSILON {
                return Some(Bracketed {
                    line: x,
                    iterations: iteration,
                    converged: true,
                });
            }

            if residual > 0.0 {
                lo = x;
            } else {
                hi = x;
            }
            let mut next = x - residual / slope;
            if !(next > lo && next < hi) {
                next = 0.5 * (lo + hi);
            }
            if (next - x).abs() < 0.5 * self.config.tolerance || hi - lo <= self.config.tolerance {
                return Some(Bracketed {
                    line: next,
                    iterations: iteration,
                    converged: true,
                });
            }
            x = next;
        }
        None
    }

    /// Central-difference slope of the curve (negative for a decreasing curve)
    fn slope(&self, curve: &ProbabilityCurve, line: f64, step: f64) -> f64 {
        (curve.evaluate(line + step) - curve.evaluate(line - step)) / (2.0 * step)
    }

    /// Interval from the local slope and confidence from steepness and data density
    fn assess(
        &self,
        curve: &ProbabilityCurve,
        range: SearchRange,
        line: f64,
        flags: &[SolverFlag],
    ) -> (ConfidenceInterval, f64) {
        let step = self.config.derivative_step.max(curve.range().step);
        let slope = self.slope(curve, line, step).abs();
        let cap = (0.5 * range.width()).max(self.config.tolerance);
        let half_width = if slope < MIN_SLOPE {
            cap
        } else {
            (self.config.probability_band / slope).min(cap)
        };

        let steepness = 1.0 - half_width / cap;
        let radius = (2.0 * half_width).max(curve.range().step);
        let nearby = curve.knots_within(line, radius) as f64;
        let density = 1.0 - (-nearby / 2.0).exp();

        let mut confidence = steepness * density;
        for flag in flags {
            confidence *= match flag {
                SolverFlag::NoCrossing => 0.25,
                SolverFlag::Plateau | SolverFlag::DidNotConverge | SolverFlag::FlatCurve => 0.5,
                SolverFlag::NonMonotonicCurve => 0.75,
                SolverFlag::NewtonFallback => 1.0,
            };
        }

        (
            ConfidenceInterval {
                lower: line - half_width,
                upper: line + half_width,
            },
            confidence.clamp(0.0, 1.0),
        )
    }
}

impl Default for FairLineSolver {
    fn default() -> Self {
        Self::new()
    }
}
