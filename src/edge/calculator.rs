//! Edge calculation against a fair probability curve

use rust_decimal::Decimal;

use crate::config::EdgeConfig;
use crate::curve::ProbabilityCurve;
use crate::odds::{american, OddsError};
use crate::telemetry::{increment_counter, CounterMetric};

use super::kelly::KellyCalculator;
use super::{BookLine, EdgeCalculation, Side};

/// Prices every side of every book line against the curve
pub struct EdgeCalculator {
    kelly: KellyCalculator,
}

impl EdgeCalculator {
    /// Create a new edge calculator with default configuration
    pub fn new() -> Self {
        Self::with_config(&EdgeConfig::default())
    }

    /// Create an edge calculator with custom configuration
    pub fn with_config(config: &EdgeConfig) -> Self {
        Self {
            kelly: KellyCalculator::new(config.kelly_multiplier, config.kelly_cap),
        }
    }

    pub fn kelly(&self) -> &KellyCalculator {
        &self.kelly
    }

    /// One row per (book, side), in input order
    ///
    /// Books with invalid odds are skipped; rows with no edge are kept.
    pub fn calculate_edges(
        &self,
        book_lines: &[BookLine],
        curve: &ProbabilityCurve,
        bankroll: Option<Decimal>,
    ) -> Vec<EdgeCalculation> {
        let mut edges = Vec::with_capacity(book_lines.len() * 2);
        for book_line in book_lines {
            match self.book_edges(book_line, curve, bankroll) {
                Ok(rows) => edges.extend(rows),
                Err(e) => {
                    tracing::warn!(
                        book = %book_line.book,
                        line = book_line.line,
                        error = %e,
                        "Skipping book with invalid odds"
                    );
                    increment_counter(CounterMetric::BookRejected);
                }
            }
        }
        edges
    }

    fn book_edges(
        &self,
        book_line: &BookLine,
        curve: &ProbabilityCurve,
        bankroll: Option<Decimal>,
    ) -> Result<[EdgeCalculation; 2], OddsError> {
        // validate both sides before producing either row
        american::validate(book_line.over_price)?;
        american::validate(book_line.under_price)?;

        let p_over = curve.evaluate(book_line.line);
        Ok([
            self.side_edge(book_line, Side::Over, p_over, bankroll)?,
            self.side_edge(book_line, Side::Under, 1.0 - p_over, bankroll)?,
        ])
    }

    fn side_edge(
        &self,
        book_line: &BookLine,
        side: Side,
        fair_probability: f64,
        bankroll: Option<Decimal>,
    ) -> Result<EdgeCalculation, OddsError> {
        let market_price = match side {
            Side::Over => book_line.over_price,
            Side::Under => book_line.under_price,
        };
        let implied_probability = american::implied_probability(market_price)?;
        let decimal = american::to_decimal(market_price)?;
        let kelly_fraction = self.kelly.fraction(fair_probability, decimal);

        Ok(EdgeCalculation {
            book: book_line.book.clone(),
            side,
            line: book_line.line,
            market_price,
            fair_probability,
            implied_probability,
            edge: fair_probability - implied_probability,
            expected_value: fair_probability * decimal - 1.0,
            kelly_fraction,
            fair_price: american::from_probability(fair_probability),
            stake: bankroll.and_then(|b| self.kelly.stake(kelly_fraction, b)),
        })
    }
}

impl Default for EdgeCalculator {
    fn default() -> Self {
        Self::new()
    }
}

/// Sort rows by descending absolute edge
pub fn sort_by_abs_edge(edges: &mut [EdgeCalculation]) {
    edges.sort_by(|a, b| b.edge.abs().total_cmp(&a.edge.abs()));
}
