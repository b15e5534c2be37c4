//! Multi-book market analysis
//!
//! Devig every quote, fuse books into a consensus at each quoted line, fit a
//! monotone curve over the quoted range, solve for the fair line and price each
//! book against it.

use std::time::Instant;

use uuid::Uuid;

use crate::config::{Config, SharedConfig};
use crate::consensus::{BookProbability, BookWeights, ConsensusBuilder};
use crate::curve::{CurveBuilder, DataPoint, LineRange};
use crate::edge::{sort_by_abs_edge, BookLine, EdgeCalculator};
use crate::montecarlo::PlayerPrior;
use crate::odds::{devig, DevigMethod};
use crate::solver::{ConfidenceInterval, FairLineSolver, SearchRange};
use crate::telemetry::{increment_counter, record_latency, CounterMetric, LatencyMetric};

use super::{AnalysisFlag, BatchAnalysis, MarketAnalysis, MarketInput, RejectedBook};

/// Confidence reported when the line comes from the prior alone
const PRIOR_ANCHOR_CONFIDENCE: f64 = 0.1;

/// Smallest curve weight for a line whose books all carry zero weight
const MIN_POINT_WEIGHT: f64 = 1e-3;

/// Lines closer than this share a consensus point
const LINE_EPSILON: f64 = 1e-9;

/// Runs the full devig, consensus, curve, solve and edge pipeline
pub struct MarketAnalyzer {
    devig_method: DevigMethod,
    consensus: ConsensusBuilder,
    weights: SharedConfig<BookWeights>,
    curves: CurveBuilder,
    solver: FairLineSolver,
    edges: EdgeCalculator,
    min_edge: f64,
}

impl MarketAnalyzer {
    /// Create an analyzer with default configuration
    pub fn new() -> Self {
        Self::from_config(&Config::default())
    }

    /// Create from Config
    pub fn from_config(config: &Config) -> Self {
        Self {
            devig_method: config.devig.method,
            consensus: ConsensusBuilder::from_config(&config.consensus),
            weights: SharedConfig::new(BookWeights::from_config(&config.consensus)),
            curves: CurveBuilder::with_config(config.curve.clone()),
            solver: FairLineSolver::with_config(config.solver.clone()),
            edges: EdgeCalculator::with_config(&config.edge),
            min_edge: config.edge.min_edge,
        }
    }

    /// Swap in a new weight table; in-flight analyses keep their snapshot
    pub fn replace_weights(&self, weights: BookWeights) {
        self.weights.replace(weights);
    }

    pub fn min_edge(&self) -> f64 {
        self.min_edge
    }

    /// Analyse one market
    ///
    /// Never fails: bad quotes are rejected individually and sparse data lowers
    /// confidence. With no usable quote the line is anchored to `prior` when given.
    pub fn analyze(&self, input: &MarketInput, prior: Option<&PlayerPrior>) -> MarketAnalysis {
        let start = Instant::now();
        let weights = self.weights.snapshot();

        let mut probabilities = Vec::with_capacity(input.books.len());
        let mut book_lines = Vec::with_capacity(input.books.len());
        let mut rejected_books = Vec::new();
        for quote in &input.books {
            let devigged = if quote.line.is_finite() {
                devig(quote.over_price, quote.under_price, self.devig_method).map_err(|e| e.to_string())
            } else {
                Err(format!("Invalid line: {}", quote.line))
            };
            match devigged {
                Ok(probs) => {
                    probabilities.push(BookProbability {
                        book: quote.book.clone(),
                        line: quote.line,
                        p_over: probs.p_over,
                    });
                    book_lines.push(BookLine::from(quote));
                }
                Err(reason) => {
                    tracing::warn!(
                        player_id = %input.player_id,
                        market = %input.market,
                        book = %quote.book,
                        over_price = quote.over_price,
                        under_price = quote.under_price,
                        %reason,
                        "Book excluded from consensus"
                    );
                    increment_counter(CounterMetric::BookRejected);
                    rejected_books.push(RejectedBook {
                        book: quote.book.clone(),
                        line: quote.line,
                        reason,
                    });
                }
            }
        }

        let mut analysis = MarketAnalysis {
            request_id: Uuid::new_v4(),
            player_id: input.player_id.clone(),
            player_name: input.player_name.clone(),
            market: input.market.clone(),
            event_id: input.event_id.clone(),
            fair_market_line: None,
            confidence: 0.0,
            confidence_interval: None,
            method: None,
            books_analyzed: probabilities.len(),
            rejected_books,
            consensus: None,
            edges: Vec::new(),
            flags: Vec::new(),
            solver_flags: Vec::new(),
        };

        let consensus = self.consensus.calculate_consensus(&probabilities, &weights);
        let Some(consensus) = consensus else {
            self.insufficient_data(&mut analysis, prior);
            record_latency(LatencyMetric::Analysis, start.elapsed());
            return analysis;
        };

        let points = line_points(&self.consensus, &probabilities, &weights);
        let curve = match self.scan_range(&probabilities).and_then(|range| {
            self.curves
                .build(&points, range)
                .map_err(|e| e.to_string())
        }) {
            Ok(curve) => curve,
            Err(reason) => {
                tracing::warn!(player_id = %input.player_id, market = %input.market, %reason, "Curve build failed");
                analysis.consensus = Some(consensus);
                self.insufficient_data(&mut analysis, prior);
                record_latency(LatencyMetric::Analysis, start.elapsed());
                return analysis;
            }
        };

        let fair = self
            .solver
            .solve_fair_market_line(&curve, SearchRange::of(&curve));

        let mut confidence = consensus.confidence * (0.5 + 0.5 * fair.confidence);
        if consensus.books == 1 {
            confidence = confidence.min(self.consensus.single_source_cap());
            analysis.flags.push(AnalysisFlag::SingleSource);
        }

        let mut edges = self.edges.calculate_edges(&book_lines, &curve, input.bankroll);
        sort_by_abs_edge(&mut edges);

        analysis.fair_market_line = Some(fair.line);
        analysis.confidence = confidence.clamp(0.0, 1.0);
        analysis.confidence_interval = Some(fair.confidence_interval);
        analysis.method = Some(fair.method);
        analysis.consensus = Some(consensus);
        analysis.edges = edges;
        analysis.solver_flags = fair.flags;

        record_latency(LatencyMetric::Analysis, start.elapsed());
        tracing::info!(
            request_id = %analysis.request_id,
            player_id = %analysis.player_id,
            market = %analysis.market,
            fair_line = fair.line,
            confidence = analysis.confidence,
            books = analysis.books_analyzed,
            rejected = analysis.rejected_books.len(),
            "Market analysed"
        );
        analysis
    }

    /// Analyse each market in turn
    pub fn analyze_batch(&self, inputs: &[MarketInput]) -> BatchAnalysis {
        let results = inputs.iter().map(|input| self.analyze(input, None)).collect();
        BatchAnalysis::from_results(results, self.min_edge)
    }

    /// Quoted range padded on both sides
    fn scan_range(&self, probabilities: &[BookProbability]) -> Result<LineRange, String> {
        let (min, max) = probabilities
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), b| {
                (lo.min(b.line), hi.max(b.line))
            });
        let padding = self.curves.config().padding;
        let range = LineRange::new(min - padding, max + padding, self.curves.config().step);
        if !(range.min.is_finite() && range.max.is_finite()) {
            return Err("No finite lines".to_string());
        }
        Ok(range)
    }

    fn insufficient_data(&self, analysis: &mut MarketAnalysis, prior: Option<&PlayerPrior>) {
        increment_counter(CounterMetric::InsufficientData);
        analysis.flags.push(AnalysisFlag::InsufficientData);

        match prior.filter(|p| p.is_valid()) {
            Some(prior) => {
                analysis.fair_market_line = Some(prior.mu);
                analysis.confidence = PRIOR_ANCHOR_CONFIDENCE;
                analysis.confidence_interval = Some(ConfidenceInterval {
                    lower: prior.mu - prior.sigma,
                    upper: prior.mu + prior.sigma,
                });
                analysis.flags.push(AnalysisFlag::PriorAnchored);
                tracing::warn!(
                    player_id = %analysis.player_id,
                    market = %analysis.market,
                    mu = prior.mu,
                    "No usable books, anchoring to prior"
                );
            }
            None => {
                tracing::warn!(
                    player_id = %analysis.player_id,
                    market = %analysis.market,
                    "No usable books and no prior, fair line unavailable"
                );
            }
        }
    }
}

impl Default for MarketAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

/// One weighted curve point per distinct quoted line
fn line_points(
    builder: &ConsensusBuilder,
    probabilities: &[BookProbability],
    weights: &BookWeights,
) -> Vec<DataPoint> {
    let mut sorted: Vec<&BookProbability> = probabilities.iter().collect();
    sorted.sort_by(|a, b| a.line.total_cmp(&b.line));

    let mut points = Vec::new();
    let mut start = 0;
    while start < sorted.len() {
        let line = sorted[start].line;
        let end = sorted[start..]
            .iter()
            .position(|b| (b.line - line).abs() >= LINE_EPSILON)
            .map_or(sorted.len(), |offset| start + offset);
        let group: Vec<BookProbability> = sorted[start..end].iter().map(|b| (*b).clone()).collect();
        if let Some(consensus) = builder.calculate_consensus(&group, weights) {
            points.push(DataPoint::weighted(
                line,
                consensus.p_over,
                consensus.total_weight.max(MIN_POINT_WEIGHT),
            ));
        }
        start = end;
    }
    points
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::BookQuote;
    use crate::consensus::BookWeight;
    use crate::solver::SolverFlag;

    fn market(books: Vec<BookQuote>) -> MarketInput {
        MarketInput {
            player_id: "p1".to_string(),
            player_name: "Test Player".to_string(),
            market: "passing_yards".to_string(),
            event_id: "e1".to_string(),
            books,
            bankroll: None,
        }
    }

    #[test]
    fn test_two_books_bracket_fair_line() {
        let analyzer = MarketAnalyzer::new();
        let analysis = analyzer.analyze(
            &market(vec![
                BookQuote::new("dk", 30.5, -110, -110),
                BookQuote::new("fd", 31.5, -110, -110),
            ]),
            None,
        );
        let line = analysis.fair_market_line.unwrap();
        assert!(line > 30.5 && line < 31.5, "line {line}");
        assert!(analysis.confidence > 0.0);
        assert!(analysis.confidence < 0.35);
        assert_eq!(2, analysis.books_analyzed);
        assert_eq!(4, analysis.edges.len());
    }

    #[test]
    fn test_fair_line_follows_prices() {
        // over favoured at 30.5, under favoured at 32.5
        let analysis = MarketAnalyzer::new().analyze(
            &market(vec![
                BookQuote::new("dk", 30.5, -130, 110),
                BookQuote::new("fd", 32.5, 110, -130),
                BookQuote::new("mgm", 30.5, -125, 105),
            ]),
            None,
        );
        let line = analysis.fair_market_line.unwrap();
        assert!(line > 30.5 && line < 32.5, "line {line}");
        assert!(analysis.solver_flags.is_empty());
        assert!(!analysis.has_flag(AnalysisFlag::SingleSource));
    }

    #[test]
    fn test_edges_sorted_by_abs_edge() {
        let analysis = MarketAnalyzer::new().analyze(
            &market(vec![
                BookQuote::new("dk", 30.5, -130, 110),
                BookQuote::new("fd", 32.5, 110, -130),
                BookQuote::new("soft", 31.5, 140, -170),
            ]),
            None,
        );
        assert_eq!(6, analysis.edges.len());
        for pair in analysis.edges.windows(2) {
            assert!(pair[0].edge.abs() >= pair[1].edge.abs());
        }
    }

    #[test]
    fn test_invalid_book_rejected() {
        let analysis = MarketAnalyzer::new().analyze(
            &market(vec![
                BookQuote::new("broken", 30.5, 50, -110),
                BookQuote::new("dk", 30.5, -110, -110),
            ]),
            None,
        );
        assert_eq!(1, analysis.books_analyzed);
        assert_eq!(1, analysis.rejected_books.len());
        assert_eq!("broken", analysis.rejected_books[0].book);
        assert!(analysis.has_flag(AnalysisFlag::SingleSource));
        assert!(analysis.confidence <= 0.35);
        assert_eq!(2, analysis.edges.len());
    }

    #[test]
    fn test_single_book_flat_curve() {
        let analysis = MarketAnalyzer::new().analyze(
            &market(vec![BookQuote::new("dk", 30.5, -110, -110)]),
            None,
        );
        let line = analysis.fair_market_line.unwrap();
        assert!((line - 30.5).abs() < 0.05, "line {line}");
        assert!(analysis.solver_flags.contains(&SolverFlag::FlatCurve));
        assert!(analysis.confidence <= 0.35);
    }

    #[test]
    fn test_no_books_without_prior() {
        let analysis = MarketAnalyzer::new().analyze(
            &market(vec![BookQuote::new("broken", 30.5, 0, 99)]),
            None,
        );
        assert!(analysis.fair_market_line.is_none());
        assert_eq!(0.0, analysis.confidence);
        assert!(analysis.has_flag(AnalysisFlag::InsufficientData));
        assert!(analysis.edges.is_empty());
    }

    #[test]
    fn test_no_books_anchors_to_prior() {
        let prior = PlayerPrior::new("p1", "passing_yards", 27.5, 4.0);
        let analysis = MarketAnalyzer::new().analyze(&market(vec![]), Some(&prior));
        assert_eq!(Some(27.5), analysis.fair_market_line);
        assert!(analysis.confidence > 0.0 && analysis.confidence <= PRIOR_ANCHOR_CONFIDENCE);
        assert!(analysis.has_flag(AnalysisFlag::PriorAnchored));
        let interval = analysis.confidence_interval.unwrap();
        assert_eq!(23.5, interval.lower);
        assert_eq!(31.5, interval.upper);
    }

    #[test]
    fn test_weights_replaced_between_analyses() {
        let analyzer = MarketAnalyzer::new();
        let input = market(vec![
            BookQuote::new("sharp", 30.5, -150, 130),
            BookQuote::new("soft", 30.5, 130, -150),
        ]);
        let equal = analyzer.analyze(&input, None).consensus.unwrap();

        let mut weights = BookWeights::new(1.0);
        weights.insert(BookWeight::new("sharp", 5.0));
        analyzer.replace_weights(weights);
        let sharp = analyzer.analyze(&input, None).consensus.unwrap();

        assert!((equal.p_over - 0.5).abs() < 1e-9);
        assert!(sharp.p_over > 0.55);
    }

    #[test]
    fn test_batch_summary() {
        let analyzer = MarketAnalyzer::new();
        let batch = analyzer.analyze_batch(&[
            market(vec![
                BookQuote::new("dk", 30.5, -130, 110),
                BookQuote::new("fd", 32.5, 110, -130),
            ]),
            market(vec![]),
        ]);
        assert_eq!(2, batch.summary.markets_analyzed);
        assert_eq!(2, batch.results.len());
        let expected = (batch.results[0].confidence + batch.results[1].confidence) / 2.0;
        assert!((batch.summary.avg_confidence - expected).abs() < 1e-12);
        assert_eq!(batch.results[0].edges_above(0.0), batch.summary.total_edges_found);
    }

    #[test]
    fn test_request_ids_unique() {
        let analyzer = MarketAnalyzer::new();
        let input = market(vec![BookQuote::new("dk", 30.5, -110, -110)]);
        assert_ne!(
            analyzer.analyze(&input, None).request_id,
            analyzer.analyze(&input, None).request_id
        );
    }

    #[test]
    fn test_far_apart_lines_fall_back_instead_of_panicking() {
        let input = market(vec![
            BookQuote::new("dk", -1e300, -110, -110),
            BookQuote::new("fd", 1e300, -110, -110),
        ]);
        let analysis = MarketAnalyzer::new().analyze(&input, None);
        assert!(analysis.fair_market_line.is_none());
        assert!(analysis.has_flag(AnalysisFlag::InsufficientData));
        assert!(analysis.consensus.is_some());

        let prior = PlayerPrior::new("p1", "passing_yards", 27.5, 4.0);
        let anchored = MarketAnalyzer::new().analyze(&input, Some(&prior));
        assert_eq!(Some(27.5), anchored.fair_market_line);
        assert!(anchored.has_flag(AnalysisFlag::PriorAnchored));
    }
}
