//! Integration tests for the multi-book pipeline

use assert_float_eq::*;
use fairline::analysis::{AnalysisFlag, BookQuote, MarketAnalyzer, MarketInput};
use fairline::config::{Config, SolverConfig};
use fairline::consensus::{BookProbability, BookWeights, ConsensusBuilder};
use fairline::curve::{CurveBuilder, DataPoint, LineRange};
use fairline::distribution::{DistributionPredictor, PlayerFeatures, Sport};
use fairline::edge::{BookLine, EdgeCalculator};
use fairline::odds::{american, devig, DevigMethod, OddsTick};
use fairline::solver::{FairLineSolver, SearchRange, SolverMethod};
use rust_decimal_macros::dec;

fn market(books: Vec<BookQuote>) -> MarketInput {
    MarketInput {
        player_id: "mahomes".to_string(),
        player_name: "Patrick Mahomes".to_string(),
        market: "passing_yards".to_string(),
        event_id: "kc-buf".to_string(),
        books,
        bankroll: None,
    }
}

#[test]
fn test_symmetric_vig_devigs_to_even() {
    assert_float_absolute_eq!(0.5238095238, american::implied_probability(-110).unwrap(), 1e-9);
    let probs = devig(-110, -110, DevigMethod::Multiplicative).unwrap();
    assert_eq!(0.5, probs.p_over);
    assert_eq!(0.5, probs.p_under);
    assert!(probs.vig_removed > 0.047 && probs.vig_removed < 0.048);
}

#[test]
fn test_devig_invariant_over_valid_pairs() {
    let prices: Vec<i32> = (100..=1000)
        .step_by(37)
        .flat_map(|p| [p, -p])
        .collect();
    for &over in &prices {
        for &under in &prices {
            for method in [DevigMethod::Multiplicative, DevigMethod::Shin] {
                let probs = devig(over, under, method).unwrap();
                assert!((probs.p_over + probs.p_under - 1.0).abs() <= 1e-9);
                assert!(probs.vig_removed >= 0.0);
                assert!(probs.p_over > 0.0 && probs.p_over < 1.0);
            }
        }
    }
}

#[test]
fn test_two_book_example() {
    let analysis = MarketAnalyzer::new().analyze(
        &market(vec![
            BookQuote::new("draftkings", 30.5, -110, -110),
            BookQuote::new("fanduel", 31.5, -110, -110),
        ]),
        None,
    );
    let line = analysis.fair_market_line.unwrap();
    assert!(line > 30.5 && line < 31.5);
    assert!(analysis.confidence > 0.0);
    assert!(analysis.confidence < ConsensusBuilder::default().single_source_cap());
}

#[test]
fn test_curve_monotone_for_noisy_books() {
    let points: Vec<DataPoint> = [
        (240.5, 0.63),
        (242.5, 0.58),
        (243.5, 0.60),
        (245.5, 0.51),
        (246.5, 0.53),
        (248.5, 0.44),
        (251.5, 0.47),
        (253.5, 0.36),
    ]
    .iter()
    .map(|&(line, p)| DataPoint::new(line, p))
    .collect();
    let curve = CurveBuilder::new()
        .build(&points, LineRange::new(235.0, 260.0, 0.5))
        .unwrap();

    let mut previous = f64::INFINITY;
    let mut line = 230.0;
    while line <= 265.0 {
        let p = curve.evaluate(line);
        assert!(p <= previous, "curve rose at {line}");
        previous = p;
        line += 0.1;
    }
}

#[test]
fn test_solver_recovers_linear_crossing() {
    for method in [SolverMethod::Bisection, SolverMethod::Newton] {
        let (l0, k) = (47.3, 0.03);
        let points: Vec<DataPoint> = (-8..=8)
            .map(|i| {
                let line = l0 + i as f64 * 0.9;
                DataPoint::new(line, 0.5 - k * (line - l0))
            })
            .collect();
        let curve = CurveBuilder::new()
            .build(&points, LineRange::new(35.0, 60.0, 0.5))
            .unwrap();
        let config = SolverConfig {
            method,
            ..SolverConfig::default()
        };
        let fair = FairLineSolver::with_config(config.clone())
            .solve_fair_market_line(&curve, SearchRange::of(&curve));
        assert!((fair.line - l0).abs() <= config.tolerance, "{method:?}: {}", fair.line);
    }
}

#[test]
fn test_kelly_bound_over_analysis() {
    let mut input = market(vec![
        BookQuote::new("pinnacle", 245.5, -115, -105),
        BookQuote::new("draftkings", 244.5, -110, -110),
        BookQuote::new("fanduel", 247.5, 100, -120),
        BookQuote::new("soft", 249.5, 180, -220),
        BookQuote::new("stale", 239.5, -300, 240),
    ]);
    input.bankroll = Some(dec!(1000));
    let config = Config::default();
    let analysis = MarketAnalyzer::from_config(&config).analyze(&input, None);
    assert_eq!(10, analysis.edges.len());
    for edge in &analysis.edges {
        assert!(edge.kelly_fraction >= 0.0);
        assert!(edge.kelly_fraction <= config.edge.kelly_cap);
        assert!(edge.stake.is_some());
    }
    for pair in analysis.edges.windows(2) {
        assert!(pair[0].edge.abs() >= pair[1].edge.abs());
    }
}

#[test]
fn test_malformed_odds_excluded_not_fatal() {
    let analysis = MarketAnalyzer::new().analyze(
        &market(vec![
            BookQuote::new("zero", 245.5, 0, -110),
            BookQuote::new("tiny", 245.5, -110, 50),
            BookQuote::new("pinnacle", 245.5, -115, -105),
            BookQuote::new("draftkings", 246.5, -105, -115),
        ]),
        None,
    );
    assert_eq!(2, analysis.books_analyzed);
    assert_eq!(2, analysis.rejected_books.len());
    assert!(analysis.fair_market_line.is_some());
    assert!(!analysis.has_flag(AnalysisFlag::InsufficientData));
}

#[test]
fn test_single_point_curve_is_constant() {
    let curve = CurveBuilder::new()
        .build(&[DataPoint::new(17.5, 0.47)], LineRange::new(10.0, 25.0, 0.5))
        .unwrap();
    for line in [-1e9, 0.0, 10.0, 17.5, 21.25, 25.0, 1e9] {
        assert_eq!(0.47, curve.evaluate(line));
    }
}

#[test]
fn test_weighted_consensus_feeds_edges() {
    let weights = BookWeights::new(1.0);
    let consensus = ConsensusBuilder::default()
        .calculate_consensus(
            &[
                BookProbability {
                    book: "a".to_string(),
                    line: 22.5,
                    p_over: 0.56,
                },
                BookProbability {
                    book: "b".to_string(),
                    line: 22.5,
                    p_over: 0.54,
                },
            ],
            &weights,
        )
        .unwrap();
    assert_float_absolute_eq!(0.55, consensus.p_over, 1e-12);

    let curve = CurveBuilder::new()
        .build(
            &[DataPoint::new(22.5, consensus.p_over)],
            LineRange::new(17.5, 27.5, 0.5),
        )
        .unwrap();
    let edges = EdgeCalculator::new().calculate_edges(
        &[BookLine::new("soft", 22.5, 110, -130)],
        &curve,
        None,
    );
    // 0.55 fair against 100/210 implied
    assert_float_absolute_eq!(0.55 - 100.0 / 210.0, edges[0].edge, 1e-12);
    assert!(edges[0].expected_value > 0.0);
}

#[test]
fn test_model_distribution_curve_solves_near_mean() {
    let params = DistributionPredictor::new()
        .predict_player_outcome(
            "jokic",
            "player_points",
            &PlayerFeatures {
                season_average: Some(26.4),
                ..PlayerFeatures::default()
            },
            Sport::Nba,
        )
        .unwrap();
    let curve = CurveBuilder::new()
        .from_distribution(&params.distribution, LineRange::new(0.0, 60.0, 0.5))
        .unwrap();
    let fair = FairLineSolver::new().solve_fair_market_line(&curve, SearchRange::of(&curve));
    assert!((fair.line - 26.4).abs() < 2.0, "fair line {}", fair.line);
}

#[test]
fn test_feed_ticks_grouped_into_markets() {
    let feed = r#"[
        {"book": "draftkings", "sport": "nfl", "event_id": "kc-buf", "player_id": "mahomes",
         "market": "passing_yards", "line": 265.5, "over_price": -120, "under_price": 100,
         "timestamp": "2024-09-08T17:00:00Z"},
        {"book": "fanduel", "sport": "nfl", "event_id": "kc-buf", "player_id": "mahomes",
         "market": "passing_yards", "line": 267.5, "over_price": 105, "under_price": -125,
         "timestamp": "2024-09-08T17:01:00Z", "source": "feed-a"},
        {"book": "draftkings", "sport": "nfl", "event_id": "kc-buf", "player_id": "mahomes",
         "market": "passing_yards", "line": 265.5, "over_price": -130, "under_price": 110,
         "timestamp": "2024-09-08T17:02:00Z"},
        {"book": "draftkings", "sport": "nfl", "event_id": "kc-buf", "player_id": "allen",
         "market": "passing_yards", "line": 245.5, "over_price": -110, "under_price": -110,
         "timestamp": "2024-09-08T17:00:00Z"}
    ]"#;
    let ticks: Vec<OddsTick> = serde_json::from_str(feed).unwrap();
    let inputs = MarketInput::from_ticks(&ticks);
    assert_eq!(2, inputs.len());
    assert_eq!("allen", inputs[0].player_id);
    assert_eq!("mahomes", inputs[1].player_id);

    // the later draftkings tick replaces the earlier one at 265.5
    let mahomes = &inputs[1];
    assert_eq!(2, mahomes.books.len());
    assert_eq!(-130, mahomes.books[0].over_price);

    let batch = MarketAnalyzer::new().analyze_batch(&inputs);
    assert_eq!(2, batch.summary.markets_analyzed);
    assert!(batch.results[0].has_flag(AnalysisFlag::SingleSource));
    let line = batch.results[1].fair_market_line.unwrap();
    assert!(line > 265.5 && line < 267.5, "line {line}");
}
