//! Benchmarks for the pricing pipeline

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use fairline::analysis::{BookQuote, MarketAnalyzer, MarketInput};
use fairline::montecarlo::{MonteCarloEngine, MonteCarloRequest, PlayerPrior};
use fairline::odds::{devig, DevigMethod};

fn benchmark_devig(c: &mut Criterion) {
    c.bench_function("devig_multiplicative", |b| {
        b.iter(|| devig(black_box(-135), black_box(115), DevigMethod::Multiplicative))
    });
    c.bench_function("devig_shin", |b| {
        b.iter(|| devig(black_box(-135), black_box(115), DevigMethod::Shin))
    });
}

fn benchmark_analysis(c: &mut Criterion) {
    let analyzer = MarketAnalyzer::new();
    let input = MarketInput {
        player_id: "p1".to_string(),
        player_name: "Bench Player".to_string(),
        market: "passing_yards".to_string(),
        event_id: "e1".to_string(),
        books: vec![
            BookQuote::new("pinnacle", 245.5, -115, -105),
            BookQuote::new("draftkings", 244.5, -110, -110),
            BookQuote::new("fanduel", 247.5, 100, -120),
            BookQuote::new("caesars", 249.5, 115, -140),
            BookQuote::new("mgm", 242.5, -130, 110),
        ],
        bankroll: None,
    };

    c.bench_function("analyze_five_books", |b| {
        b.iter(|| analyzer.analyze(black_box(&input), None))
    });
}

fn benchmark_monte_carlo(c: &mut Criterion) {
    let engine = MonteCarloEngine::new();
    let request = MonteCarloRequest::new(245.5, PlayerPrior::new("p1", "passing_yards", 258.2, 20.0))
        .with_simulations(20_000);

    c.bench_function("monte_carlo_20k", |b| {
        b.iter(|| engine.fair_value_seeded(black_box(&request), 42))
    });
}

criterion_group!(
    benches,
    benchmark_devig,
    benchmark_analysis,
    benchmark_monte_carlo
);
criterion_main!(benches);
