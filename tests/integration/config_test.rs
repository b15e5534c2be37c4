//! Integration tests for configuration loading

use std::io::Write;

use fairline::analysis::MarketAnalyzer;
use fairline::config::{Config, ConfigError};
use fairline::consensus::BookWeights;
use fairline::distribution::DistributionPredictor;
use fairline::odds::DevigMethod;
use fairline::solver::SolverMethod;
use tempfile::NamedTempFile;

#[test]
fn test_config_example_loads() {
    let config: Config = toml::from_str(include_str!("../../config.toml.example")).unwrap();
    config.validate().unwrap();
    assert_eq!(DevigMethod::Multiplicative, config.devig.method);
    assert_eq!(SolverMethod::Bisection, config.solver.method);
    assert_eq!(3, config.consensus.books.len());

    let weights = BookWeights::from_config(&config.consensus);
    assert_eq!(2.0, weights.weight_for("Pinnacle"));
    assert_eq!(1.0, weights.weight_for("unlisted"));
    DistributionPredictor::from_config(&config.distribution).unwrap();
    MarketAnalyzer::from_config(&config);
}

#[test]
fn test_config_load_from_file() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
        [devig]
        method = "shin"

        [solver]
        method = "newton"
        max_iterations = 32

        [[distribution.baselines]]
        sport = "nfl"
        market = "longest_reception"
        family = "log_normal"
        mean = 22.0
        std_dev = 9.0
        "#
    )
    .unwrap();

    let config = Config::load(file.path()).unwrap();
    assert_eq!(DevigMethod::Shin, config.devig.method);
    assert_eq!(SolverMethod::Newton, config.solver.method);
    assert_eq!(32, config.solver.max_iterations);
    assert_eq!(1, config.distribution.baselines.len());
}

#[test]
fn test_config_load_rejects_invalid_values() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "[edge]\nkelly_cap = 2.0").unwrap();
    assert!(matches!(
        Config::load(file.path()),
        Err(ConfigError::Invalid {
            field: "edge.kelly_cap",
            ..
        })
    ));
}

#[test]
fn test_config_load_rejects_malformed_toml() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "[devig\nmethod = ").unwrap();
    assert!(matches!(Config::load(file.path()), Err(ConfigError::Parse(_))));
}

#[test]
fn test_config_load_rejects_bad_baseline() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
        [[distribution.baselines]]
        sport = "nba"
        market = "points"
        family = "normal"
        mean = 20.0
        std_dev = -1.0
        "#
    )
    .unwrap();
    assert!(matches!(
        Config::load(file.path()),
        Err(ConfigError::Invalid {
            field: "distribution.baselines",
            ..
        })
    ));
}
