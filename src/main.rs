use clap::Parser;
use fairline::cli::{Cli, Commands};
use fairline::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = match Config::load(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Warning: Could not load config from {}: {}", cli.config, e);
            eprintln!("Using default configuration");
            toml::from_str(include_str!("../config.toml.example"))?
        }
    };

    // Initialize telemetry
    let _telemetry = fairline::telemetry::init_telemetry(&config.telemetry)?;

    match cli.command {
        Commands::Devig(args) => args.execute(&config)?,
        Commands::Analyze(args) => args.execute(&config)?,
        Commands::Batch(args) => args.execute(&config).await?,
        Commands::Price(args) => args.execute(&config).await?,
        Commands::Predict(args) => args.execute(&config)?,
        Commands::Config => {
            println!("Current configuration:");
            println!("  Devig: {:?}", config.devig.method);
            println!(
                "  Consensus: default_weight={}, single_source_cap={}, books={}",
                config.consensus.default_weight,
                config.consensus.single_source_cap,
                config.consensus.books.len()
            );
            println!(
                "  Curve: step={}, padding={}, non_monotonic_tolerance={}",
                config.curve.step, config.curve.padding, config.curve.non_monotonic_tolerance
            );
            println!(
                "  Solver: {:?}, tolerance={}, max_iterations={}",
                config.solver.method, config.solver.tolerance, config.solver.max_iterations
            );
            println!(
                "  Edge: Kelly={}, cap={}",
                config.edge.kelly_multiplier, config.edge.kelly_cap
            );
            println!(
                "  Monte Carlo: simulations={} (max {}), percentiles={:?}",
                config.monte_carlo.default_simulations,
                config.monte_carlo.max_simulations,
                config.monte_carlo.percentile_mode
            );
            println!(
                "  Cache: capacity={}, ttl={}s",
                config.cache.capacity, config.cache.ttl_secs
            );
        }
    }

    Ok(())
}
