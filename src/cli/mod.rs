//! CLI interface for fairline
//!
//! Provides subcommands for:
//! - `devig`: Strip the margin from one two-sided quote
//! - `analyze`: Fair line, confidence and edges for one market
//! - `batch`: Analyse many markets concurrently
//! - `price`: Monte Carlo fair value from a player prior
//! - `predict`: Model distribution for a player from features
//! - `config`: Show configuration

mod analyze;
mod devig;
mod predict;
mod price;

pub use analyze::{AnalyzeArgs, BatchArgs};
pub use devig::DevigArgs;
pub use predict::PredictArgs;
pub use price::PriceArgs;

use std::io::Read;
use std::path::Path;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;

#[derive(Parser, Debug)]
#[command(name = "fairline")]
#[command(about = "Fair-market-line pricing for player props")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Devig one over/under quote
    Devig(DevigArgs),
    /// Analyse one multi-book market
    Analyze(AnalyzeArgs),
    /// Analyse a batch of markets
    Batch(BatchArgs),
    /// Monte Carlo fair value from a prior
    Price(PriceArgs),
    /// Predict a player's outcome distribution
    Predict(PredictArgs),
    /// Show configuration
    Config,
}

/// Read a file, or stdin for "-"
pub(crate) fn read_input(path: &Path) -> anyhow::Result<String> {
    if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read stdin")?;
        return Ok(buf);
    }
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

/// Pretty JSON on stdout
pub(crate) fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
