//! Devig command implementation

use clap::Args;
use serde::Serialize;

use crate::config::Config;
use crate::odds::{american, devig, DevigMethod};

use super::print_json;

#[derive(Args, Debug)]
pub struct DevigArgs {
    /// American odds for the over
    #[arg(long, allow_negative_numbers = true)]
    pub over: i32,

    /// American odds for the under
    #[arg(long, allow_negative_numbers = true)]
    pub under: i32,

    /// multiplicative or shin; defaults to the configured method
    #[arg(long, value_parser = parse_method)]
    pub method: Option<DevigMethod>,
}

#[derive(Serialize)]
struct DevigOutput {
    raw_over: f64,
    raw_under: f64,
    p_over: f64,
    p_under: f64,
    vig_removed: f64,
    method: DevigMethod,
    fair_over_price: Option<i32>,
    fair_under_price: Option<i32>,
}

impl DevigArgs {
    pub fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let method = self.method.unwrap_or(config.devig.method);
        let probs = devig(self.over, self.under, method)?;
        print_json(&DevigOutput {
            raw_over: american::implied_probability(self.over)?,
            raw_under: american::implied_probability(self.under)?,
            p_over: probs.p_over,
            p_under: probs.p_under,
            vig_removed: probs.vig_removed,
            method: probs.method,
            fair_over_price: american::from_probability(probs.p_over),
            fair_under_price: american::from_probability(probs.p_under),
        })
    }
}

fn parse_method(s: &str) -> Result<DevigMethod, String> {
    match s.to_ascii_lowercase().as_str() {
        "multiplicative" => Ok(DevigMethod::Multiplicative),
        "shin" => Ok(DevigMethod::Shin),
        other => Err(format!("unknown devig method '{other}'")),
    }
}
