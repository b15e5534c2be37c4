//! Prometheus metrics

use std::net::SocketAddr;
use std::time::Duration;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Latency metric types
#[derive(Debug, Clone, Copy)]
pub enum LatencyMetric {
    /// One Monte Carlo run
    Simulation,
    /// One multi-book market analysis
    Analysis,
    /// One pricing request, prior lookup included
    Pricing,
}

/// Counter metric types
#[derive(Debug, Clone, Copy)]
pub enum CounterMetric {
    /// Book quote excluded for invalid odds
    BookRejected,
    /// Isotonic correction beyond tolerance
    NonMonotonicCurve,
    /// Newton handed over to bisection
    SolverFallback,
    /// Solver ran out of iterations
    SolverNotConverged,
    /// Market analysed without a usable book
    InsufficientData,
    /// Shin devig fell back to multiplicative
    ShinFallback,
}

/// Record a latency measurement
pub fn record_latency(metric: LatencyMetric, duration: Duration) {
    let metric_name = match metric {
        LatencyMetric::Simulation => "fairline_simulation_latency_ms",
        LatencyMetric::Analysis => "fairline_analysis_latency_ms",
        LatencyMetric::Pricing => "fairline_pricing_latency_ms",
    };

    metrics::histogram!(metric_name).record(duration.as_secs_f64() * 1_000.0);
}

/// Increment a counter by one
pub fn increment_counter(metric: CounterMetric) {
    let metric_name = match metric {
        CounterMetric::BookRejected => "fairline_books_rejected_total",
        CounterMetric::NonMonotonicCurve => "fairline_non_monotonic_curves_total",
        CounterMetric::SolverFallback => "fairline_solver_fallbacks_total",
        CounterMetric::SolverNotConverged => "fairline_solver_not_converged_total",
        CounterMetric::InsufficientData => "fairline_insufficient_data_total",
        CounterMetric::ShinFallback => "fairline_shin_fallbacks_total",
    };

    metrics::counter!(metric_name).increment(1);
}

/// Serve metrics for scraping on `0.0.0.0:port`
pub fn install_exporter(port: u16) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| anyhow::anyhow!("Failed to start metrics exporter: {}", e))?;
    tracing::info!(%addr, "Metrics exporter listening");
    Ok(())
}
