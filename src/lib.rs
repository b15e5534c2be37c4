//! fairline: Fair-market-line pricing engine for player props
//!
//! This library provides the core components for:
//! - American odds conversion and devig (multiplicative and Shin)
//! - Feature-driven outcome distributions per sport and market
//! - Weighted multi-book consensus
//! - Monotone probability curves across lines
//! - Fair-line solving by bisection or Newton
//! - Edge, expected value and Kelly sizing per book
//! - Monte Carlo fair value from a single prior
//! - Prior caching for the collaborator layer
//! - Logging and Prometheus metrics

pub mod analysis;
pub mod cache;
pub mod cli;
pub mod config;
pub mod consensus;
pub mod curve;
pub mod distribution;
pub mod edge;
pub mod montecarlo;
pub mod odds;
pub mod pricing;
pub mod solver;
pub mod telemetry;
