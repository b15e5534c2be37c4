//! Distribution predictor module
//!
//! Parametric outcome distributions for player markets and their tail probabilities

mod baseline;
mod predictor;
pub mod special;
mod types;

pub use baseline::{normalise_market, BaselineTable, MarketBaseline};
pub use predictor::{calculate_probability_over, DistributionPredictor, FeatureSensitivity};
pub use types::{
    Distribution, DistributionError, DistributionParams, Family, FeatureAdjustment,
    PlayerFeatures, Sport,
};
