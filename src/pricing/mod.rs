//! Pricing module
//!
//! Request-level pricing of a single player prior: line validation, prior
//! lookup through a pluggable store, then a Monte Carlo run

mod service;
mod store;
mod types;

pub use crate::montecarlo::PricingError;
pub use service::PricingService;
pub use store::{prior_key, InMemoryPriorStore, PriorStore};
pub use types::{PricingRequest, PricingResponse};
