//! Consensus module
//!
//! Fuses devigged probabilities from several books using per-book trust weights

mod builder;
mod types;
mod weights;

pub use builder::ConsensusBuilder;
pub use types::{BookProbability, BookWeight, Consensus};
pub use weights::BookWeights;
