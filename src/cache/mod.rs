//! Cache module
//!
//! TTL/LRU caching for the collaborator layer; the pricing engine never reads it

mod prior_store;
mod ttl;

pub use prior_store::CachedPriorStore;
pub use ttl::TtlCache;
