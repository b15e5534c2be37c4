//! Book weight registry

use std::collections::HashMap;

use crate::config::ConsensusConfig;

use super::BookWeight;

/// Book weights keyed by lowercase book name
#[derive(Debug, Clone)]
pub struct BookWeights {
    default_weight: f64,
    books: HashMap<String, BookWeight>,
}

impl BookWeights {
    /// Create a registry where every book gets `default_weight`
    pub fn new(default_weight: f64) -> Self {
        Self {
            default_weight,
            books: HashMap::new(),
        }
    }

    /// Create from ConsensusConfig
    pub fn from_config(config: &ConsensusConfig) -> Self {
        let mut weights = Self::new(config.default_weight);
        for book in &config.books {
            weights.insert(book.clone());
        }
        weights
    }

    pub fn insert(&mut self, weight: BookWeight) {
        self.books.insert(weight.book.to_ascii_lowercase(), weight);
    }

    pub fn get(&self, book: &str) -> Option<&BookWeight> {
        self.books.get(&book.to_ascii_lowercase())
    }

    /// Effective weight for a book, falling back to the default
    pub fn weight_for(&self, book: &str) -> f64 {
        self.get(book)
            .map(BookWeight::effective)
            .unwrap_or(self.default_weight)
    }

    pub fn default_weight(&self) -> f64 {
        self.default_weight
    }

    pub fn len(&self) -> usize {
        self.books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }
}

impl Default for BookWeights {
    fn default() -> Self {
        Self::new(1.0)
    }
}
