//! Market analysis module
//!
//! End-to-end fair-line analysis of one or many player prop markets

mod analyzer;
mod types;

pub use analyzer::MarketAnalyzer;
pub use types::{
    AnalysisFlag, BatchAnalysis, BatchSummary, BookQuote, MarketAnalysis, MarketInput,
    RejectedBook,
};
