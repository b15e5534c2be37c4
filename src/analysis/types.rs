//! Market analysis types

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::consensus::Consensus;
use crate::edge::{BookLine, EdgeCalculation};
use crate::odds::OddsTick;
use crate::solver::{ConfidenceInterval, SolverFlag, SolverMethod};

/// One book's quote in a market analysis request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookQuote {
    pub book: String,
    pub line: f64,
    pub over_price: i32,
    pub under_price: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl BookQuote {
    pub fn new(book: impl Into<String>, line: f64, over_price: i32, under_price: i32) -> Self {
        Self {
            book: book.into(),
            line,
            over_price,
            under_price,
            timestamp: None,
        }
    }
}

impl From<&BookQuote> for BookLine {
    fn from(quote: &BookQuote) -> Self {
        BookLine::new(quote.book.clone(), quote.line, quote.over_price, quote.under_price)
    }
}

impl From<&OddsTick> for BookQuote {
    fn from(tick: &OddsTick) -> Self {
        Self {
            book: tick.book.clone(),
            line: tick.line,
            over_price: tick.over_price,
            under_price: tick.under_price,
            timestamp: Some(tick.timestamp),
        }
    }
}

/// Multi-book analysis request for one player prop
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketInput {
    pub player_id: String,
    #[serde(default)]
    pub player_name: String,
    pub market: String,
    #[serde(default)]
    pub event_id: String,
    pub books: Vec<BookQuote>,
    /// Bankroll used to turn Kelly fractions into stakes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bankroll: Option<Decimal>,
}

impl MarketInput {
    /// Group feed ticks into one input per player, market and event
    ///
    /// A book quoting the same line more than once keeps its latest tick.
    /// Inputs come back ordered by player, market and event.
    pub fn from_ticks(ticks: &[OddsTick]) -> Vec<MarketInput> {
        let mut groups: BTreeMap<(&str, &str, &str), Vec<BookQuote>> = BTreeMap::new();
        for tick in ticks {
            let quotes = groups
                .entry((tick.player_id.as_str(), tick.market.as_str(), tick.event_id.as_str()))
                .or_default();
            match quotes
                .iter_mut()
                .find(|q| q.book == tick.book && q.line == tick.line)
            {
                Some(existing) => {
                    if existing.timestamp.map_or(true, |ts| ts <= tick.timestamp) {
                        *existing = BookQuote::from(tick);
                    }
                }
                None => quotes.push(BookQuote::from(tick)),
            }
        }

        groups
            .into_iter()
            .map(|((player_id, market, event_id), books)| MarketInput {
                player_id: player_id.to_string(),
                player_name: String::new(),
                market: market.to_string(),
                event_id: event_id.to_string(),
                books,
                bankroll: None,
            })
            .collect()
    }
}

/// A quote left out of the analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RejectedBook {
    pub book: String,
    pub line: f64,
    pub reason: String,
}

/// Conditions of the analysis as a whole
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisFlag {
    /// No usable book quote
    InsufficientData,
    /// Line taken from the player prior rather than the books
    PriorAnchored,
    /// Only one book contributed
    SingleSource,
}

/// Result of analysing one market
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketAnalysis {
    pub request_id: Uuid,
    pub player_id: String,
    pub player_name: String,
    pub market: String,
    pub event_id: String,
    /// Line at which the over is a coin flip; `None` when nothing supports one
    pub fair_market_line: Option<f64>,
    pub confidence: f64,
    pub confidence_interval: Option<ConfidenceInterval>,
    pub method: Option<SolverMethod>,
    /// Books that passed validation
    pub books_analyzed: usize,
    pub rejected_books: Vec<RejectedBook>,
    pub consensus: Option<Consensus>,
    /// Sorted by descending absolute edge
    pub edges: Vec<EdgeCalculation>,
    pub flags: Vec<AnalysisFlag>,
    pub solver_flags: Vec<SolverFlag>,
}

impl MarketAnalysis {
    pub fn has_flag(&self, flag: AnalysisFlag) -> bool {
        self.flags.contains(&flag)
    }

    /// Rows whose edge exceeds `min_edge`
    pub fn edges_above(&self, min_edge: f64) -> usize {
        self.edges.iter().filter(|e| e.edge > min_edge).count()
    }
}

/// Aggregate over a batch of analyses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub markets_analyzed: usize,
    pub avg_confidence: f64,
    pub total_edges_found: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchAnalysis {
    pub summary: BatchSummary,
    pub results: Vec<MarketAnalysis>,
}

impl BatchAnalysis {
    /// Summarise `results`; edges count when above `min_edge`
    pub fn from_results(results: Vec<MarketAnalysis>, min_edge: f64) -> Self {
        let markets_analyzed = results.len();
        let avg_confidence = if markets_analyzed == 0 {
            0.0
        } else {
            results.iter().map(|r| r.confidence).sum::<f64>() / markets_analyzed as f64
        };
        let total_edges_found = results.iter().map(|r| r.edges_above(min_edge)).sum();

        Self {
            summary: BatchSummary {
                markets_analyzed,
                avg_confidence,
                total_edges_found,
            },
            results,
        }
    }
}
