//! Domain records shared by the store, sink, pipeline, and HTTP layer.

use serde::{Deserialize, Serialize};

/// One OHLCV record, the unit of persistence.
///
/// `(ticker, date)` is a stable identity: the store holds at most one row per
/// pair. Price and volume fields are absent (not zero) when the source had no
/// usable value. `date` is an ISO-8601 timestamp string without timezone,
/// e.g. `2025-01-01T00:00:00`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteRow {
    pub ticker: String,
    pub date: String,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub volume: Option<i64>,
}

/// Outcome of a single-ticker fetch-and-store run.
#[derive(Debug, Clone, Serialize)]
pub struct FetchSummary {
    /// Canonical upper-case symbol.
    pub ticker: String,
    /// Rows produced by the normalizer.
    pub fetched: usize,
    /// Rows newly inserted by the store (duplicates are skipped).
    pub inserted: usize,
}

/// Combined rows from a read-only multi-ticker fetch.
#[derive(Debug, Clone, Serialize)]
pub struct MultiFetchSummary {
    pub fetched: usize,
    pub data: Vec<QuoteRow>,
}
