//! Wire types for the chart API and the neutral tabular response.
//!
//! The chart payload is deserialized with every field optional and cell
//! values kept as loose JSON, then converted into [`RawQuotes`], a
//! provider-independent table shape. Consumers coerce [`RawValue`] cells
//! into typed fields; nothing here decides what a missing price means.

use chrono::{DateTime, NaiveDateTime};
use serde::Deserialize;

/// Top-level chart API response: `{"chart": {"result": [...], "error": ...}}`.
#[derive(Debug, Deserialize)]
pub struct ChartResponse {
    pub chart: Chart,
}

#[derive(Debug, Deserialize)]
pub struct Chart {
    pub result: Option<Vec<ChartResult>>,
    pub error: Option<ChartError>,
}

/// Provider-side error carried inside an HTTP 200/404 body.
#[derive(Debug, Deserialize)]
pub struct ChartError {
    pub code: String,
    pub description: String,
}

/// One result block: parallel arrays indexed by `timestamp`.
#[derive(Debug, Deserialize)]
pub struct ChartResult {
    pub timestamp: Option<Vec<i64>>,
    pub indicators: Option<Indicators>,
}

#[derive(Debug, Deserialize)]
pub struct Indicators {
    pub quote: Option<Vec<QuoteBlock>>,
}

/// One OHLCV column set. The provider sends an *array* of these; more than
/// one block means each cell has several candidate values.
#[derive(Debug, Deserialize)]
pub struct QuoteBlock {
    pub open: Option<Vec<serde_json::Value>>,
    pub high: Option<Vec<serde_json::Value>>,
    pub low: Option<Vec<serde_json::Value>>,
    pub close: Option<Vec<serde_json::Value>>,
    pub volume: Option<Vec<serde_json::Value>>,
}

impl QuoteBlock {
    fn column(&self, name: &str) -> Option<&Vec<serde_json::Value>> {
        match name {
            "open" => self.open.as_ref(),
            "high" => self.high.as_ref(),
            "low" => self.low.as_ref(),
            "close" => self.close.as_ref(),
            "volume" => self.volume.as_ref(),
            _ => None,
        }
    }
}

/// Column names of the tabular response, in output order.
pub const COLUMNS: [&str; 5] = ["open", "high", "low", "close", "volume"];

/// A single loosely-typed cell value.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    /// No value present (absent column, JSON null).
    Missing,
    Num(f64),
    Int(i64),
    Text(String),
    /// Several candidate values for one cell (duplicated columns).
    Many(Vec<RawValue>),
}

impl RawValue {
    pub fn from_json(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => RawValue::Missing,
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => RawValue::Int(i),
                None => RawValue::Num(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => RawValue::Text(s),
            serde_json::Value::Array(items) => {
                RawValue::Many(items.into_iter().map(RawValue::from_json).collect())
            }
            other => RawValue::Text(other.to_string()),
        }
    }
}

/// One row of the tabular response: a date index plus named cells.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRow {
    pub index: NaiveDateTime,
    pub fields: Vec<(String, RawValue)>,
}

impl RawRow {
    /// Look up a cell by column name, case-insensitively. Providers are not
    /// consistent about capitalization ("Close" vs "close").
    pub fn get(&self, name: &str) -> Option<&RawValue> {
        self.fields
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v)
    }
}

/// A raw quote response. Some source shapes collapse a one-row answer into a
/// flat record; [`RawQuotes::Single`] models that case.
#[derive(Debug, Clone, PartialEq)]
pub enum RawQuotes {
    Table(Vec<RawRow>),
    Single(RawRow),
}

impl RawQuotes {
    pub fn empty() -> Self {
        RawQuotes::Table(Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        match self {
            RawQuotes::Table(rows) => rows.is_empty(),
            RawQuotes::Single(_) => false,
        }
    }

    /// Coerce either shape into an ordered row sequence.
    pub fn into_rows(self) -> Vec<RawRow> {
        match self {
            RawQuotes::Table(rows) => rows,
            RawQuotes::Single(row) => vec![row],
        }
    }
}

impl ChartResult {
    /// Flatten the parallel-array layout into rows, one per timestamp.
    ///
    /// With more than one quote block the per-cell candidates become a
    /// [`RawValue::Many`]; with exactly one block the cell is that block's
    /// value; with none the cell is missing. Timestamps outside the
    /// representable range are dropped.
    pub fn into_raw(self) -> RawQuotes {
        let timestamps = self.timestamp.unwrap_or_default();
        let blocks = self
            .indicators
            .and_then(|i| i.quote)
            .unwrap_or_default();

        let mut rows = Vec::with_capacity(timestamps.len());
        for (i, ts) in timestamps.into_iter().enumerate() {
            let Some(index) = DateTime::from_timestamp(ts, 0).map(|dt| dt.naive_utc()) else {
                continue;
            };
            let fields = COLUMNS
                .iter()
                .map(|&name| {
                    let mut candidates: Vec<RawValue> = blocks
                        .iter()
                        .filter_map(|b| b.column(name))
                        .map(|col| {
                            col.get(i)
                                .cloned()
                                .map(RawValue::from_json)
                                .unwrap_or(RawValue::Missing)
                        })
                        .collect();
                    let value = match candidates.len() {
                        0 => RawValue::Missing,
                        1 => candidates.swap_remove(0),
                        _ => RawValue::Many(candidates),
                    };
                    (name.to_string(), value)
                })
                .collect();
            rows.push(RawRow { index, fields });
        }
        RawQuotes::Table(rows)
    }
}
