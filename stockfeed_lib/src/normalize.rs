//! Row normalizer: loosely-typed tabular quotes into fixed-shape [`QuoteRow`]s.
//!
//! Coercion rules: an absent column, a JSON null, or a NaN all map to an
//! absent output field; a multi-candidate cell resolves to its first
//! non-missing candidate; a present-but-non-numeric value is a contract
//! violation and fails loudly. Only genuine missingness becomes `None`.

use stockfeed_api::types::{RawQuotes, RawRow, RawValue};

use crate::error::FetchError;
use crate::model::QuoteRow;

/// Render format for the row's date index: ISO-8601, no timezone.
const DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Normalize a raw quote response for one ticker, preserving source row order.
///
/// An empty response signals [`FetchError::NoData`]; a single flat record is
/// coerced to a one-row table before per-field extraction.
pub fn normalize(ticker: &str, raw: RawQuotes) -> Result<Vec<QuoteRow>, FetchError> {
    if raw.is_empty() {
        return Err(FetchError::NoData(ticker.to_string()));
    }

    let symbol = ticker.to_uppercase();
    let rows = raw.into_rows();
    let mut out = Vec::with_capacity(rows.len());
    for row in rows {
        out.push(QuoteRow {
            ticker: symbol.clone(),
            date: row.index.format(DATE_FORMAT).to_string(),
            open: price_field(&row, "open")?,
            high: price_field(&row, "high")?,
            low: price_field(&row, "low")?,
            close: price_field(&row, "close")?,
            volume: volume_field(&row, "volume")?,
        });
    }
    Ok(out)
}

/// Resolve a cell to a single present value: `Many` picks the first
/// non-missing candidate, `Missing` resolves to nothing.
fn scalar(value: &RawValue) -> Option<&RawValue> {
    match value {
        RawValue::Missing => None,
        RawValue::Many(candidates) => candidates.iter().find_map(scalar),
        other => Some(other),
    }
}

fn price_field(row: &RawRow, name: &str) -> Result<Option<f64>, FetchError> {
    let Some(value) = row.get(name).and_then(scalar) else {
        return Ok(None);
    };
    match value {
        RawValue::Num(f) if !f.is_finite() => Ok(None),
        RawValue::Num(f) => Ok(Some(*f)),
        RawValue::Int(i) => Ok(Some(*i as f64)),
        RawValue::Text(s) => Err(FetchError::Decode(format!(
            "non-numeric value {:?} in column {}",
            s, name
        ))),
        // scalar() never yields these
        RawValue::Missing | RawValue::Many(_) => Ok(None),
    }
}

fn volume_field(row: &RawRow, name: &str) -> Result<Option<i64>, FetchError> {
    let Some(value) = row.get(name).and_then(scalar) else {
        return Ok(None);
    };
    match value {
        RawValue::Int(i) => Ok(Some(*i)),
        RawValue::Num(f) if !f.is_finite() => Ok(None),
        RawValue::Num(f) => Ok(Some(*f as i64)),
        RawValue::Text(s) => Err(FetchError::Decode(format!(
            "non-numeric value {:?} in column {}",
            s, name
        ))),
        RawValue::Missing | RawValue::Many(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};

    fn day(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn row(index: NaiveDateTime, fields: Vec<(&str, RawValue)>) -> RawRow {
        RawRow {
            index,
            fields: fields
                .into_iter()
                .map(|(n, v)| (n.to_string(), v))
                .collect(),
        }
    }

    fn full_row(index: NaiveDateTime, o: f64, h: f64, l: f64, c: f64, v: i64) -> RawRow {
        row(
            index,
            vec![
                ("open", RawValue::Num(o)),
                ("high", RawValue::Num(h)),
                ("low", RawValue::Num(l)),
                ("close", RawValue::Num(c)),
                ("volume", RawValue::Int(v)),
            ],
        )
    }

    #[test]
    fn two_row_table_normalizes_in_order() {
        let raw = RawQuotes::Table(vec![
            full_row(day(2025, 1, 1), 1.0, 1.1, 0.9, 1.05, 100),
            full_row(day(2025, 1, 2), 2.0, 2.2, 1.8, 2.05, 200),
        ]);

        let rows = normalize("mock", raw).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].ticker, "MOCK");
        assert_eq!(rows[0].date, "2025-01-01T00:00:00");
        assert_eq!(rows[0].close, Some(1.05));
        assert_eq!(rows[1].date, "2025-01-02T00:00:00");
        assert_eq!(rows[1].close, Some(2.05));
    }

    #[test]
    fn empty_table_is_no_data() {
        let result = normalize("BAD", RawQuotes::Table(vec![]));
        match result {
            Err(FetchError::NoData(ticker)) => assert_eq!(ticker, "BAD"),
            other => panic!("expected NoData, got {:?}", other),
        }
    }

    #[test]
    fn single_record_coerces_to_one_row() {
        let raw = RawQuotes::Single(full_row(day(2025, 3, 7), 10.0, 11.0, 9.0, 10.5, 500));

        let rows = normalize("aapl", raw).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].ticker, "AAPL");
        assert_eq!(rows[0].date, "2025-03-07T00:00:00");
        assert_eq!(rows[0].volume, Some(500));
    }

    #[test]
    fn missing_and_nan_fields_are_absent() {
        let raw = RawQuotes::Table(vec![row(
            day(2025, 1, 1),
            vec![
                ("open", RawValue::Missing),
                ("close", RawValue::Num(f64::NAN)),
                ("volume", RawValue::Num(f64::NAN)),
            ],
        )]);

        let rows = normalize("X", raw).unwrap();
        assert_eq!(rows[0].open, None);
        assert_eq!(rows[0].high, None); // column absent entirely
        assert_eq!(rows[0].close, None);
        assert_eq!(rows[0].volume, None);
    }

    #[test]
    fn multi_candidate_cell_takes_first_present() {
        let raw = RawQuotes::Table(vec![row(
            day(2025, 1, 1),
            vec![
                (
                    "close",
                    RawValue::Many(vec![RawValue::Missing, RawValue::Num(3.25)]),
                ),
                (
                    "open",
                    RawValue::Many(vec![RawValue::Missing, RawValue::Missing]),
                ),
            ],
        )]);

        let rows = normalize("X", raw).unwrap();
        assert_eq!(rows[0].close, Some(3.25));
        assert_eq!(rows[0].open, None);
    }

    #[test]
    fn non_numeric_value_fails_loudly() {
        let raw = RawQuotes::Table(vec![row(
            day(2025, 1, 1),
            vec![("close", RawValue::Text("n/a".to_string()))],
        )]);

        let result = normalize("X", raw);
        assert!(matches!(result, Err(FetchError::Decode(_))));
    }

    #[test]
    fn column_lookup_is_case_insensitive() {
        let raw = RawQuotes::Table(vec![row(
            day(2025, 1, 1),
            vec![("Close", RawValue::Num(9.5)), ("VOLUME", RawValue::Int(7))],
        )]);

        let rows = normalize("X", raw).unwrap();
        assert_eq!(rows[0].close, Some(9.5));
        assert_eq!(rows[0].volume, Some(7));
    }

    #[test]
    fn integer_prices_and_float_volumes_coerce() {
        let raw = RawQuotes::Table(vec![row(
            day(2025, 1, 1),
            vec![
                ("close", RawValue::Int(42)),
                ("volume", RawValue::Num(1234.0)),
            ],
        )]);

        let rows = normalize("X", raw).unwrap();
        assert_eq!(rows[0].close, Some(42.0));
        assert_eq!(rows[0].volume, Some(1234));
    }
}
