//! Append-only CSV audit log of fetched rows.
//!
//! Unlike the store, the sink never deduplicates: every fetched row is
//! appended, so a row re-fetched across two calls appears twice even though
//! the store ignored the second copy. Single-writer usage is assumed.

use std::fs::{self, OpenOptions};
use std::path::Path;

use crate::model::QuoteRow;

#[derive(thiserror::Error, Debug)]
pub enum SinkError {
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Fixed column order of the audit file.
const HEADER: [&str; 7] = ["ticker", "date", "open", "high", "low", "close", "volume"];

/// Append `rows` to the CSV file at `path`, creating parent directories as
/// needed and writing the header only if the file did not previously exist.
/// Absent numeric fields render as empty cells.
pub fn append(path: impl AsRef<Path>, rows: &[QuoteRow]) -> Result<(), SinkError> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let write_header = !path.exists();
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(file);
    if write_header {
        wtr.write_record(HEADER)?;
    }
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}
