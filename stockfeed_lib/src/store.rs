//! SQLite storage for quote history.

use std::fs;
use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension};

use crate::model::QuoteRow;

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Durable `(ticker, date)`-keyed quote table.
///
/// The store is the sole writer of the table and owns the uniqueness
/// constraint; duplicate fetches are deduplicated here, not upstream.
pub struct QuoteStore {
    conn: Connection,
}

impl QuoteStore {
    /// Open (or create) the database at `path`, creating missing parent
    /// directories first.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path)?;
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;",
        )?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;",
        )?;
        Ok(Self { conn })
    }

    /// Create the quotes table if absent. Idempotent, safe on every start.
    pub fn init(&self) -> Result<(), StoreError> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS quotes (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                ticker TEXT NOT NULL,
                date TEXT NOT NULL,
                open REAL,
                high REAL,
                low REAL,
                close REAL,
                volume INTEGER,
                UNIQUE(ticker, date)
            )",
            [],
        )?;
        Ok(())
    }

    /// Insert rows, silently skipping `(ticker, date)` collisions.
    ///
    /// Returns the number of rows newly inserted, not the number attempted.
    /// The batch runs in one transaction: a storage failure rolls the whole
    /// batch back. Empty input returns 0 without touching storage.
    pub fn bulk_insert(&mut self, rows: &[QuoteRow]) -> Result<usize, StoreError> {
        if rows.is_empty() {
            return Ok(0);
        }
        let tx = self.conn.transaction()?;
        let mut inserted = 0;
        {
            let mut stmt = tx.prepare(
                "INSERT OR IGNORE INTO quotes (ticker, date, open, high, low, close, volume)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            )?;
            for row in rows {
                inserted += stmt.execute(params![
                    row.ticker,
                    row.date,
                    row.open,
                    row.high,
                    row.low,
                    row.close,
                    row.volume
                ])?;
            }
        }
        tx.commit()?;
        Ok(inserted)
    }

    /// The row with the greatest `date` across all tickers, or `None` on an
    /// empty or never-initialized store. Tie-break on equal dates is
    /// unspecified.
    pub fn latest(&self) -> Result<Option<QuoteRow>, StoreError> {
        let result = self
            .conn
            .query_row(
                "SELECT ticker, date, open, high, low, close, volume FROM quotes
                 ORDER BY date DESC LIMIT 1",
                [],
                row_to_quote,
            )
            .optional();
        match result {
            Ok(row) => Ok(row),
            Err(ref e) if is_missing_table(e) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// All rows ascending by `date`, optionally filtered to one ticker
    /// (matched case-insensitively against the stored upper-case symbol).
    /// A never-initialized store yields an empty sequence, not an error.
    pub fn history(&self, ticker: Option<&str>) -> Result<Vec<QuoteRow>, StoreError> {
        let result = (|| -> rusqlite::Result<Vec<QuoteRow>> {
            match ticker {
                Some(t) => {
                    let mut stmt = self.conn.prepare(
                        "SELECT ticker, date, open, high, low, close, volume FROM quotes
                         WHERE ticker = ?1 ORDER BY date ASC",
                    )?;
                    let rows = stmt.query_map(params![t.to_uppercase()], row_to_quote)?;
                    rows.collect()
                }
                None => {
                    let mut stmt = self.conn.prepare(
                        "SELECT ticker, date, open, high, low, close, volume FROM quotes
                         ORDER BY date ASC",
                    )?;
                    let rows = stmt.query_map([], row_to_quote)?;
                    rows.collect()
                }
            }
        })();
        match result {
            Ok(rows) => Ok(rows),
            Err(ref e) if is_missing_table(e) => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }
}

fn row_to_quote(row: &rusqlite::Row<'_>) -> rusqlite::Result<QuoteRow> {
    Ok(QuoteRow {
        ticker: row.get(0)?,
        date: row.get(1)?,
        open: row.get(2)?,
        high: row.get(3)?,
        low: row.get(4)?,
        close: row.get(5)?,
        volume: row.get(6)?,
    })
}

fn is_missing_table(e: &rusqlite::Error) -> bool {
    matches!(e, rusqlite::Error::SqliteFailure(_, Some(msg)) if msg.contains("no such table"))
}
