//! Process configuration.
//!
//! A [`Settings`] value is constructed once at startup and passed by
//! parameter into the store, sink, and pipeline — core logic never reads
//! ambient global state. The binary loads an optional `.env` file (dotenvy)
//! before calling [`Settings::from_env`].

use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Settings {
    /// SQLite database location.
    pub db_path: PathBuf,
    /// CSV audit log location.
    pub csv_path: PathBuf,
    /// Symbol used when a fetch request names no ticker.
    pub default_ticker: String,
    /// Address the HTTP server binds to.
    pub bind_addr: String,
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            db_path: get("DB_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("data/quotes.db")),
            csv_path: get("CSV_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("data/quotes.csv")),
            default_ticker: get("DEFAULT_TICKER").unwrap_or_else(|| "AAPL".to_string()),
            bind_addr: get("BIND_ADDR").unwrap_or_else(|| "127.0.0.1:8000".to_string()),
        }
    }
}
