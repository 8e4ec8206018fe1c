//! Client for the Yahoo Finance v8 chart API.
//!
//! Exposes [`ChartClient`] for downloading OHLCV history and the neutral
//! tabular types ([`types::RawQuotes`], [`types::RawRow`], [`types::RawValue`])
//! that downstream code normalizes. The wire format is treated as untrusted:
//! every field is optional and cell values are kept loosely typed.

mod client;
mod errors;
pub mod types;
mod user_agent;

pub use self::client::ChartClient;
pub use self::errors::Error;
