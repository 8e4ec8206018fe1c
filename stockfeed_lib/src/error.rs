//! Error taxonomy of the fetch pipeline.
//!
//! The pipeline classifies and forwards; it never recovers. Only the HTTP
//! boundary turns these into status codes (`NoData` is the one "not found"
//! outcome, everything else is a generic failure).

use crate::sink::SinkError;
use crate::store::StoreError;

#[derive(thiserror::Error, Debug)]
pub enum FetchError {
    /// The source returned nothing usable for the ticker/period.
    #[error("No data for ticker: {0}")]
    NoData(String),
    /// The source returned a present-but-non-numeric value. A contract
    /// violation, not user error.
    #[error("Malformed quote data: {0}")]
    Decode(String),
    /// The backing store failed. Never masked.
    #[error(transparent)]
    Storage(#[from] StoreError),
    /// The CSV audit log could not be written.
    #[error(transparent)]
    Sink(#[from] SinkError),
    /// Any other source-call failure (network, status, parse).
    #[error("Quote source request failed: {0}")]
    Source(#[from] stockfeed_api::Error),
}
