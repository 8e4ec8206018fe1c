//! Core of the stockfeed service: normalize loosely-typed provider quotes
//! into fixed-shape rows, persist them to SQLite with idempotent bulk
//! inserts, mirror every fetched row to an append-only CSV audit log, and
//! answer the read queries the HTTP layer exposes.

pub mod config;
pub mod error;
pub mod model;
pub mod normalize;
pub mod pipeline;
pub mod sink;
pub mod store;

pub use stockfeed_api;

pub use config::Settings;
pub use error::FetchError;
pub use model::{FetchSummary, MultiFetchSummary, QuoteRow};
pub use pipeline::Fetcher;
pub use sink::SinkError;
pub use store::{QuoteStore, StoreError};
