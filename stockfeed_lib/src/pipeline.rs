//! Fetch pipeline: download, normalize, persist, audit.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::Mutex;

use stockfeed_api::ChartClient;

use crate::error::FetchError;
use crate::model::{FetchSummary, MultiFetchSummary, QuoteRow};
use crate::normalize;
use crate::sink;
use crate::store::QuoteStore;

/// Sampling granularity of the single-ticker flow.
const DEFAULT_INTERVAL: &str = "1d";

/// Orchestrates one fetch at a time: source call, normalization, store
/// insert, CSV append. The store is shared with the read endpoints behind a
/// mutex; each request runs the pipeline to completion before returning.
pub struct Fetcher {
    client: ChartClient,
    store: Arc<Mutex<QuoteStore>>,
    csv_path: PathBuf,
}

impl Fetcher {
    pub fn new(
        client: ChartClient,
        store: Arc<Mutex<QuoteStore>>,
        csv_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            client,
            store,
            csv_path: csv_path.into(),
        }
    }

    /// Fetch OHLCV history for `ticker` over `period`, persist it, and
    /// mirror it to the CSV audit log.
    ///
    /// Rows already present in the store are skipped (`inserted` counts only
    /// new rows), but the CSV append happens regardless: the audit trail is
    /// intentionally non-deduplicated. There is no cross-store transaction;
    /// a crash between insert and append leaves the store ahead of the CSV.
    pub async fn fetch_and_store(
        &self,
        ticker: &str,
        period: &str,
    ) -> Result<FetchSummary, FetchError> {
        let raw = self.client.download(ticker, period, DEFAULT_INTERVAL).await?;
        let rows = normalize::normalize(ticker, raw)?;

        let inserted = {
            let mut store = self.store.lock().await;
            store.bulk_insert(&rows)?
        };
        sink::append(&self.csv_path, &rows)?;

        let summary = FetchSummary {
            ticker: ticker.to_uppercase(),
            fetched: rows.len(),
            inserted,
        };
        tracing::info!(
            "Fetched {} rows for {} ({} newly inserted)",
            summary.fetched,
            summary.ticker,
            summary.inserted
        );
        Ok(summary)
    }

    /// Fetch and normalize several tickers without persisting anything.
    ///
    /// All-or-nothing: the first failing ticker (including one with no data)
    /// aborts the whole batch.
    pub async fn fetch_multiple(
        &self,
        tickers: &[String],
        period: &str,
        interval: &str,
    ) -> Result<MultiFetchSummary, FetchError> {
        let mut data: Vec<QuoteRow> = Vec::new();
        for ticker in tickers {
            let raw = self.client.download(ticker, period, interval).await?;
            data.extend(normalize::normalize(ticker, raw)?);
        }
        Ok(MultiFetchSummary {
            fetched: data.len(),
            data,
        })
    }
}
