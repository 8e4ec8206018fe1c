//! HTTP dispatcher: parameter decoding, pipeline/store calls, and the
//! mapping from domain failures to status codes. No domain logic lives here.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use tokio::sync::Mutex;

use stockfeed_lib::{FetchError, FetchSummary, Fetcher, MultiFetchSummary, QuoteRow, QuoteStore, StoreError};

#[derive(Clone)]
pub struct AppState {
    pub fetcher: Arc<Fetcher>,
    pub store: Arc<Mutex<QuoteStore>>,
    pub default_ticker: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/fetch", post(fetch_and_store))
        .route("/fetch-multiple", post(fetch_multiple))
        .route("/last", get(last_saved))
        .route("/history", get(history))
        .with_state(state)
}

/// A classified failure rendered as `{"detail": "..."}` with a status code.
pub struct ApiError {
    status: StatusCode,
    detail: String,
}

impl ApiError {
    fn not_found(detail: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            detail: detail.into(),
        }
    }

    fn internal(detail: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            detail: detail.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "detail": self.detail }))).into_response()
    }
}

impl From<FetchError> for ApiError {
    fn from(e: FetchError) -> Self {
        let status = match e {
            FetchError::NoData(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            detail: e.to_string(),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        Self::internal(e.to_string())
    }
}

fn default_period() -> String {
    "5d".to_string()
}

fn default_interval() -> String {
    "1d".to_string()
}

#[derive(Deserialize)]
pub struct FetchParams {
    ticker: Option<String>,
    #[serde(default = "default_period")]
    period: String,
}

async fn fetch_and_store(
    State(state): State<AppState>,
    Query(params): Query<FetchParams>,
) -> Result<Json<FetchSummary>, ApiError> {
    let ticker = params
        .ticker
        .unwrap_or_else(|| state.default_ticker.clone());
    let summary = state.fetcher.fetch_and_store(&ticker, &params.period).await?;
    Ok(Json(summary))
}

#[derive(Deserialize)]
pub struct MultiFetchParams {
    tickers: String,
    #[serde(default = "default_period")]
    period: String,
    #[serde(default = "default_interval")]
    interval: String,
}

async fn fetch_multiple(
    State(state): State<AppState>,
    Query(params): Query<MultiFetchParams>,
) -> Result<Json<MultiFetchSummary>, ApiError> {
    let tickers: Vec<String> = params
        .tickers
        .split(',')
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect();
    // Unlike the single-ticker path, any failure here is a generic one.
    let summary = state
        .fetcher
        .fetch_multiple(&tickers, &params.period, &params.interval)
        .await
        .map_err(|e| ApiError::internal(e.to_string()))?;
    Ok(Json(summary))
}

async fn last_saved(State(state): State<AppState>) -> Result<Json<QuoteRow>, ApiError> {
    let latest = state.store.lock().await.latest()?;
    match latest {
        Some(quote) => Ok(Json(quote)),
        None => Err(ApiError::not_found("No saved quotes")),
    }
}

#[derive(Deserialize)]
pub struct HistoryParams {
    ticker: Option<String>,
}

async fn history(
    State(state): State<AppState>,
    Query(params): Query<HistoryParams>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let data = state.store.lock().await.history(params.ticker.as_deref())?;
    Ok(Json(json!({ "count": data.len(), "data": data })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_data_maps_to_not_found() {
        let err = ApiError::from(FetchError::NoData("NOPE".to_string()));
        assert_eq!(err.status, StatusCode::NOT_FOUND);
        assert!(err.detail.contains("NOPE"));
    }

    #[test]
    fn decode_failure_maps_to_internal() {
        let err = ApiError::from(FetchError::Decode("bad cell".to_string()));
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn query_params_apply_defaults() {
        let params: FetchParams = serde_json::from_str("{}").unwrap();
        assert_eq!(params.ticker, None);
        assert_eq!(params.period, "5d");

        let params: MultiFetchParams =
            serde_json::from_str(r#"{"tickers": "AAA,BBB"}"#).unwrap();
        assert_eq!(params.period, "5d");
        assert_eq!(params.interval, "1d");
    }
}
