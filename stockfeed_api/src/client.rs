//! HTTP client for the Yahoo Finance v8 chart API.

use std::time::Duration;

use url::Url;

use crate::types::{ChartResponse, RawQuotes};
use crate::user_agent::get_user_agent;
use crate::Error;

/// Request timeout for chart API calls.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Client for downloading OHLCV history for one ticker.
///
/// An unknown ticker or an empty window is *not* an error here: the client
/// returns an empty [`RawQuotes`] and leaves the no-data classification to
/// the caller. Only transport and protocol failures surface as [`Error`].
pub struct ChartClient {
    client: reqwest::Client,
    base_url: String,
}

impl ChartClient {
    /// Create a client pointing at the production chart endpoint.
    pub fn new() -> Result<Self, Error> {
        Self::with_base_url("https://query1.finance.yahoo.com")
    }

    /// Create a client with a custom base URL. Used for testing with wiremock.
    pub fn with_base_url(base_url: &str) -> Result<Self, Error> {
        let client = reqwest::Client::builder()
            .user_agent(get_user_agent())
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| {
                tracing::error!("Failed to build HTTP client: {}", e);
                Error::RequestFailed
            })?;
        Ok(Self {
            client,
            base_url: base_url.to_string(),
        })
    }

    /// Download quote history for `ticker` over `period` (e.g. "5d") sampled
    /// at `interval` (e.g. "1d").
    pub async fn download(
        &self,
        ticker: &str,
        period: &str,
        interval: &str,
    ) -> Result<RawQuotes, Error> {
        let url = Url::parse(&format!("{}/v8/finance/chart/{}", self.base_url, ticker))
            .map_err(|e| {
                tracing::error!("Invalid URL constructed: {}", e);
                Error::RequestFailed
            })?;

        let resp = self
            .client
            .get(url)
            .query(&[("range", period), ("interval", interval)])
            .header("accept", "application/json")
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to reach quote source: {}", e);
                Error::RequestFailed
            })?;

        let status = resp.status();

        // The chart endpoint answers 404 for unknown tickers, with the
        // error detail inside a chart.error body. Treat it as no data.
        if status == reqwest::StatusCode::NOT_FOUND {
            tracing::debug!("No chart data for ticker {} (HTTP 404)", ticker);
            return Ok(RawQuotes::empty());
        }

        let body = resp.text().await.map_err(|e| {
            tracing::error!("Failed to read response body: {}", e);
            Error::RequestFailed
        })?;

        if !status.is_success() {
            let snippet = truncate_body(&body);
            tracing::error!("Chart request failed with status {}: {}", status, snippet);
            return Err(Error::HttpStatus {
                status: status.as_u16(),
                body: snippet,
            });
        }

        let parsed = serde_json::from_str::<ChartResponse>(&body).map_err(|e| {
            tracing::error!("Failed to parse chart response: {} | body: {}", e, truncate_body(&body));
            Error::RequestFailed
        })?;

        if let Some(err) = parsed.chart.error {
            tracing::debug!(
                "Chart error for ticker {}: {} ({})",
                ticker,
                err.description,
                err.code
            );
            return Ok(RawQuotes::empty());
        }

        let Some(result) = parsed.chart.result.and_then(|mut r| {
            if r.is_empty() {
                None
            } else {
                Some(r.remove(0))
            }
        }) else {
            return Ok(RawQuotes::empty());
        };

        Ok(result.into_raw())
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 500;
    if body.len() <= MAX {
        body.to_string()
    } else {
        format!("{}...[truncated]", &body[..MAX])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RawValue;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn sample_chart_json() -> serde_json::Value {
        serde_json::json!({
            "chart": {
                "result": [{
                    "meta": { "currency": "USD", "symbol": "AAPL" },
                    "timestamp": [1735689600, 1735776000],
                    "indicators": {
                        "quote": [{
                            "open": [1.0, 2.0],
                            "high": [1.1, 2.2],
                            "low": [0.9, 1.8],
                            "close": [1.05, 2.05],
                            "volume": [100, 200]
                        }]
                    }
                }],
                "error": null
            }
        })
    }

    #[tokio::test]
    async fn success_returns_rows() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v8/finance/chart/AAPL"))
            .and(query_param("range", "5d"))
            .and(query_param("interval", "1d"))
            .respond_with(ResponseTemplate::new(200).set_body_json(sample_chart_json()))
            .mount(&server)
            .await;

        let client = ChartClient::with_base_url(&server.uri()).unwrap();
        let raw = client.download("AAPL", "5d", "1d").await.unwrap();

        let rows = raw.into_rows();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("close"), Some(&RawValue::Num(1.05)));
        assert_eq!(rows[1].get("volume"), Some(&RawValue::Int(200)));
    }

    #[tokio::test]
    async fn not_found_returns_empty() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v8/finance/chart/NOPE"))
            .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
                "chart": {
                    "result": null,
                    "error": { "code": "Not Found", "description": "No data found, symbol may be delisted" }
                }
            })))
            .mount(&server)
            .await;

        let client = ChartClient::with_base_url(&server.uri()).unwrap();
        let raw = client.download("NOPE", "5d", "1d").await.unwrap();
        assert!(raw.is_empty());
    }

    #[tokio::test]
    async fn chart_error_body_returns_empty() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v8/finance/chart/BAD"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "chart": {
                    "result": null,
                    "error": { "code": "Bad Request", "description": "Invalid range" }
                }
            })))
            .mount(&server)
            .await;

        let client = ChartClient::with_base_url(&server.uri()).unwrap();
        let raw = client.download("BAD", "5d", "1d").await.unwrap();
        assert!(raw.is_empty());
    }

    #[tokio::test]
    async fn server_error_is_http_status() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v8/finance/chart/AAPL"))
            .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
            .mount(&server)
            .await;

        let client = ChartClient::with_base_url(&server.uri()).unwrap();
        let result = client.download("AAPL", "5d", "1d").await;

        match result {
            Err(Error::HttpStatus { status, .. }) => assert_eq!(status, 500),
            other => panic!("expected HttpStatus error, got {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test]
    async fn malformed_json_is_request_failed() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v8/finance/chart/AAPL"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{not valid json}"))
            .mount(&server)
            .await;

        let client = ChartClient::with_base_url(&server.uri()).unwrap();
        let result = client.download("AAPL", "5d", "1d").await;
        assert!(matches!(result, Err(Error::RequestFailed)));
    }

    #[tokio::test]
    async fn null_cells_survive_as_missing() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v8/finance/chart/THIN"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "chart": {
                    "result": [{
                        "timestamp": [1735689600],
                        "indicators": { "quote": [{ "close": [null], "volume": [null] }] }
                    }],
                    "error": null
                }
            })))
            .mount(&server)
            .await;

        let client = ChartClient::with_base_url(&server.uri()).unwrap();
        let rows = client.download("THIN", "1d", "1d").await.unwrap().into_rows();
        assert_eq!(rows[0].get("close"), Some(&RawValue::Missing));
        assert_eq!(rows[0].get("volume"), Some(&RawValue::Missing));
    }
}
