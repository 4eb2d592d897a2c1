use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;

use super::traits::BacktestBackend;
use crate::errors::CoreError;
use crate::models::request::BacktestRequest;
use crate::models::result::BacktestResult;
use crate::models::settings::DEFAULT_ENDPOINT;

const PROVIDER: &str = "BacktestService";

/// Longest slice of an error body kept in the error message.
const MAX_ERROR_BODY: usize = 200;

/// Backtest service reached over HTTP.
///
/// - **Endpoint**: a single URL, `POST` only.
/// - **Body**: the JSON-encoded [`BacktestRequest`], `Content-Type: application/json`.
/// - **Reply**: any 2xx status with a JSON [`BacktestResult`] body.
///
/// No timeout is configured: a hung backend keeps the submission pending.
pub struct HttpBackend {
    client: Client,
    endpoint: String,
}

impl HttpBackend {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: Client::builder().build().unwrap_or_else(|_| Client::new()),
            endpoint: endpoint.into(),
        }
    }

    /// Use a preconfigured client (proxies, custom TLS roots, ...).
    pub fn with_client(client: Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl Default for HttpBackend {
    fn default() -> Self {
        Self::new(DEFAULT_ENDPOINT)
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl BacktestBackend for HttpBackend {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn submit(&self, request: &BacktestRequest) -> Result<BacktestResult, CoreError> {
        let body = serde_json::to_vec(request)
            .map_err(|e| CoreError::Serialization(format!("Failed to encode request: {e}")))?;

        tracing::debug!(
            endpoint = %self.endpoint,
            method = %request.method,
            tickers = request.tickers.len(),
            "posting backtest request"
        );

        let resp = self
            .client
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            let message: String = text.chars().take(MAX_ERROR_BODY).collect();
            return Err(CoreError::Api {
                provider: PROVIDER.into(),
                status: status.as_u16(),
                message: if message.is_empty() {
                    status.canonical_reason().unwrap_or("request failed").into()
                } else {
                    message
                },
            });
        }

        let bytes = resp.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| {
            CoreError::Deserialization(format!("Failed to parse backtest response: {e}"))
        })
    }
}
