//! REST API client for the playground backend.
//!
//! Wraps the `/execute` and `/compile` endpoints using [`reqwest`].
//! Bodies are read as text first so an undecodable reply can be told
//! apart from a transport failure.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::ClientConfig;
use crate::wire::{
    CompileRequest, CompileResponse, ExecuteRequest, ExecuteResponse, COMPILE_PATH, EXECUTE_PATH,
};

/// HTTP client for a single playground backend.
pub struct PlaygroundApi {
    client: reqwest::Client,
    base_url: String,
}

/// Errors from the playground REST API layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The backend returned a non-2xx status code.
    #[error("Playground API error ({status}): {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// A 2xx body that does not match the expected shape.
    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl PlaygroundApi {
    /// Create a client from configuration.
    ///
    /// The per-request HTTP timeout comes from
    /// [`ClientConfig::http_timeout`].
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .user_agent(concat!("rustplay/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self::with_client(client, &config.base_url))
    }

    /// Create an API client reusing an existing [`reqwest::Client`]
    /// (useful for connection pooling across sessions).
    pub fn with_client(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Base URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build, run, or test code via `POST /execute`.
    pub async fn execute(&self, body: &ExecuteRequest<'_>) -> Result<ExecuteResponse, ApiError> {
        self.post(EXECUTE_PATH, body).await
    }

    /// Emit an intermediate form via `POST /compile`.
    pub async fn compile(&self, body: &CompileRequest<'_>) -> Result<CompileResponse, ApiError> {
        self.post(COMPILE_PATH, body).await
    }

    // ---- private helpers ----

    /// POST `body` as JSON to `path` and decode the JSON reply.
    pub(crate) async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(url = %url, "Sending playground request");

        let response = self.client.post(url).json(body).send().await?;
        Self::parse_response(response).await
    }

    /// Ensure the response has a success status code. Returns the
    /// response unchanged on success, or an [`ApiError::Status`]
    /// containing the status and body text on failure.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    /// Parse a successful JSON response body into the expected type.
    async fn parse_response<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
        let response = Self::ensure_success(response).await?;
        let text = response.text().await?;
        Ok(serde_json::from_str(&text)?)
    }
}
