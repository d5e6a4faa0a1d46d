//! REST client for the long-running video generation endpoints.
//!
//! Wraps job submission, operation status queries and artifact download
//! using [`reqwest`]. Every call authenticates with the API key header.

use crate::messages::{Operation, PredictRequest};

/// Header carrying the API key on every request.
pub const API_KEY_HEADER: &str = "x-goog-api-key";

/// HTTP client for one generation API endpoint.
#[derive(Clone)]
pub struct VeoApi {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
}

/// Errors from the REST layer.
#[derive(Debug, thiserror::Error)]
pub enum VeoApiError {
    /// The HTTP request itself failed (network, DNS, TLS, decoding).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The API returned a non-2xx status code.
    #[error("Generation API error ({status}): {body}")]
    ApiError {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },
}

impl VeoApiError {
    /// HTTP status of the failed response, if one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Request(e) => e.status().map(|s| s.as_u16()),
            Self::ApiError { status, .. } => Some(*status),
        }
    }
}

impl VeoApi {
    /// Create a client for `api_url`, e.g.
    /// `https://generativelanguage.googleapis.com/v1beta`.
    pub fn new(api_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), api_url, api_key)
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(
        client: reqwest::Client,
        api_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        let api_url: String = api_url.into();
        Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Submit a generation job for `model`.
    ///
    /// Sends `POST /models/{model}:predictLongRunning` and returns the
    /// operation handle to poll.
    pub async fn submit(
        &self,
        model: &str,
        request: &PredictRequest,
    ) -> Result<Operation, VeoApiError> {
        let response = self
            .client
            .post(format!("{}/models/{model}:predictLongRunning", self.api_url))
            .header(API_KEY_HEADER, &self.api_key)
            .json(request)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// Fetch the current state of an operation by its resource name.
    pub async fn get_operation(&self, name: &str) -> Result<Operation, VeoApiError> {
        let response = self
            .client
            .get(format!("{}/{}", self.api_url, name.trim_start_matches('/')))
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// Download the binary artifact at `uri`.
    pub async fn download(&self, uri: &str) -> Result<Vec<u8>, VeoApiError> {
        let response = self
            .client
            .get(uri)
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await?;

        let response = Self::ensure_success(response).await?;
        Ok(response.bytes().await?.to_vec())
    }

    // ---- private helpers ----

    /// Return the response unchanged on success, or an
    /// [`VeoApiError::ApiError`] carrying status and body on failure.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, VeoApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(VeoApiError::ApiError {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, VeoApiError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }
}
