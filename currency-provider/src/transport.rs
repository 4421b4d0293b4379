//! Outbound HTTP transport.

use std::time::Duration;

use async_trait::async_trait;
use currency_types::ProviderError;

/// Status and body of an upstream reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamResponse {
    pub status: u16,
    pub body: String,
}

impl UpstreamResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// True for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Port for issuing GET requests against the upstream base URL.
///
/// Any HTTP status is a successful `Ok`; `Err` means the request could not be
/// completed at all (connection refused, timeout, unreadable body).
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    async fn get(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<UpstreamResponse, ProviderError>;
}

/// `reqwest`-backed transport bound to one base URL.
pub struct HttpTransport {
    base_url: String,
    client: reqwest::Client,
}

impl HttpTransport {
    /// Creates a transport with its own client and request timeout.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProviderError::Transport(e.to_string()))?;
        Self::with_client(base_url, client)
    }

    /// Creates a transport around an existing client.
    pub fn with_client(base_url: &str, client: reqwest::Client) -> Result<Self, ProviderError> {
        let base_url = base_url.trim_end_matches('/').to_string();
        reqwest::Url::parse(&base_url)
            .map_err(|e| ProviderError::InvalidBaseUrl(format!("{}: {}", base_url, e)))?;
        Ok(Self { base_url, client })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<UpstreamResponse, ProviderError> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(%url, ?query, "upstream request");

        let resp = self
            .client
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        let status = resp.status().as_u16();
        let body = resp
            .text()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        tracing::debug!(%url, status, "upstream response");
        Ok(UpstreamResponse { status, body })
    }
}
