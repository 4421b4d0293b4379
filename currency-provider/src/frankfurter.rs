//! Frankfurter API adapter.
//!
//! Speaks the public Frankfurter endpoints:
//! - `GET /latest?from={base}`
//! - `GET /latest?amount={amount}&from={from}&to={to}`
//! - `GET /{start}..{end}?to={currency}`

use async_trait::async_trait;
use rust_decimal::Decimal;
use tracing::instrument;

use currency_types::{CurrencyCode, ProviderError, RateProvider, RateSeries};

use crate::transport::Transport;

// ─────────────────────────────────────────────────────────────────────────────
// Frankfurter Provider
// ─────────────────────────────────────────────────────────────────────────────

/// Rate provider backed by the Frankfurter API.
///
/// Generic over `T: Transport` so the retry policy (or a test double) is
/// chosen by whoever builds it.
pub struct FrankfurterProvider<T: Transport> {
    transport: T,
}

impl<T: Transport> FrankfurterProvider<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    /// Returns a reference to the underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Body of a 2xx reply, or `None` for any other status.
    async fn get_body(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<Option<String>, ProviderError> {
        let resp = self.transport.get(path, query).await?;
        if resp.is_success() {
            Ok(Some(resp.body))
        } else {
            tracing::info!(path, status = resp.status, "upstream returned no data");
            Ok(None)
        }
    }
}

#[async_trait]
impl<T: Transport> RateProvider for FrankfurterProvider<T> {
    #[instrument(skip(self))]
    async fn fetch_latest(&self, base: &CurrencyCode) -> Result<String, ProviderError> {
        let body = self
            .get_body("/latest", &[("from", base.to_string())])
            .await?;
        Ok(body.unwrap_or_default())
    }

    #[instrument(skip(self))]
    async fn fetch_conversion(
        &self,
        amount: Decimal,
        from: &CurrencyCode,
        to: &CurrencyCode,
    ) -> Result<String, ProviderError> {
        let query = [
            ("amount", amount.normalize().to_string()),
            ("from", from.to_string()),
            ("to", to.to_string()),
        ];
        let body = self.get_body("/latest", &query).await?;
        Ok(body.unwrap_or_default())
    }

    #[instrument(skip(self))]
    async fn fetch_history(
        &self,
        from: &str,
        to: &str,
        currency: &CurrencyCode,
    ) -> Result<Option<RateSeries>, ProviderError> {
        let path = format!("/{}..{}", from, to);
        let Some(body) = self
            .get_body(&path, &[("to", currency.to_string())])
            .await?
        else {
            return Ok(None);
        };

        let series = serde_json::from_str::<RateSeries>(&body)
            .map_err(|e| ProviderError::Decode(e.to_string()))?;
        Ok(Some(series))
    }
}
