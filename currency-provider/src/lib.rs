//! # Currency Provider
//!
//! Concrete rate provider implementation (adapter) for the currency service.
//! This crate provides the Frankfurter HTTP client that implements the
//! `RateProvider` port, layered over a pluggable `Transport`:
//!
//! ```text
//! FrankfurterProvider -> Retry<HttpTransport> -> reqwest
//! ```
//!
//! Retrying lives entirely in the transport layer; the provider and the cache
//! above it never retry.

use std::time::Duration;

use currency_types::ProviderError;

pub mod frankfurter;
pub mod retry;
pub mod transport;


pub use frankfurter::FrankfurterProvider;
pub use retry::{Retry, RetryPolicy};
pub use transport::{HttpTransport, Transport, UpstreamResponse};

/// Settings for the upstream connection.
#[derive(Debug, Clone)]
pub struct ProviderSettings {
    /// Base URL of the Frankfurter API, e.g. `https://api.frankfurter.app`
    pub base_url: String,
    /// Per-request timeout
    pub timeout: Duration,
    pub retry: RetryPolicy,
}

impl ProviderSettings {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: Duration::from_secs(10),
            retry: RetryPolicy::default(),
        }
    }
}

/// Build a ready-to-use Frankfurter provider with retries.
///
/// # Examples
///
/// ```ignore
/// let provider = build_provider(&ProviderSettings::new("https://api.frankfurter.app"))?;
/// let latest = provider.fetch_latest(&"EUR".parse()?).await?;
/// ```
pub fn build_provider(
    settings: &ProviderSettings,
) -> Result<FrankfurterProvider<Retry<HttpTransport>>, ProviderError> {
    let http = HttpTransport::new(&settings.base_url, settings.timeout)?;
    Ok(FrankfurterProvider::new(Retry::new(http, settings.retry)))
}
