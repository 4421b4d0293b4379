//! Exchange rate provider port.
//!
//! This trait defines the interface for upstream rate services.
//! Implementations can be HTTP clients, mock providers, etc.

use rust_decimal::Decimal;

use crate::domain::{CurrencyCode, RateSeries};
use crate::error::ProviderError;

/// Port trait for exchange rate providers.
///
/// Each call performs one logical upstream request. When the upstream answers
/// with a non-success status the call succeeds with "no data" (an empty
/// payload or `None`); only transport and decoding failures are errors.
#[async_trait::async_trait]
pub trait RateProvider: Send + Sync + 'static {
    /// Latest rates against `base`, as the raw provider JSON.
    async fn fetch_latest(&self, base: &CurrencyCode) -> Result<String, ProviderError>;

    /// Converts `amount` of `from` into `to`, as the raw provider JSON.
    async fn fetch_conversion(
        &self,
        amount: Decimal,
        from: &CurrencyCode,
        to: &CurrencyCode,
    ) -> Result<String, ProviderError>;

    /// Daily rates for `currency` between two `yyyy-MM-dd` dates inclusive.
    async fn fetch_history(
        &self,
        from: &str,
        to: &str,
        currency: &CurrencyCode,
    ) -> Result<Option<RateSeries>, ProviderError>;
}
