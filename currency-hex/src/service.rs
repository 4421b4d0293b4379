//! Currency Application Service
//!
//! Validates requests, derives cache keys, and reads rates through the
//! cache-aside store. Contains NO infrastructure logic - the upstream is
//! reached only through the `RateProvider` port.

use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use rust_decimal::Decimal;

use currency_cache::CacheAside;
use currency_types::{
    AppError, ConvertQuery, CurrencyCode, DailyRates, HistoryQuery, LatestQuery, ProviderError,
    RateProvider, parse_iso_date,
};

const CURRENCY_LENGTH_MSG: &str = "The currency code should be in 3 characters";

/// Tunables for the service, usually read from the environment.
#[derive(Debug, Clone)]
pub struct ServiceSettings {
    /// How long a provider answer is served from cache. Zero disables caching.
    pub cache_ttl: Duration,
    /// Currency codes (upper case) that may not be converted from or to.
    pub exclusion_list: HashSet<String>,
    /// Whether empty provider answers ("no data") are cached too.
    pub cache_empty_results: bool,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            cache_ttl: Duration::from_secs(60),
            exclusion_list: HashSet::new(),
            cache_empty_results: true,
        }
    }
}

impl ServiceSettings {
    /// Replaces the exclusion list, normalizing codes to upper case.
    pub fn with_exclusions<I, S>(mut self, codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.exclusion_list = codes
            .into_iter()
            .map(|c| c.as_ref().trim().to_uppercase())
            .collect();
        self
    }
}

/// Application service for rate lookups.
///
/// Generic over `P: RateProvider` - the adapter is injected at compile time.
/// The cache is shared and owned by whoever builds the service.
pub struct CurrencyService<P: RateProvider> {
    provider: P,
    cache: Arc<CacheAside>,
    settings: ServiceSettings,
}

impl<P: RateProvider> CurrencyService<P> {
    /// Creates a new service over the given provider and cache.
    pub fn new(provider: P, cache: Arc<CacheAside>, settings: ServiceSettings) -> Self {
        Self {
            provider,
            cache,
            settings,
        }
    }

    /// Returns a reference to the underlying provider.
    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn cache(&self) -> &CacheAside {
        &self.cache
    }

    pub fn settings(&self) -> &ServiceSettings {
        &self.settings
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Operations
    // ─────────────────────────────────────────────────────────────────────────────

    /// Latest rates against a base currency, as the raw provider JSON.
    #[tracing::instrument(skip(self))]
    pub async fn latest_rates(&self, query: LatestQuery) -> Result<String, AppError> {
        let base: CurrencyCode = query
            .base_currency
            .parse()
            .map_err(|_| AppError::bad_request(CURRENCY_LENGTH_MSG))?;

        let key = format!("GetLatestExchangeRates_{}", base);
        let rates = self
            .cached(&key, || self.provider.fetch_latest(&base), String::is_empty)
            .await?;

        if rates.is_empty() {
            tracing::info!(%base, "latest rates not found");
            return Err(AppError::NotFound);
        }

        tracing::info!(%base, "retrieved latest rates");
        Ok(rates)
    }

    /// Converts an amount between two currencies, as the raw provider JSON.
    #[tracing::instrument(skip(self))]
    pub async fn convert(&self, query: ConvertQuery) -> Result<String, AppError> {
        if query.amount <= Decimal::ZERO {
            return Err(AppError::bad_request(
                "The amount should be greater than Zero(0)",
            ));
        }
        let from: CurrencyCode = query
            .from_currency
            .parse()
            .map_err(|_| AppError::bad_request("The fromCurrency should be in 3 characters"))?;
        let to: CurrencyCode = query
            .to_currency
            .parse()
            .map_err(|_| AppError::bad_request("The toCurrency should be in 3 characters"))?;

        for (code, raw) in [(&from, &query.from_currency), (&to, &query.to_currency)] {
            if self.is_excluded(code) {
                return Err(AppError::bad_request(format!(
                    "The currency {} is not allowed for conversion",
                    raw
                )));
            }
        }

        let amount = query.amount.normalize();
        let key = format!("ConvertAmount_{}_{}_{}", amount, from, to);
        let conversion = self
            .cached(
                &key,
                || self.provider.fetch_conversion(amount, &from, &to),
                String::is_empty,
            )
            .await?;

        if conversion.is_empty() {
            tracing::info!(%amount, %from, %to, "conversion not found");
            return Err(AppError::NotFound);
        }

        tracing::info!(%amount, %from, %to, "retrieved conversion");
        Ok(conversion)
    }

    /// One page of daily rates for a currency between two dates.
    #[tracing::instrument(skip(self))]
    pub async fn history(&self, query: HistoryQuery) -> Result<DailyRates, AppError> {
        let from_date = parse_iso_date(&query.from_date)
            .map_err(|_| AppError::bad_request(format!("The {} is not valid", query.from_date)))?;
        let to_date = parse_iso_date(&query.to_date)
            .map_err(|_| AppError::bad_request(format!("The {} is not valid", query.to_date)))?;
        let currency: CurrencyCode = query
            .currency
            .parse()
            .map_err(|_| AppError::bad_request(CURRENCY_LENGTH_MSG))?;
        if from_date > to_date {
            return Err(AppError::bad_request(
                "'to' date should be greater than 'from' date",
            ));
        }

        let (from, to) = (from_date.to_string(), to_date.to_string());
        let key = format!("History_{}_{}_{}", from, to, currency);
        let series = self
            .cached(
                &key,
                || self.provider.fetch_history(&from, &to, &currency),
                Option::is_none,
            )
            .await?;

        let Some(series) = series else {
            tracing::info!(%from, %to, %currency, "history not found");
            return Err(AppError::NotFound);
        };

        tracing::info!(
            %from, %to, %currency, page = query.page, page_size = query.page_size,
            "retrieved history"
        );
        Ok(series.page(query.page, query.page_size))
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Helpers
    // ─────────────────────────────────────────────────────────────────────────────

    fn is_excluded(&self, code: &CurrencyCode) -> bool {
        self.settings.exclusion_list.contains(code.as_str())
    }

    /// Reads `key` through the cache, producing with `produce` on a miss.
    ///
    /// Empty answers are only stored when `cache_empty_results` is on.
    /// Provider failures are logged here and surface as `AppError::Internal`.
    async fn cached<T, F, Fut>(
        &self,
        key: &str,
        produce: F,
        is_empty: fn(&T) -> bool,
    ) -> Result<T, AppError>
    where
        T: Clone + Send + Sync + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, ProviderError>>,
    {
        let cache_empty = self.settings.cache_empty_results;
        self.cache
            .get_or_compute_if(key, self.settings.cache_ttl, produce, |value| {
                cache_empty || !is_empty(value)
            })
            .await
            .map_err(|e| {
                tracing::error!(key, error = %e, "error occurred while retrieving rates");
                AppError::from(e)
            })
    }
}
