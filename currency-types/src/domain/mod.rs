//! Domain models for the currency rates service.

pub mod currency;
pub mod rates;

pub use currency::CurrencyCode;
pub use rates::{DailyRates, RateSeries, parse_iso_date};
