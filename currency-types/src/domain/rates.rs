//! Historical rate series as returned by the upstream provider.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::DomainError;

/// Date format accepted for history queries (`yyyy-MM-dd`).
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Rates per day: date -> (currency code -> rate).
///
/// Ordered by date so pagination is deterministic.
pub type DailyRates = BTreeMap<NaiveDate, BTreeMap<String, Decimal>>;

/// A time series of exchange rates between two dates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RateSeries {
    #[schema(value_type = f64, example = 1.0)]
    pub amount: Decimal,
    #[schema(example = "EUR")]
    pub base: String,
    #[schema(value_type = String, example = "2024-05-01")]
    pub start_date: NaiveDate,
    #[schema(value_type = String, example = "2024-05-17")]
    pub end_date: NaiveDate,
    #[schema(value_type = Object)]
    pub rates: DailyRates,
}

impl RateSeries {
    /// Returns the `page`-th slice of `page_size` days (pages start at 1).
    ///
    /// Page 0 is treated like page 1. A page past the end is empty.
    pub fn page(&self, page: usize, page_size: usize) -> DailyRates {
        let skip = page.saturating_sub(1).saturating_mul(page_size);
        self.rates
            .iter()
            .skip(skip)
            .take(page_size)
            .map(|(date, rates)| (*date, rates.clone()))
            .collect()
    }

    /// Returns true if the series holds no days at all.
    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}

/// Parses a strict `yyyy-MM-dd` date.
///
/// Month and day must be zero padded, so `2024-5-1` is rejected.
pub fn parse_iso_date(s: &str) -> Result<NaiveDate, DomainError> {
    if s.len() != 10 {
        return Err(DomainError::InvalidDate(s.to_string()));
    }
    NaiveDate::parse_from_str(s, DATE_FORMAT).map_err(|_| DomainError::InvalidDate(s.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn series(days: u32) -> RateSeries {
        let rates = (1..=days)
            .map(|d| {
                let date = NaiveDate::from_ymd_opt(2024, 5, d).unwrap();
                let mut day = BTreeMap::new();
                day.insert("AUD".to_string(), Decimal::from_str("1.2").unwrap());
                (date, day)
            })
            .collect();
        RateSeries {
            amount: Decimal::ONE,
            base: "EUR".into(),
            start_date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 5, days).unwrap(),
            rates,
        }
    }

    #[test]
    fn test_first_page_of_one() {
        let page = series(5).page(1, 1);
        assert_eq!(page.len(), 1);
        assert!(page.contains_key(&NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()));
    }

    #[test]
    fn test_middle_and_last_pages() {
        let s = series(5);
        let second = s.page(2, 2);
        let dates: Vec<_> = second.keys().map(|d| d.to_string()).collect();
        assert_eq!(dates, vec!["2024-05-03", "2024-05-04"]);

        assert_eq!(s.page(3, 2).len(), 1);
        assert!(s.page(4, 2).is_empty());
    }

    #[test]
    fn test_page_zero_behaves_like_first_page() {
        assert_eq!(series(3).page(0, 2), series(3).page(1, 2));
    }

    #[test]
    fn test_deserialize_provider_payload() {
        let body = r#"{"amount":1.0,"base":"EUR","start_date":"2024-05-01","end_date":"2024-05-03",
            "rates":{"2024-05-02":{"AUD":1.6281},"2024-05-03":{"AUD":1.6302}}}"#;
        let s: RateSeries = serde_json::from_str(body).unwrap();
        assert_eq!(s.rates.len(), 2);
        let first = s.rates.values().next().unwrap();
        assert_eq!(first["AUD"], Decimal::from_str("1.6281").unwrap());
    }

    #[test]
    fn test_parse_iso_date() {
        assert!(parse_iso_date("2024-05-01").is_ok());
        assert!(parse_iso_date("2024-13-01").is_err());
        assert!(parse_iso_date("2024-05-32").is_err());
        assert!(parse_iso_date("2024-5-1").is_err());
        assert!(parse_iso_date("01-05-2024").is_err());
    }
}
