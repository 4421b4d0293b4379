//! Query parameters accepted by the HTTP API.
//!
//! Field names are camelCase on the wire. Every field has a default so a
//! bare `GET /currency/latest` is a valid request.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::IntoParams;

/// Parameters for `GET /currency/latest`.
#[derive(Debug, Clone, Serialize, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct LatestQuery {
    /// Base currency code
    #[serde(default = "default_base_currency")]
    #[param(default = "EUR", example = "EUR")]
    pub base_currency: String,
}

impl Default for LatestQuery {
    fn default() -> Self {
        Self {
            base_currency: default_base_currency(),
        }
    }
}

/// Parameters for `GET /currency/convert`.
#[derive(Debug, Clone, Serialize, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ConvertQuery {
    /// Amount to convert, must be greater than zero
    #[serde(default = "default_amount")]
    #[param(value_type = f64, default = 1, example = 10.5)]
    pub amount: Decimal,
    /// Source currency code
    #[serde(default = "default_base_currency")]
    #[param(default = "EUR", example = "EUR")]
    pub from_currency: String,
    /// Target currency code
    #[serde(default = "default_to_currency")]
    #[param(default = "USD", example = "USD")]
    pub to_currency: String,
}

impl Default for ConvertQuery {
    fn default() -> Self {
        Self {
            amount: default_amount(),
            from_currency: default_base_currency(),
            to_currency: default_to_currency(),
        }
    }
}

/// Parameters for `GET /currency/history`.
#[derive(Debug, Clone, Serialize, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct HistoryQuery {
    /// First day of the range (`yyyy-MM-dd`)
    #[serde(default = "default_from_date")]
    #[param(default = "2024-05-01", example = "2024-05-01")]
    pub from_date: String,
    /// Last day of the range (`yyyy-MM-dd`)
    #[serde(default = "default_to_date")]
    #[param(default = "2024-05-17", example = "2024-05-17")]
    pub to_date: String,
    /// Currency to report rates for
    #[serde(default = "default_history_currency")]
    #[param(default = "AUD", example = "AUD")]
    pub currency: String,
    /// 1-based page number
    #[serde(default = "default_page")]
    #[param(default = 1, minimum = 1)]
    pub page: usize,
    /// Days per page
    #[serde(default = "default_page_size")]
    #[param(default = 10, minimum = 1)]
    pub page_size: usize,
}

impl Default for HistoryQuery {
    fn default() -> Self {
        Self {
            from_date: default_from_date(),
            to_date: default_to_date(),
            currency: default_history_currency(),
            page: default_page(),
            page_size: default_page_size(),
        }
    }
}

fn default_base_currency() -> String {
    "EUR".to_string()
}

fn default_to_currency() -> String {
    "USD".to_string()
}

fn default_history_currency() -> String {
    "AUD".to_string()
}

fn default_amount() -> Decimal {
    Decimal::ONE
}

fn default_from_date() -> String {
    "2024-05-01".to_string()
}

fn default_to_date() -> String {
    "2024-05-17".to_string()
}

fn default_page() -> usize {
    1
}

fn default_page_size() -> usize {
    10
}
