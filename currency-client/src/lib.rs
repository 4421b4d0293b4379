//! # Currency Client SDK
//!
//! A typed Rust client for the Currency API.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use currency_types::{ConvertQuery, DailyRates, HistoryQuery, LatestQuery};
use reqwest::Client;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize, de::DeserializeOwned};

/// Error type for client operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ClientError {
    /// True when the server had no data for the request.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ClientError::Api { status: 404, .. })
    }
}

/// Rates for a single day, as served by `/currency/latest` and `/currency/convert`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rates {
    pub amount: Decimal,
    pub base: String,
    pub date: NaiveDate,
    pub rates: BTreeMap<String, Decimal>,
}

/// Currency API client.
pub struct CurrencyClient {
    base_url: String,
    http: Client,
}

impl CurrencyClient {
    /// Creates a new client.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: Client::new(),
        }
    }

    /// Uses a preconfigured `reqwest` client (timeouts, proxies).
    pub fn with_http_client(mut self, http: Client) -> Self {
        self.http = http;
        self
    }

    /// Checks if the API is healthy.
    pub async fn health(&self) -> Result<bool, ClientError> {
        let resp = self
            .http
            .get(format!("{}/health", self.base_url))
            .send()
            .await?;
        Ok(resp.status().is_success())
    }

    /// Latest rates against `base_currency`.
    pub async fn latest(&self, base_currency: &str) -> Result<Rates, ClientError> {
        let query = LatestQuery {
            base_currency: base_currency.to_string(),
        };
        self.get("/currency/latest", &query).await
    }

    /// Converts `amount` from one currency to another.
    pub async fn convert(
        &self,
        amount: Decimal,
        from_currency: &str,
        to_currency: &str,
    ) -> Result<Rates, ClientError> {
        let query = ConvertQuery {
            amount,
            from_currency: from_currency.to_string(),
            to_currency: to_currency.to_string(),
        };
        self.get("/currency/convert", &query).await
    }

    /// One page of historical rates.
    pub async fn history(&self, query: &HistoryQuery) -> Result<DailyRates, ClientError> {
        self.get("/currency/history", query).await
    }

    async fn get<T: DeserializeOwned, Q: Serialize>(
        &self,
        path: &str,
        query: &Q,
    ) -> Result<T, ClientError> {
        let resp = self
            .http
            .get(format!("{}{}", self.base_url, path))
            .query(query)
            .send()
            .await?;
        self.handle_response(resp).await
    }

    async fn handle_response<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, ClientError> {
        let status = resp.status();
        if status.is_success() {
            let body = resp.text().await?;
            Ok(serde_json::from_str(&body)?)
        } else {
            let body = resp.text().await.unwrap_or_default();
            let message = serde_json::from_str::<serde_json::Value>(&body)
                .ok()
                .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(String::from))
                .unwrap_or(body);
            Err(ClientError::Api {
                status: status.as_u16(),
                message,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        Json, Router,
        extract::RawQuery,
        http::StatusCode,
        response::IntoResponse,
        routing::get,
    };

    #[test]
    fn test_client_creation() {
        let client = CurrencyClient::new("http://localhost:3000");
        assert_eq!(client.base_url, "http://localhost:3000");
    }

    #[test]
    fn test_client_with_trailing_slash() {
        let client = CurrencyClient::new("http://localhost:3000/");
        assert_eq!(client.base_url, "http://localhost:3000");
    }

    /// Serves a tiny imitation of the currency API on a free local port.
    async fn fake_api() -> CurrencyClient {
        let app = Router::new()
            .route(
                "/currency/convert",
                get(|RawQuery(q): RawQuery| async move {
                    // Echo the query so the test can see how it was encoded.
                    Json(serde_json::json!({
                        "amount": 10.5,
                        "base": q.unwrap_or_default(),
                        "date": "2024-05-17",
                        "rates": { "USD": 11.39 }
                    }))
                }),
            )
            .route(
                "/currency/latest",
                get(|| async {
                    (
                        StatusCode::BAD_REQUEST,
                        Json(serde_json::json!({
                            "error": "The currency code should be in 3 characters",
                            "code": 400
                        })),
                    )
                        .into_response()
                }),
            )
            .route(
                "/currency/history",
                get(|| async { StatusCode::NOT_FOUND }),
            );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let http = Client::builder().no_proxy().build().unwrap();
        CurrencyClient::new(format!("http://{}", addr)).with_http_client(http)
    }

    #[tokio::test]
    async fn test_convert_sends_camel_case_query() {
        let client = fake_api().await;

        let rates = client
            .convert(Decimal::new(105, 1), "EUR", "USD")
            .await
            .unwrap();

        assert_eq!(rates.base, "amount=10.5&fromCurrency=EUR&toCurrency=USD");
        assert_eq!(rates.rates["USD"], Decimal::new(1139, 2));
    }

    #[tokio::test]
    async fn test_api_error_message_is_extracted() {
        let client = fake_api().await;

        let err = client.latest("EU").await.unwrap_err();

        match err {
            ClientError::Api { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "The currency code should be in 3 characters");
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[tokio::test]
    async fn test_not_found() {
        let client = fake_api().await;

        let err = client.history(&HistoryQuery::default()).await.unwrap_err();

        assert!(err.is_not_found());
    }
}
