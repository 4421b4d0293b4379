//! OpenAPI document served by Swagger UI.

#![allow(dead_code)] // Path functions are only used by utoipa for documentation generation

use currency_types::{ConvertQuery, CurrencyCode, HistoryQuery, LatestQuery, RateSeries};
use utoipa::OpenApi;

use crate::inbound::handlers::ErrorResponse;

// Dummy functions to generate path documentation
// These are not the actual handlers, just for OpenAPI path generation

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is healthy", body = inline(serde_json::Value), example = json!({"status": "healthy"}))
    )
)]
async fn health() {}

/// Latest exchange rates against a base currency
#[utoipa::path(
    get,
    path = "/currency/latest",
    tag = "currency",
    params(LatestQuery),
    responses(
        (status = 200, description = "Latest rates as returned by the rate provider", body = inline(serde_json::Value),
            example = json!({"amount": 1.0, "base": "EUR", "date": "2024-05-17", "rates": {"AUD": 1.6281, "USD": 1.0844}})),
        (status = 400, description = "Invalid currency code", body = ErrorResponse),
        (status = 404, description = "No rates for this currency"),
        (status = 500, description = "Upstream failure", body = ErrorResponse)
    )
)]
async fn latest() {}

/// Convert an amount from one currency to another
#[utoipa::path(
    get,
    path = "/currency/convert",
    tag = "currency",
    params(ConvertQuery),
    responses(
        (status = 200, description = "Conversion as returned by the rate provider", body = inline(serde_json::Value),
            example = json!({"amount": 10.5, "base": "EUR", "date": "2024-05-17", "rates": {"USD": 11.3862}})),
        (status = 400, description = "Invalid amount, currency code, or excluded currency", body = ErrorResponse),
        (status = 404, description = "No conversion available"),
        (status = 500, description = "Upstream failure", body = ErrorResponse)
    )
)]
async fn convert() {}

/// Historical rates for a currency, paginated by day
///
/// The page is a JSON object keyed by date (ascending), not an array of
/// date/rates pairs; this shape is intentional.
#[utoipa::path(
    get,
    path = "/currency/history",
    tag = "currency",
    params(HistoryQuery),
    responses(
        (status = 200, description = "Date to rates map for the requested page", body = inline(serde_json::Value),
            example = json!({"2024-05-01": {"AUD": 1.6346}, "2024-05-02": {"AUD": 1.6313}})),
        (status = 400, description = "Invalid date, currency code, or date range", body = ErrorResponse),
        (status = 404, description = "No history for this range"),
        (status = 500, description = "Upstream failure", body = ErrorResponse)
    )
)]
async fn history() {}

/// OpenAPI documentation for the Currency API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Currency Rates Service API",
        version = "1.0.0",
        description = "Latest rates, conversions and rate history backed by the Frankfurter API.\n\nProvider answers are cached in memory for a configurable duration.",
        license(name = "MIT"),
    ),
    paths(health, latest, convert, history),
    components(schemas(ErrorResponse, RateSeries, CurrencyCode)),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "currency", description = "Exchange rate lookups"),
    )
)]
pub struct ApiDoc;
