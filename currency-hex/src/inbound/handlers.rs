//! HTTP request handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{FromRequestParts, Query, State},
    http::{StatusCode, header, request::Parts},
    response::{IntoResponse, Response},
};
use serde::{Serialize, de::DeserializeOwned};

use currency_types::{AppError, ConvertQuery, HistoryQuery, LatestQuery, RateProvider};

use crate::CurrencyService;

/// Body returned to clients for unexpected failures; the cause stays in the logs.
pub const INTERNAL_ERROR_MSG: &str = "Internal server error";

/// Application state shared across handlers.
pub struct AppState<P: RateProvider> {
    pub service: CurrencyService<P>,
}

/// Error payload for 400 and 500 responses.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    #[schema(example = "The currency code should be in 3 characters")]
    pub error: String,
    #[schema(example = 400)]
    pub code: u16,
}

/// Wrapper to implement IntoResponse for AppError (orphan rule workaround).
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self.0 {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound => return StatusCode::NOT_FOUND.into_response(),
            AppError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                INTERNAL_ERROR_MSG.to_string(),
            ),
        };

        let body = ErrorResponse {
            error: message,
            code: status.as_u16(),
        };

        (status, Json(body)).into_response()
    }
}

/// `Query` extractor whose rejection uses the API error body.
pub struct ApiQuery<T>(pub T);

impl<T, S> FromRequestParts<S> for ApiQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;
        Ok(Self(value))
    }
}

/// Provider JSON passed through untouched.
fn raw_json(body: String) -> Response {
    ([(header::CONTENT_TYPE, "application/json")], body).into_response()
}

/// Health check endpoint.
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "healthy" }))
}

/// Latest rates for a base currency.
#[tracing::instrument(skip(state))]
pub async fn latest<P: RateProvider>(
    State(state): State<Arc<AppState<P>>>,
    ApiQuery(query): ApiQuery<LatestQuery>,
) -> Result<Response, ApiError> {
    let rates = state.service.latest_rates(query).await?;
    Ok(raw_json(rates))
}

/// Convert an amount between two currencies.
#[tracing::instrument(skip(state))]
pub async fn convert<P: RateProvider>(
    State(state): State<Arc<AppState<P>>>,
    ApiQuery(query): ApiQuery<ConvertQuery>,
) -> Result<Response, ApiError> {
    let conversion = state.service.convert(query).await?;
    Ok(raw_json(conversion))
}

/// One page of historical rates.
#[tracing::instrument(skip(state))]
pub async fn history<P: RateProvider>(
    State(state): State<Arc<AppState<P>>>,
    ApiQuery(query): ApiQuery<HistoryQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let rates = state.service.history(query).await?;
    Ok(Json(rates))
}
