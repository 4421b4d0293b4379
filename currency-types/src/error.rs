//! Error types for the currency rates service.

/// Domain-level errors (malformed values).
#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    #[error("Invalid currency code: {0}")]
    InvalidCurrencyCode(String),

    #[error("Invalid date: {0}")]
    InvalidDate(String),
}

/// Rate provider errors (upstream access failures).
///
/// A non-success HTTP status is NOT an error: the provider reports it as
/// "no data". Only failures to talk to or understand the upstream end up here.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("Upstream transport error: {0}")]
    Transport(String),

    #[error("Failed to decode upstream response: {0}")]
    Decode(String),

    #[error("Invalid upstream base URL: {0}")]
    InvalidBaseUrl(String),
}

/// Application-level errors (for HTTP responses).
///
/// Maps cleanly to HTTP status codes.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found")]
    NotFound,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Shorthand for a validation failure.
    pub fn bad_request(msg: impl Into<String>) -> Self {
        AppError::BadRequest(msg.into())
    }
}

impl From<ProviderError> for AppError {
    fn from(err: ProviderError) -> Self {
        AppError::Internal(err.to_string())
    }
}
