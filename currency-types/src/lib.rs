//! # Currency Types
//!
//! Domain types and port traits for the currency rates service.
//! This crate has ZERO external IO dependencies - only data structures,
//! validation rules, and trait definitions.
//!
//! ## Architecture
//!
//! This crate represents the **innermost core** of the hexagonal architecture:
//! - `domain/` - Pure domain types (CurrencyCode, RateSeries)
//! - `ports/` - Trait definitions that adapters must implement
//! - `dto/` - Query parameters accepted at the API boundary
//! - `error/` - Domain, provider and application error types

pub mod domain;
pub mod dto;
pub mod error;
pub mod ports;

// Re-export commonly used types
pub use domain::{CurrencyCode, DailyRates, RateSeries, parse_iso_date};
pub use dto::*;
pub use error::{AppError, DomainError, ProviderError};
pub use ports::RateProvider;
