//! # Currency Hex
//!
//! Application service layer and HTTP adapter for the currency rates service.
//!
//! ## Architecture
//!
//! - `service` - Application service (validation, cache keys, cache-aside reads)
//! - `inbound/` - HTTP adapter (Axum server)
//! - `openapi` - OpenAPI document served by Swagger UI
//!
//! The service is generic over `P: RateProvider`, allowing different
//! upstream adapters to be injected.

pub mod inbound;
pub mod openapi;
pub mod service;


pub use service::{CurrencyService, ServiceSettings};
