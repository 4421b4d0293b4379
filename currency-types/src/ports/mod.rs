//! Port traits (interfaces for adapters).
//!
//! The application layer depends on these traits, not concrete implementations.

mod rate_provider;

pub use rate_provider::RateProvider;
