//! Dividend data provider abstractions and implementations.
//!
//! This module contains:
//! - The `DividendDataProvider` trait that all providers implement
//! - Provider rate limiting configuration
//! - The Alpha Vantage implementation
//!
//! Providers receive canonical identities that the resolver already cleaned.
//! Any provider exposing "dividend fields by ticker" can be substituted
//! behind the same trait.

mod capabilities;
mod traits;

pub mod alpha_vantage;

// Re-exports
pub use capabilities::RateLimit;
pub use traits::DividendDataProvider;
