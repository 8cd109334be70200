//! Core error types for the divtrack engine.
//!
//! Per-identity provider failures never surface here; the reconciler counts
//! them instead. These errors cover configuration and snapshot handling.

use thiserror::Error;

use divtrack_market_data::MarketDataError;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the engine.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to read or write file: {0}")]
    ConfigIO(String),

    #[error("Invalid configuration value: {0}")]
    InvalidConfigValue(String),

    #[error("Failed to (de)serialize store snapshot: {0}")]
    Serialization(String),

    #[error("Market data operation failed: {0}")]
    MarketData(#[from] MarketDataError),
}

// === From implementations for common error types ===

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::ConfigIO(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}
