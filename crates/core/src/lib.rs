//! Divtrack Core - dividend reference store, reconciliation and metrics.
//!
//! This crate keeps a shared dividend reference store in sync with a
//! portfolio's holdings and derives dividend income metrics. Symbol
//! normalization and provider access live in `divtrack-market-data`.

pub mod config;
pub mod constants;
pub mod dividends;
pub mod errors;

// Re-export common types from the dividends module
pub use dividends::*;

pub use config::{EngineConfig, PacingMode};

// Re-export error types
pub use errors::Error;
pub use errors::Result;
