//! Divtrack Market Data Crate
//!
//! This crate turns broker ticker spellings into canonical identities and
//! fetches dividend characteristics for them from external providers.
//!
//! # Overview
//!
//! The market data crate supports:
//! - Canonical symbol normalization (broker suffixes, aliases, custom rules)
//! - Resolution of raw symbols against a set of known identities
//! - Provider-agnostic dividend profile fetching
//! - Per-provider rate limiting
//!
//! # Architecture
//!
//! ```text
//! +------------------+     +--------------------+
//! |  Broker symbol   | --> |  SymbolNormalizer  |  (rule pipeline)
//! +------------------+     +--------------------+
//!                                  |
//!                                  v
//!                          +-------------------+
//!                          | CanonicalIdentity |
//!                          +-------------------+
//!                                  |
//!                                  v
//!                        +----------------------+
//!                        | DividendDataProvider |  (Alpha Vantage, ...)
//!                        +----------------------+
//!                                  |
//!                                  v
//!                          +-----------------+
//!                          | DividendProfile |
//!                          +-----------------+
//! ```
//!
//! # Core Types
//!
//! - [`CanonicalIdentity`] - Normalized instrument key
//! - [`DividendProfile`] - Annual/quarterly amounts, yield, dates
//! - [`SymbolNormalizer`] - Broker symbol to canonical identity
//! - [`DividendDataProvider`] - Trait implemented by enrichment sources

pub mod errors;
pub mod models;
pub mod provider;
pub mod registry;
pub mod resolver;

// Re-export all public types from models
pub use models::{CanonicalIdentity, DividendProfile, PayFrequency, ProviderId};

// Re-export error types
pub use errors::{MarketDataError, RetryClass};

// Re-export resolver types
pub use resolver::{
    AliasTable, IdentityLookup, ResolutionSource, ResolvedIdentity, SuffixPattern, SuffixRules,
    SymbolNormalizer, SymbolRule, BROKER_SUFFIXES, DEFAULT_ALIASES,
};

// Re-export provider types
pub use provider::alpha_vantage::AlphaVantageProvider;
pub use provider::{DividendDataProvider, RateLimit};

// Re-export registry types
pub use registry::{RateLimitConfig, RateLimiter};
