//! Symbol resolution for dividend lookups.
//!
//! This module turns heterogeneous broker ticker spellings into canonical
//! identities and resolves them against a set of known identities.
//!
//! # Architecture
//!
//! The normalizer is a small ordered rule pipeline:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      SymbolNormalizer                        │
//! │                                                              │
//! │  ┌────────────────────────────────────────────────────────┐ │
//! │  │ 1. Suffix rules (longest match first)                   │ │
//! │  │    - MSFT_US_EQ -> MSFT, VODl_EQ -> VOD, AAPL.US -> AAPL│ │
//! │  └────────────────────────────────────────────────────────┘ │
//! │                           │                                  │
//! │                           ▼                                  │
//! │  ┌────────────────────────────────────────────────────────┐ │
//! │  │ 2. Uppercase + custom rules                             │ │
//! │  └────────────────────────────────────────────────────────┘ │
//! │                           │                                  │
//! │                           ▼                                  │
//! │  ┌────────────────────────────────────────────────────────┐ │
//! │  │ 3. Alias table (FB -> META, BRK/B -> BRK.B)             │ │
//! │  └────────────────────────────────────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Resolution against a store tries candidate spellings in order (normalized,
//! raw, each suffix-stripped variant, prefix before the first separator) and
//! returns the first one the store knows.
//!
//! # Example
//!
//! ```
//! use std::collections::HashSet;
//! use divtrack_market_data::resolver::SymbolNormalizer;
//! use divtrack_market_data::CanonicalIdentity;
//!
//! let normalizer = SymbolNormalizer::new();
//! assert_eq!(normalizer.normalize("MSFT_US_EQ").as_str(), "MSFT");
//!
//! let known: HashSet<CanonicalIdentity> = ["SHOP".into()].into_iter().collect();
//! let hit = normalizer.resolve_against_store("SHOP.TO", &known).unwrap();
//! assert_eq!(hit.identity.as_str(), "SHOP");
//! ```

mod aliases;
mod normalizer;
mod suffix_rules;
mod traits;

pub use aliases::{AliasTable, DEFAULT_ALIASES};
pub use normalizer::SymbolNormalizer;
pub use suffix_rules::{SuffixPattern, SuffixRules, BROKER_SUFFIXES};
pub use traits::{IdentityLookup, ResolutionSource, ResolvedIdentity, SymbolRule};
