//! Resolution traits for the market data crate.
//!
//! Defines the seams of the symbol normalization pipeline: rewrite rules,
//! and the lookup used to resolve a raw symbol against whatever holds the
//! known identities (usually the dividend reference store).

use std::collections::{HashMap, HashSet};
use std::hash::BuildHasher;

use crate::models::CanonicalIdentity;

/// One step of the normalization pipeline.
pub trait SymbolRule: Send + Sync {
    /// Short name used in debug logs.
    fn name(&self) -> &'static str;

    /// Rewrite the symbol, or `None` when the rule does not apply.
    fn apply(&self, symbol: &str) -> Option<String>;
}

/// Anything that can answer "is this identity known?".
pub trait IdentityLookup {
    fn contains_identity(&self, identity: &str) -> bool;
}

impl<V, S: BuildHasher> IdentityLookup for HashMap<CanonicalIdentity, V, S> {
    fn contains_identity(&self, identity: &str) -> bool {
        self.contains_key(identity)
    }
}

impl<S: BuildHasher> IdentityLookup for HashSet<CanonicalIdentity, S> {
    fn contains_identity(&self, identity: &str) -> bool {
        self.contains(identity)
    }
}

/// Which candidate spelling produced a match.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ResolutionSource {
    /// The full normalized form (strip rules, uppercase, aliases).
    Normalized,
    /// The raw symbol, uppercased, nothing stripped.
    RawForm,
    /// The raw symbol with one known suffix removed.
    SuffixVariant,
    /// The part before the first separator character.
    SeparatorPrefix,
}

impl std::fmt::Display for ResolutionSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Normalized => write!(f, "normalized"),
            Self::RawForm => write!(f, "raw"),
            Self::SuffixVariant => write!(f, "suffix-variant"),
            Self::SeparatorPrefix => write!(f, "separator-prefix"),
        }
    }
}

/// A candidate identity together with how it was derived.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedIdentity {
    pub identity: CanonicalIdentity,
    pub source: ResolutionSource,
}
