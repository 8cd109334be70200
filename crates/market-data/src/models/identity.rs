use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Canonical identity of a dividend-bearing instrument.
///
/// An uppercase ticker with broker suffix noise stripped and known aliases
/// resolved (see [`SymbolNormalizer`](crate::resolver::SymbolNormalizer)).
/// This is the key of the dividend reference store. Several raw broker
/// symbols may map to the same identity.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CanonicalIdentity(Arc<str>);

impl CanonicalIdentity {
    /// Wrap an already-canonical ticker.
    ///
    /// No normalization is applied; use the normalizer for raw broker input.
    pub fn new(ticker: impl AsRef<str>) -> Self {
        Self(Arc::from(ticker.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for CanonicalIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CanonicalIdentity {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for CanonicalIdentity {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for CanonicalIdentity {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for CanonicalIdentity {
    fn from(value: String) -> Self {
        Self(Arc::from(value))
    }
}

impl Serialize for CanonicalIdentity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for CanonicalIdentity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Self::from(s))
    }
}
