//! Market data models
//!
//! This module contains the core data types shared by the resolver and the
//! providers:
//! - `identity` - Canonical instrument identity (CanonicalIdentity)
//! - `dividend` - Dividend characteristics (DividendProfile, PayFrequency)
//! - `types` - Type aliases for common identifiers

mod dividend;
mod identity;
mod types;

pub use dividend::{DividendProfile, PayFrequency};
pub use identity::CanonicalIdentity;
pub use types::ProviderId;
