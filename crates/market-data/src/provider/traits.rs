//! Dividend data provider trait definitions.
//!
//! This module defines the `DividendDataProvider` trait that every
//! enrichment source implements.

use async_trait::async_trait;

use crate::errors::MarketDataError;
use crate::models::{CanonicalIdentity, DividendProfile};

use super::capabilities::RateLimit;

/// Trait for dividend data providers.
///
/// Implement this trait to add a new enrichment source. The reconciler only
/// ever calls [`fetch_dividend_profile`](Self::fetch_dividend_profile) for
/// identities missing from the reference store.
///
/// # Example
///
/// ```ignore
/// use async_trait::async_trait;
/// use divtrack_market_data::provider::{DividendDataProvider, RateLimit};
///
/// struct MyProvider {
///     api_key: String,
/// }
///
/// #[async_trait]
/// impl DividendDataProvider for MyProvider {
///     fn id(&self) -> &'static str {
///         "MY_PROVIDER"
///     }
///
///     fn rate_limit(&self) -> RateLimit {
///         RateLimit::default()
///     }
///
///     async fn fetch_dividend_profile(
///         &self,
///         identity: &CanonicalIdentity,
///     ) -> Result<DividendProfile, MarketDataError> {
///         // ... one outbound request per identity
///     }
/// }
/// ```
#[async_trait]
pub trait DividendDataProvider: Send + Sync {
    /// Unique identifier for this provider.
    ///
    /// Should be a constant string like "ALPHA_VANTAGE". Used for logging,
    /// rate limiter buckets and the `source` field of fetched profiles.
    fn id(&self) -> &'static str;

    /// Rate limiting configuration.
    fn rate_limit(&self) -> RateLimit;

    /// Fetch dividend characteristics for one identity.
    ///
    /// # Returns
    ///
    /// - `Ok(profile)` with a positive `annual_amount` for payers
    /// - `Ok(profile)` with all amounts zero when the provider answered but
    ///   reported no dividend; this is a final, cacheable answer
    /// - `Err(..)` for transport, status or payload failures. Implementations
    ///   must not retry; the caller owns retry policy.
    async fn fetch_dividend_profile(
        &self,
        identity: &CanonicalIdentity,
    ) -> Result<DividendProfile, MarketDataError>;
}
