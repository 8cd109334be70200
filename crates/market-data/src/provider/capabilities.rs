//! Provider rate limiting configuration.
//!
//! Describes how aggressively a provider may be called. The reconciler's
//! pacing strategies read this to size batches and configure the token
//! bucket.

use std::time::Duration;

/// Rate limiting configuration for a provider.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RateLimit {
    /// Maximum requests allowed per minute.
    pub requests_per_minute: u32,

    /// Maximum concurrent requests to this provider.
    pub max_concurrency: usize,

    /// Minimum delay between request bursts.
    pub min_delay: Duration,
}

impl Default for RateLimit {
    fn default() -> Self {
        Self {
            requests_per_minute: 60,
            max_concurrency: 10,
            min_delay: Duration::from_millis(100),
        }
    }
}
