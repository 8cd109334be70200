//! Pacing strategies for outbound provider calls.
//!
//! The reconciler asks a strategy how large each batch may be, waits on it
//! between batches, and lets it gate every individual fetch.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use divtrack_market_data::{DividendDataProvider, ProviderId, RateLimiter};
use log::debug;

use crate::constants::{DEFAULT_BATCH_PAUSE_MS, DEFAULT_BATCH_SIZE};

#[async_trait]
pub trait PacingStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// Maximum number of concurrent fetches per batch. Never zero.
    fn batch_size(&self) -> usize;

    /// Awaited between consecutive batches, never after the last one.
    /// `completed_batch` is the zero-based index of the batch just finished.
    async fn pause_after_batch(&self, completed_batch: usize);

    /// Awaited inside each fetch task before the request goes out.
    async fn before_fetch(&self) {}
}

/// Fixed-size batches separated by a fixed pause.
#[derive(Debug, Clone)]
pub struct FixedBatchPacing {
    batch_size: usize,
    pause: Duration,
}

impl FixedBatchPacing {
    pub fn new(batch_size: usize, pause: Duration) -> Self {
        Self {
            batch_size: batch_size.max(1),
            pause,
        }
    }
}

impl Default for FixedBatchPacing {
    fn default() -> Self {
        Self::new(
            DEFAULT_BATCH_SIZE,
            Duration::from_millis(DEFAULT_BATCH_PAUSE_MS),
        )
    }
}

#[async_trait]
impl PacingStrategy for FixedBatchPacing {
    fn name(&self) -> &'static str {
        "fixed-batch"
    }

    fn batch_size(&self) -> usize {
        self.batch_size
    }

    async fn pause_after_batch(&self, completed_batch: usize) {
        if self.pause.is_zero() {
            return;
        }
        debug!(
            "Pacing: batch {} done, sleeping {:?}",
            completed_batch + 1,
            self.pause
        );
        tokio::time::sleep(self.pause).await;
    }
}

/// Token bucket pacing keyed by provider.
///
/// Batches are as wide as the provider allows concurrent requests; each fetch
/// waits for a token, so there is no fixed inter-batch sleep.
pub struct TokenBucketPacing {
    limiter: Arc<RateLimiter>,
    provider: ProviderId,
    batch_size: usize,
}

impl TokenBucketPacing {
    pub fn new(limiter: Arc<RateLimiter>, provider: ProviderId, batch_size: usize) -> Self {
        Self {
            limiter,
            provider,
            batch_size: batch_size.max(1),
        }
    }

    /// Configure a fresh limiter from the provider's advertised limits.
    pub fn for_provider(provider: &dyn DividendDataProvider) -> Self {
        let id: ProviderId = provider.id().into();
        let limit = provider.rate_limit();
        let limiter = Arc::new(RateLimiter::for_provider(&id, &limit));
        Self::new(limiter, id, limit.max_concurrency)
    }

    pub fn limiter(&self) -> &Arc<RateLimiter> {
        &self.limiter
    }
}

#[async_trait]
impl PacingStrategy for TokenBucketPacing {
    fn name(&self) -> &'static str {
        "token-bucket"
    }

    fn batch_size(&self) -> usize {
        self.batch_size
    }

    async fn pause_after_batch(&self, _completed_batch: usize) {}

    async fn before_fetch(&self) {
        self.limiter.acquire(&self.provider).await;
    }
}
