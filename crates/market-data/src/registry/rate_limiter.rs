//! Token bucket rate limiter for dividend data providers.
//!
//! One bucket per provider. Buckets start full, so a fresh run may burst up
//! to the configured capacity before being throttled to the refill rate.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use log::{debug, warn};

use crate::models::ProviderId;
use crate::provider::RateLimit;

/// Default rate limit: 60 requests per minute.
const DEFAULT_REQUESTS_PER_MINUTE: u32 = 60;

/// Default bucket capacity (allows bursting).
const DEFAULT_BURST_CAPACITY: f64 = 10.0;

#[derive(Debug)]
struct TokenBucket {
    tokens: f64,
    last_refill: Instant,
    /// Tokens per second.
    rate: f64,
    capacity: f64,
}

impl TokenBucket {
    fn from_config(config: &RateLimitConfig) -> Self {
        let capacity = config.burst_capacity.max(1.0);
        Self {
            tokens: capacity,
            last_refill: Instant::now(),
            rate: (config.requests_per_minute.max(1) as f64) / 60.0,
            capacity,
        }
    }

    fn refill(&mut self) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_refill).as_secs_f64();
        self.tokens = (self.tokens + elapsed * self.rate).min(self.capacity);
        self.last_refill = now;
    }

    /// Take a token, or return how long until one is available.
    fn take(&mut self) -> Result<(), Duration> {
        self.refill();

        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            Ok(())
        } else {
            let missing = 1.0 - self.tokens;
            Err(Duration::from_secs_f64(missing / self.rate))
        }
    }
}

/// Rate limiter configuration for a provider.
#[derive(Clone, Debug, PartialEq)]
pub struct RateLimitConfig {
    /// Sustained requests per minute.
    pub requests_per_minute: u32,
    /// Requests allowed back-to-back before throttling kicks in.
    pub burst_capacity: f64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            requests_per_minute: DEFAULT_REQUESTS_PER_MINUTE,
            burst_capacity: DEFAULT_BURST_CAPACITY,
        }
    }
}

impl From<&RateLimit> for RateLimitConfig {
    fn from(limit: &RateLimit) -> Self {
        Self {
            requests_per_minute: limit.requests_per_minute,
            burst_capacity: limit.max_concurrency.max(1) as f64,
        }
    }
}

/// Token bucket rate limiter shared by all provider calls.
///
/// Buckets are created lazily on first use, with either the configured
/// limits for that provider or the defaults.
pub struct RateLimiter {
    buckets: Mutex<HashMap<String, TokenBucket>>,
    configs: Mutex<HashMap<String, RateLimitConfig>>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self {
            buckets: Mutex::new(HashMap::new()),
            configs: Mutex::new(HashMap::new()),
        }
    }

    /// Build a limiter pre-configured from a provider's advertised limits.
    pub fn for_provider(provider: &ProviderId, limit: &RateLimit) -> Self {
        let limiter = Self::new();
        limiter.configure(provider, RateLimitConfig::from(limit));
        limiter
    }

    /// A poisoned lock only means a bucket may be slightly off; keep going.
    fn lock_buckets(&self) -> MutexGuard<'_, HashMap<String, TokenBucket>> {
        self.buckets.lock().unwrap_or_else(|poisoned| {
            warn!("Rate limiter buckets mutex was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    fn lock_configs(&self) -> MutexGuard<'_, HashMap<String, RateLimitConfig>> {
        self.configs.lock().unwrap_or_else(|poisoned| {
            warn!("Rate limiter configs mutex was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    /// Set limits for a provider. Any existing bucket is discarded.
    pub fn configure(&self, provider: &ProviderId, config: RateLimitConfig) {
        self.lock_configs().insert(provider.to_string(), config);
        self.lock_buckets().remove(provider.as_ref());
    }

    fn bucket_config(&self, provider: &ProviderId) -> RateLimitConfig {
        self.lock_configs()
            .get(provider.as_ref())
            .cloned()
            .unwrap_or_default()
    }

    fn take(&self, provider: &ProviderId) -> Result<(), Duration> {
        let config = self.bucket_config(provider);
        let mut buckets = self.lock_buckets();
        buckets
            .entry(provider.to_string())
            .or_insert_with(|| TokenBucket::from_config(&config))
            .take()
    }

    /// Wait until a token is available for the provider, then consume it.
    pub async fn acquire(&self, provider: &ProviderId) {
        loop {
            match self.take(provider) {
                Ok(()) => return,
                Err(wait) => {
                    debug!("Rate limiter: waiting {:?} for '{}'", wait, provider);
                    tokio::time::sleep(wait).await;
                }
            }
        }
    }

    /// Consume a token if one is available right now.
    pub fn try_acquire(&self, provider: &ProviderId) -> bool {
        self.take(provider).is_ok()
    }

    /// Tokens currently available for the provider.
    pub fn remaining_tokens(&self, provider: &ProviderId) -> f64 {
        let mut buckets = self.lock_buckets();
        match buckets.get_mut(provider.as_ref()) {
            Some(bucket) => {
                bucket.refill();
                bucket.tokens
            }
            None => {
                drop(buckets);
                self.bucket_config(provider).burst_capacity.max(1.0)
            }
        }
    }

    /// Refill the provider's bucket to capacity.
    pub fn reset(&self, provider: &ProviderId) {
        self.lock_buckets().remove(provider.as_ref());
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::borrow::Cow;

    const PROVIDER: ProviderId = Cow::Borrowed("ALPHA_VANTAGE");

    #[test]
    fn test_bucket_starts_full_then_drains() {
        let limiter = RateLimiter::new();

        for _ in 0..DEFAULT_BURST_CAPACITY as usize {
            assert!(limiter.try_acquire(&PROVIDER));
        }
        assert!(!limiter.try_acquire(&PROVIDER));
    }

    #[test]
    fn test_bucket_refills_over_time() {
        let mut bucket = TokenBucket::from_config(&RateLimitConfig {
            requests_per_minute: 60,
            burst_capacity: 1.0,
        });

        assert!(bucket.take().is_ok());
        let wait = bucket.take().unwrap_err();
        assert!(wait <= Duration::from_secs(1));

        bucket.last_refill = Instant::now() - Duration::from_secs(2);
        assert!(bucket.take().is_ok());
    }

    #[test]
    fn test_configured_from_provider_rate_limit() {
        let limit = RateLimit {
            requests_per_minute: 5,
            max_concurrency: 1,
            min_delay: Duration::from_secs(12),
        };
        let limiter = RateLimiter::for_provider(&PROVIDER, &limit);

        assert!(limiter.try_acquire(&PROVIDER));
        assert!(!limiter.try_acquire(&PROVIDER));
    }

    #[test]
    fn test_providers_are_isolated() {
        let limiter = RateLimiter::new();
        let other: ProviderId = Cow::Borrowed("OTHER");
        limiter.configure(
            &PROVIDER,
            RateLimitConfig {
                requests_per_minute: 60,
                burst_capacity: 1.0,
            },
        );

        assert!(limiter.try_acquire(&PROVIDER));
        assert!(!limiter.try_acquire(&PROVIDER));
        assert!(limiter.try_acquire(&other));
    }

    #[test]
    fn test_reset_restores_capacity() {
        let limiter = RateLimiter::new();
        limiter.configure(
            &PROVIDER,
            RateLimitConfig {
                requests_per_minute: 1,
                burst_capacity: 2.0,
            },
        );

        assert!(limiter.try_acquire(&PROVIDER));
        assert!(limiter.try_acquire(&PROVIDER));
        assert!(!limiter.try_acquire(&PROVIDER));

        limiter.reset(&PROVIDER);
        assert!((limiter.remaining_tokens(&PROVIDER) - 2.0).abs() < 0.01);
        assert!(limiter.try_acquire(&PROVIDER));
    }

    #[tokio::test]
    async fn test_acquire_waits_for_refill() {
        let limiter = RateLimiter::new();
        limiter.configure(
            &PROVIDER,
            RateLimitConfig {
                requests_per_minute: 6000, // 100/second
                burst_capacity: 2.0,
            },
        );

        limiter.acquire(&PROVIDER).await;
        limiter.acquire(&PROVIDER).await;

        let start = Instant::now();
        limiter.acquire(&PROVIDER).await;
        assert!(start.elapsed().as_millis() >= 5);
    }
}
