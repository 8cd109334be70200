//! Outbound call throttling shared across providers.

mod rate_limiter;

pub use rate_limiter::{RateLimitConfig, RateLimiter};
