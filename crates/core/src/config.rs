//! Engine configuration.
//!
//! Every setting has a default; `from_env` overrides them from `DT_*`
//! variables. Unset or empty variables keep the default, malformed ones are
//! rejected.

use std::str::FromStr;
use std::time::Duration;

use chrono::TimeDelta;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_BATCH_PAUSE_MS, DEFAULT_BATCH_SIZE, DEFAULT_GROWTH_RATE, DEFAULT_STALE_AFTER_DAYS,
};
use crate::errors::{Error, Result};

pub const ENV_BATCH_SIZE: &str = "DT_BATCH_SIZE";
pub const ENV_BATCH_PAUSE_MS: &str = "DT_BATCH_PAUSE_MS";
pub const ENV_BATCH_TIMEOUT_MS: &str = "DT_BATCH_TIMEOUT_MS";
pub const ENV_STALE_AFTER_DAYS: &str = "DT_STALE_AFTER_DAYS";
pub const ENV_GROWTH_RATE: &str = "DT_GROWTH_RATE";
pub const ENV_PACING: &str = "DT_PACING";

/// How outbound fetches are paced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PacingMode {
    /// Fixed-size batches with a pause between them.
    #[default]
    Batch,
    /// Batches sized to the provider's concurrency, throttled per request.
    TokenBucket,
}

impl FromStr for PacingMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "batch" => Ok(Self::Batch),
            "token-bucket" | "token_bucket" => Ok(Self::TokenBucket),
            other => Err(Error::InvalidConfigValue(format!(
                "{}: unknown pacing mode '{}' (expected 'batch' or 'token-bucket')",
                ENV_PACING, other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Identities fetched concurrently per batch (fixed-batch pacing).
    pub batch_size: usize,
    /// Pause between batches (fixed-batch pacing).
    pub batch_pause: Duration,
    /// Stop waiting on a batch after this long; `None` waits indefinitely.
    pub batch_timeout: Option<Duration>,
    /// Profiles fetched longer ago than this are reported stale.
    pub stale_after: TimeDelta,
    /// Annual growth rate used by income projections (0.05 = 5%).
    pub growth_rate: Decimal,
    pub pacing: PacingMode,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            batch_pause: Duration::from_millis(DEFAULT_BATCH_PAUSE_MS),
            batch_timeout: None,
            stale_after: TimeDelta::days(DEFAULT_STALE_AFTER_DAYS),
            growth_rate: DEFAULT_GROWTH_RATE,
            pacing: PacingMode::default(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(raw) = value(ENV_BATCH_SIZE) {
            let size: usize = parse(ENV_BATCH_SIZE, &raw)?;
            if size == 0 {
                return Err(Error::InvalidConfigValue(format!(
                    "{} must be at least 1",
                    ENV_BATCH_SIZE
                )));
            }
            config.batch_size = size;
        }

        if let Some(raw) = value(ENV_BATCH_PAUSE_MS) {
            config.batch_pause = Duration::from_millis(parse(ENV_BATCH_PAUSE_MS, &raw)?);
        }

        if let Some(raw) = value(ENV_BATCH_TIMEOUT_MS) {
            let millis: u64 = parse(ENV_BATCH_TIMEOUT_MS, &raw)?;
            // 0 disables the timeout
            config.batch_timeout = (millis > 0).then(|| Duration::from_millis(millis));
        }

        if let Some(raw) = value(ENV_STALE_AFTER_DAYS) {
            let days: i64 = parse(ENV_STALE_AFTER_DAYS, &raw)?;
            if days < 0 {
                return Err(Error::InvalidConfigValue(format!(
                    "{} must not be negative",
                    ENV_STALE_AFTER_DAYS
                )));
            }
            config.stale_after = TimeDelta::try_days(days).ok_or_else(|| {
                Error::InvalidConfigValue(format!("{} is out of range", ENV_STALE_AFTER_DAYS))
            })?;
        }

        if let Some(raw) = value(ENV_GROWTH_RATE) {
            let rate: Decimal = parse(ENV_GROWTH_RATE, &raw)?;
            if rate <= -Decimal::ONE || rate > Decimal::ONE {
                return Err(Error::InvalidConfigValue(format!(
                    "{} must be in (-1, 1], got {}",
                    ENV_GROWTH_RATE, rate
                )));
            }
            config.growth_rate = rate;
        }

        if let Some(raw) = value(ENV_PACING) {
            config.pacing = raw.parse()?;
        }

        Ok(config)
    }
}

fn parse<T>(key: &str, raw: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|e| Error::InvalidConfigValue(format!("{}='{}': {}", key, raw, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<EngineConfig> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        EngineConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = config_from(&[]).unwrap();

        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.batch_size, 10);
        assert_eq!(config.batch_pause, Duration::from_secs(1));
        assert_eq!(config.batch_timeout, None);
        assert_eq!(config.stale_after, TimeDelta::days(7));
        assert_eq!(config.growth_rate, dec!(0.05));
        assert_eq!(config.pacing, PacingMode::Batch);
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("DT_BATCH_SIZE", "4"),
            ("DT_BATCH_PAUSE_MS", "250"),
            ("DT_BATCH_TIMEOUT_MS", "5000"),
            ("DT_STALE_AFTER_DAYS", "30"),
            ("DT_GROWTH_RATE", "0.03"),
            ("DT_PACING", "token-bucket"),
        ])
        .unwrap();

        assert_eq!(config.batch_size, 4);
        assert_eq!(config.batch_pause, Duration::from_millis(250));
        assert_eq!(config.batch_timeout, Some(Duration::from_secs(5)));
        assert_eq!(config.stale_after, TimeDelta::days(30));
        assert_eq!(config.growth_rate, dec!(0.03));
        assert_eq!(config.pacing, PacingMode::TokenBucket);
    }

    #[test]
    fn test_zero_timeout_disables_it() {
        let config = config_from(&[("DT_BATCH_TIMEOUT_MS", "0")]).unwrap();
        assert_eq!(config.batch_timeout, None);
    }

    #[test]
    fn test_blank_values_keep_defaults() {
        let config = config_from(&[("DT_BATCH_SIZE", "  ")]).unwrap();
        assert_eq!(config.batch_size, 10);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        for (key, value) in [
            ("DT_BATCH_SIZE", "ten"),
            ("DT_BATCH_SIZE", "0"),
            ("DT_BATCH_PAUSE_MS", "-5"),
            ("DT_STALE_AFTER_DAYS", "-1"),
            ("DT_GROWTH_RATE", "abc"),
            ("DT_GROWTH_RATE", "1.5"),
            ("DT_PACING", "adaptive"),
        ] {
            let err = config_from(&[(key, value)]).unwrap_err();
            assert!(
                matches!(err, Error::InvalidConfigValue(_)),
                "{}={} should be invalid",
                key,
                value
            );
        }
    }
}
