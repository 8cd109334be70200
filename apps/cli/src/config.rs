use std::path::PathBuf;

use anyhow::{anyhow, Context};
use divtrack_core::EngineConfig;

pub const ENV_API_KEY: &str = "DT_ALPHA_VANTAGE_API_KEY";
pub const ENV_BASE_URL: &str = "DT_ALPHA_VANTAGE_BASE_URL";
pub const ENV_STORE_SNAPSHOT: &str = "DT_STORE_SNAPSHOT";

#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: String,
    /// Overrides the Alpha Vantage endpoint.
    pub base_url: Option<String>,
    /// Store snapshot loaded before the run and written back after it.
    pub store_snapshot: Option<PathBuf>,
    pub engine: EngineConfig,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_key = value(ENV_API_KEY).ok_or_else(|| anyhow!("{} must be set", ENV_API_KEY))?;
        let engine = EngineConfig::from_lookup(&lookup).context("invalid engine configuration")?;

        Ok(Self {
            api_key,
            base_url: value(ENV_BASE_URL),
            store_snapshot: value(ENV_STORE_SNAPSHOT).map(PathBuf::from),
            engine,
        })
    }
}
