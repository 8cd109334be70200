use std::fs;
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use divtrack_core::{
    load_store_snapshot, save_store_snapshot, DividendEngine, DividendEngineTrait, DividendStore,
    Holding, PortfolioDividendMetrics,
};
use divtrack_market_data::{AlphaVantageProvider, DividendDataProvider};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::Config;

/// Logs go to stderr; stdout carries the metrics JSON.
pub fn init_tracing() {
    let log_format = std::env::var("DT_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_line_number(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

pub fn load_holdings(path: &Path) -> anyhow::Result<Vec<Holding>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read holdings from {}", path.display()))?;
    let holdings: Vec<Holding> = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not a JSON array of holdings", path.display()))?;
    Ok(holdings)
}

pub fn build_store(config: &Config) -> anyhow::Result<Arc<DividendStore>> {
    let store = match &config.store_snapshot {
        Some(path) => load_store_snapshot(path)?,
        None => DividendStore::new(),
    };
    Ok(Arc::new(store))
}

pub fn build_provider(config: &Config) -> Arc<dyn DividendDataProvider> {
    let provider = AlphaVantageProvider::new(config.api_key.clone());
    match &config.base_url {
        Some(url) => Arc::new(provider.with_base_url(url.clone())),
        None => Arc::new(provider),
    }
}

/// One reconcile-and-derive pass, persisting the store when configured.
pub async fn run(
    config: &Config,
    store: Arc<DividendStore>,
    provider: Arc<dyn DividendDataProvider>,
    holdings: &[Holding],
) -> anyhow::Result<PortfolioDividendMetrics> {
    let engine = DividendEngine::new(Arc::clone(&store), provider, config.engine.clone());
    let metrics = engine.reconcile_and_derive(holdings).await;

    let stats = engine.store_stats();
    tracing::info!(
        "Store holds {} identities ({} paying, {} funds)",
        stats.total,
        stats.dividend_paying,
        stats.fund_count
    );

    if let Some(path) = &config.store_snapshot {
        save_store_snapshot(&store, path)?;
    }
    Ok(metrics)
}
