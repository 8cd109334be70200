mod config;
mod main_lib;

use std::path::PathBuf;

use anyhow::anyhow;
use config::Config;
use main_lib::{build_provider, build_store, init_tracing, load_holdings, run};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let holdings_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .ok_or_else(|| anyhow!("usage: divtrack-cli <holdings.json>"))?;

    let config = Config::from_env()?;
    let holdings = load_holdings(&holdings_path)?;
    tracing::info!(
        "Loaded {} holdings from {}",
        holdings.len(),
        holdings_path.display()
    );

    let store = build_store(&config)?;
    let provider = build_provider(&config);
    let metrics = run(&config, store, provider, &holdings).await?;

    println!("{}", serde_json::to_string_pretty(&metrics)?);
    Ok(())
}
