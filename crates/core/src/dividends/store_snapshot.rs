//! JSON snapshot persistence for the dividend store.
//!
//! The engine itself never touches disk; callers that want the store to
//! survive restarts load a snapshot before the first run and save one after.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use divtrack_market_data::{CanonicalIdentity, DividendProfile};
use log::{debug, info};
use serde::{Deserialize, Serialize};

use super::dividend_store::DividendStore;
use crate::errors::{Error, Result};

const CURRENT_VERSION: u8 = 1;

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoreSnapshot {
    version: u8,
    profiles: HashMap<CanonicalIdentity, DividendProfile>,
}

/// Load a store from `path`. A missing file yields an empty store.
pub fn load_store_snapshot(path: &Path) -> Result<DividendStore> {
    if !path.exists() {
        debug!("No store snapshot at {}, starting empty", path.display());
        return Ok(DividendStore::new());
    }

    let raw = fs::read_to_string(path)?;
    let snapshot: StoreSnapshot = serde_json::from_str(&raw)?;
    if snapshot.version != CURRENT_VERSION {
        return Err(Error::Serialization(format!(
            "unsupported store snapshot version {}",
            snapshot.version
        )));
    }

    info!(
        "Loaded {} dividend profiles from {}",
        snapshot.profiles.len(),
        path.display()
    );
    Ok(DividendStore::from_profiles(snapshot.profiles))
}

/// Write the current store contents to `path`, creating parent directories.
pub fn save_store_snapshot(store: &DividendStore, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let snapshot = StoreSnapshot {
        version: CURRENT_VERSION,
        profiles: store.snapshot(),
    };
    let json = serde_json::to_string_pretty(&snapshot)?;
    fs::write(path, json)?;

    info!(
        "Saved {} dividend profiles to {}",
        snapshot.profiles.len(),
        path.display()
    );
    Ok(())
}
