use anyhow::Result;
use std::sync::Arc;
use tracing::info;

use crate::catalog::{CatalogApi, OmdbClient};
use crate::config::AppConfig;
use crate::orchestrator::Orchestrator;
use crate::storage::{FileKeyValueStore, KeyValueStore};
use crate::watchlist::WatchlistStore;

/// Wires the OMDb client and the file-backed watchlist into an orchestrator.
pub fn build_orchestrator(config: &AppConfig) -> Result<Orchestrator> {
    let catalog: Arc<dyn CatalogApi> = Arc::new(OmdbClient::new(&config.catalog)?);
    let kv: Arc<dyn KeyValueStore> = Arc::new(FileKeyValueStore::new(&config.data_dir));
    info!("Using data directory {:?}", config.data_dir);
    Ok(Orchestrator::new(
        catalog,
        WatchlistStore::new(kv),
        config.search_debounce,
    ))
}
