//! Query the movie catalog and print the mapped fields as pretty JSON.
//! Usage:
//!   cargo run --bin omdb_props -- search <text>
//!   cargo run --bin omdb_props -- lookup <imdb_id>
//!   cargo run --bin omdb_props -- watched
//! Requires OMDB_API_KEY in the environment (.env supported).

use anyhow::{Context, Result};
use dotenvy::dotenv;
use popcorn::catalog::{parse_imdb_id, CatalogApi, OmdbClient};
use popcorn::config::{AppConfig, CatalogConfig};
use popcorn::storage::{FileKeyValueStore, KeyValueStore};
use popcorn::watchlist::{Watchlist, WatchlistStore};
use serde_json::json;
use std::env;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

fn usage() -> ! {
    eprintln!("Usage: cargo run --bin omdb_props -- search <text>");
    eprintln!("       cargo run --bin omdb_props -- lookup <imdb_id>");
    eprintln!("       cargo run --bin omdb_props -- watched");
    std::process::exit(2);
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    init_tracing();

    let args: Vec<String> = env::args().skip(1).collect();
    let Some(command) = args.first() else { usage() };
    let rest = args[1..].join(" ");

    match command.as_str() {
        "search" if !rest.trim().is_empty() => {
            let client = OmdbClient::new(&CatalogConfig::from_env()?)?;
            info!("Catalog search: {}", rest.trim());
            let results = client
                .search(rest.trim())
                .await
                .with_context(|| format!("search for '{}' failed", rest.trim()))?;
            println!("{}", serde_json::to_string_pretty(&results)?);
        }
        "lookup" => {
            let id = parse_imdb_id(&rest).unwrap_or_else(|| usage());
            let client = OmdbClient::new(&CatalogConfig::from_env()?)?;
            info!("Catalog lookup: {}", id);
            let detail = client
                .lookup(&id)
                .await
                .with_context(|| format!("lookup of {} failed", id))?;
            let output = json!({
                "detail": detail,
                "runtime_minutes": detail.runtime_minutes(),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        "watched" => {
            let config = AppConfig::from_env()?;
            let kv: Arc<dyn KeyValueStore> = Arc::new(FileKeyValueStore::new(&config.data_dir));
            let store = WatchlistStore::new(kv);
            let watchlist = Watchlist::from_entries(store.try_load()?);
            let summary = watchlist.summary();
            let output = json!({
                "entries": watchlist.entries(),
                "count": summary.count,
                "avg_imdb_rating": summary.avg_imdb_rating,
                "avg_user_rating": summary.avg_user_rating,
                "avg_runtime_minutes": summary.avg_runtime_minutes,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        _ => usage(),
    }

    Ok(())
}
