use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://www.omdbapi.com/";
const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;
const DEFAULT_DATA_DIR: &str = "data";

/// Connection settings for the remote movie catalog.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    pub api_key: String,
    pub base_url: String,
    pub timeout: Duration,
    pub connect_timeout: Duration,
}

impl CatalogConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
        }
    }

    pub fn from_env() -> Result<Self> {
        let api_key = env::var("OMDB_API_KEY").context("OMDB_API_KEY not set")?;
        let mut config = Self::new(api_key);
        if let Some(url) = env::var("OMDB_BASE_URL").ok().filter(|s| !s.is_empty()) {
            config.base_url = url;
        }
        if let Some(secs) = parse_env::<u64>("OMDB_TIMEOUT_SECS")? {
            config.timeout = Duration::from_secs(secs);
        }
        Ok(config)
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub catalog: CatalogConfig,
    /// Directory holding the persisted key-value slots.
    pub data_dir: PathBuf,
    /// Quiet period before a search is sent. Zero sends immediately.
    pub search_debounce: Duration,
}

impl AppConfig {
    pub fn new(catalog: CatalogConfig, data_dir: impl Into<PathBuf>) -> Self {
        Self {
            catalog,
            data_dir: data_dir.into(),
            search_debounce: Duration::ZERO,
        }
    }

    pub fn from_env() -> Result<Self> {
        let catalog = CatalogConfig::from_env()?;
        let data_dir = env::var("POPCORN_DATA_DIR")
            .ok()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_DATA_DIR.to_string());
        let mut config = Self::new(catalog, data_dir);
        if let Some(ms) = parse_env::<u64>("POPCORN_SEARCH_DEBOUNCE_MS")? {
            config.search_debounce = Duration::from_millis(ms);
        }
        Ok(config)
    }
}

fn parse_env<T: std::str::FromStr>(key: &str) -> Result<Option<T>>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map(Some)
            .with_context(|| format!("{} is not a valid number: {}", key, raw)),
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_defaults_are_bounded() {
        let config = CatalogConfig::new("key");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert!(config.connect_timeout <= config.timeout);
    }

    #[test]
    fn app_config_defaults_to_no_debounce() {
        let config = AppConfig::new(CatalogConfig::new("key"), "/tmp/popcorn");
        assert_eq!(config.search_debounce, Duration::ZERO);
        assert_eq!(config.data_dir, PathBuf::from("/tmp/popcorn"));
    }
}
