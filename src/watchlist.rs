use std::collections::HashSet;
use std::sync::Arc;
use tracing::{info, warn};

use crate::error::PersistenceError;
use crate::models::{UserRating, WatchedEntry};
use crate::storage::KeyValueStore;

pub const WATCHLIST_KEY: &str = "watched";

/// Watched movies in insertion order, at most one entry per id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Watchlist {
    entries: Vec<WatchedEntry>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WatchlistSummary {
    pub count: usize,
    pub avg_imdb_rating: f32,
    pub avg_user_rating: f32,
    pub avg_runtime_minutes: f32,
}

impl Watchlist {
    /// Builds a watchlist, keeping the first entry for any repeated id.
    pub fn from_entries(entries: Vec<WatchedEntry>) -> Self {
        let mut seen = HashSet::new();
        let entries = entries
            .into_iter()
            .filter(|e| seen.insert(e.id.clone()))
            .collect();
        Self { entries }
    }

    pub fn entries(&self) -> &[WatchedEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.iter().any(|e| e.id == id)
    }

    pub fn get(&self, id: &str) -> Option<&WatchedEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn rating_for(&self, id: &str) -> Option<UserRating> {
        self.get(id).map(|e| e.user_rating)
    }

    /// Appends `entry`. An id already present is rejected; ratings are fixed
    /// once added.
    pub fn add(&mut self, entry: WatchedEntry) -> bool {
        if self.contains(&entry.id) {
            return false;
        }
        self.entries.push(entry);
        true
    }

    pub fn remove(&mut self, id: &str) -> Option<WatchedEntry> {
        let pos = self.entries.iter().position(|e| e.id == id)?;
        Some(self.entries.remove(pos))
    }

    pub fn summary(&self) -> WatchlistSummary {
        WatchlistSummary {
            count: self.entries.len(),
            avg_imdb_rating: average(self.entries.iter().map(|e| e.imdb_rating)),
            avg_user_rating: average(self.entries.iter().map(|e| f32::from(e.user_rating.get()))),
            avg_runtime_minutes: average(self.entries.iter().map(|e| e.runtime_minutes as f32)),
        }
    }
}

fn average(values: impl Iterator<Item = f32>) -> f32 {
    let (sum, count) = values.fold((0.0f32, 0usize), |(s, n), v| (s + v, n + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f32
    }
}

/// The watchlist's slot in a [`KeyValueStore`].
#[derive(Clone)]
pub struct WatchlistStore {
    kv: Arc<dyn KeyValueStore>,
    key: String,
}

impl WatchlistStore {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self::with_key(kv, WATCHLIST_KEY)
    }

    pub fn with_key(kv: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self {
            kv,
            key: key.into(),
        }
    }

    pub fn try_load(&self) -> Result<Vec<WatchedEntry>, PersistenceError> {
        match self.kv.get(&self.key)? {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(Vec::new()),
        }
    }

    /// Stored entries, or an empty list when nothing usable is stored.
    pub fn load(&self) -> Vec<WatchedEntry> {
        match self.try_load() {
            Ok(entries) => {
                info!("Loaded {} watched entries", entries.len());
                entries
            }
            Err(e) => {
                warn!("Ignoring stored watchlist: {}", e);
                Vec::new()
            }
        }
    }

    /// Overwrites the slot with `entries`.
    pub fn save(&self, entries: &[WatchedEntry]) -> Result<(), PersistenceError> {
        let raw = serde_json::to_string(entries)?;
        self.kv.set(&self.key, &raw)
    }
}
