use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::catalog::CatalogApi;
use crate::detail::{DetailCoordinator, DetailState};
use crate::models::{UserRating, WatchedEntry};
use crate::search::{searchable, SearchCoordinator, SearchState};
use crate::watchlist::{Watchlist, WatchlistStore, WatchlistSummary};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View {
    Browsing,
    Viewing(String),
}

/// Lets the core ask the presentation layer to focus the search input.
pub trait InputFocus: Send + Sync {
    fn focus_search(&self);
}

/// Ties query, selection, search results and the watchlist together.
///
/// All mutation goes through `&mut self`, so watchlist writes are serialized
/// and persisted before the call returns.
pub struct Orchestrator {
    search: SearchCoordinator,
    detail: DetailCoordinator,
    watchlist: Watchlist,
    store: WatchlistStore,
    focus: Option<Arc<dyn InputFocus>>,
}

impl Orchestrator {
    /// Loads the stored watchlist synchronously before returning.
    pub fn new(catalog: Arc<dyn CatalogApi>, store: WatchlistStore, search_debounce: Duration) -> Self {
        let watchlist = Watchlist::from_entries(store.load());
        Self {
            search: SearchCoordinator::new(catalog.clone(), search_debounce),
            detail: DetailCoordinator::new(catalog),
            watchlist,
            store,
            focus: None,
        }
    }

    pub fn with_input_focus(mut self, focus: Arc<dyn InputFocus>) -> Self {
        self.focus = Some(focus);
        self
    }

    pub fn view(&self) -> View {
        match self.detail.selection() {
            Some(id) => View::Viewing(id.to_string()),
            None => View::Browsing,
        }
    }

    pub fn selected_id(&self) -> Option<&str> {
        self.detail.selection()
    }

    pub fn query(&self) -> &str {
        self.search.query()
    }

    pub fn search_state(&self) -> SearchState {
        self.search.snapshot()
    }

    pub fn detail_state(&self) -> DetailState {
        self.detail.snapshot()
    }

    pub fn subscribe_search(&self) -> watch::Receiver<SearchState> {
        self.search.subscribe()
    }

    pub fn subscribe_detail(&self) -> watch::Receiver<DetailState> {
        self.detail.subscribe()
    }

    pub fn results_count(&self) -> usize {
        self.search_state().results.len()
    }

    pub fn watchlist(&self) -> &Watchlist {
        &self.watchlist
    }

    pub fn summary(&self) -> WatchlistSummary {
        self.watchlist.summary()
    }

    pub fn is_watched(&self, id: &str) -> bool {
        self.watchlist.contains(id)
    }

    pub fn watched_rating(&self, id: &str) -> Option<UserRating> {
        self.watchlist.rating_for(id)
    }

    /// A query that starts a new search closes the open detail first.
    /// Re-entering the current query changes nothing.
    pub fn set_query(&mut self, text: &str) {
        if text == self.search.query() {
            return;
        }
        if searchable(text).is_some() && self.detail.selection().is_some() {
            debug!("New search closes the open detail");
            self.detail.set_selection(None);
        }
        self.search.set_query(text);
    }

    /// Selecting the already-selected id toggles back to browsing.
    pub fn select(&mut self, id: &str) {
        if self.detail.selection() == Some(id) {
            self.detail.set_selection(None);
        } else {
            self.detail.set_selection(Some(id));
        }
    }

    pub fn close(&mut self) {
        if self.detail.selection().is_some() {
            self.detail.set_selection(None);
        }
    }

    /// Adds the selected, fully loaded and not yet watched movie with `rating`.
    /// Returns `false` (and changes nothing) when the guard is not met.
    pub fn confirm_add(&mut self, rating: UserRating) -> bool {
        let Some(id) = self.detail.selection().map(str::to_owned) else {
            return false;
        };
        if self.watchlist.contains(&id) {
            return false;
        }
        let Some(detail) = self.detail.ready_detail() else {
            debug!(id = %id, "Add ignored, detail not ready");
            return false;
        };

        let mut entry = WatchedEntry::from_detail(&detail, rating);
        entry.id = id;
        if !self.watchlist.add(entry) {
            return false;
        }
        info!("Added '{}' to watched with rating {}", detail.title, rating);
        self.persist();
        self.close();
        true
    }

    /// Removes the selected movie from the watchlist and closes the detail.
    pub fn confirm_remove(&mut self) -> bool {
        let Some(id) = self.detail.selection().map(str::to_owned) else {
            return false;
        };
        if !self.delete_watched(&id) {
            return false;
        }
        self.close();
        true
    }

    /// Deletes an entry straight from the watched list.
    pub fn delete_watched(&mut self, id: &str) -> bool {
        match self.watchlist.remove(id) {
            Some(entry) => {
                info!("Removed '{}' from watched", entry.title);
                self.persist();
                true
            }
            None => false,
        }
    }

    /// Enter outside the search input focuses it and clears the query.
    pub fn handle_enter_key(&mut self, search_focused: bool) -> bool {
        if search_focused {
            return false;
        }
        if let Some(focus) = &self.focus {
            focus.focus_search();
        }
        self.set_query("");
        true
    }

    fn persist(&self) {
        if let Err(e) = self.store.save(self.watchlist.entries()) {
            warn!("Failed to persist watchlist: {}", e);
        }
    }
}
