//! Search coordinator: turns query edits into catalog searches.
//!
//! Each dispatched search owns a [`CancellationToken`]. Committing a new query
//! cancels the previous token inside the same `watch` write that publishes the
//! new state, and a finishing task re-checks its token inside its own write,
//! so a superseded response can never land after its replacement was issued.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::catalog::{cancellable, CatalogApi};
use crate::models::MovieSummary;

pub const MIN_QUERY_CHARS: usize = 3;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchState {
    pub results: Vec<MovieSummary>,
    pub loading: bool,
    pub error: Option<String>,
}

/// Trimmed query when it is long enough to be sent, `None` otherwise.
pub fn searchable(text: &str) -> Option<&str> {
    let trimmed = text.trim();
    (trimmed.chars().count() >= MIN_QUERY_CHARS).then_some(trimmed)
}

pub struct SearchCoordinator {
    catalog: Arc<dyn CatalogApi>,
    debounce: Duration,
    query: String,
    inflight: Option<CancellationToken>,
    state: Arc<watch::Sender<SearchState>>,
}

impl SearchCoordinator {
    pub fn new(catalog: Arc<dyn CatalogApi>, debounce: Duration) -> Self {
        let (tx, _rx) = watch::channel(SearchState::default());
        Self {
            catalog,
            debounce,
            query: String::new(),
            inflight: None,
            state: Arc::new(tx),
        }
    }

    /// Raw query text as last entered.
    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn snapshot(&self) -> SearchState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SearchState> {
        self.state.subscribe()
    }

    /// Commits new query text. Returns `true` when a search was dispatched.
    /// Text equal to the current query is ignored.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn set_query(&mut self, text: &str) -> bool {
        if text == self.query {
            return false;
        }
        self.query = text.to_string();
        let previous = self.inflight.take();

        let Some(query) = searchable(text).map(str::to_owned) else {
            self.state.send_modify(|state| {
                if let Some(token) = &previous {
                    token.cancel();
                }
                state.error = None;
                state.results.clear();
                state.loading = false;
            });
            return false;
        };

        let token = CancellationToken::new();
        self.state.send_modify(|state| {
            if let Some(token) = &previous {
                token.cancel();
            }
            state.error = None;
            state.loading = true;
        });
        self.inflight = Some(token.clone());

        debug!(query = %query, "Dispatching search");
        tokio::spawn(run_search(
            self.catalog.clone(),
            self.state.clone(),
            token,
            query,
            self.debounce,
        ));
        true
    }
}

impl Drop for SearchCoordinator {
    fn drop(&mut self) {
        if let Some(token) = self.inflight.take() {
            token.cancel();
        }
    }
}

async fn run_search(
    catalog: Arc<dyn CatalogApi>,
    state: Arc<watch::Sender<SearchState>>,
    token: CancellationToken,
    query: String,
    debounce: Duration,
) {
    let outcome = cancellable(&token, async {
        if !debounce.is_zero() {
            tokio::time::sleep(debounce).await;
        }
        catalog.search(&query).await
    })
    .await;

    state.send_if_modified(|state| {
        if token.is_cancelled() {
            debug!(query = %query, "Discarding superseded search");
            return false;
        }
        match outcome {
            Ok(results) => {
                debug!(query = %query, count = results.len(), "Search finished");
                state.results = results;
            }
            Err(err) if err.is_cancelled() => return false,
            Err(err) => {
                warn!(query = %query, "Search failed: {}", err);
                state.error = Some(err.to_string());
            }
        }
        state.loading = false;
        true
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_queries_are_not_searchable() {
        assert_eq!(searchable("in"), None);
        assert_eq!(searchable("  in  "), None);
        assert_eq!(searchable(""), None);
        assert_eq!(searchable(" inc "), Some("inc"));
        assert_eq!(searchable("inception"), Some("inception"));
    }

    #[test]
    fn counts_characters_not_bytes() {
        assert_eq!(searchable("éé"), None);
        assert_eq!(searchable("été"), Some("été"));
    }
}
