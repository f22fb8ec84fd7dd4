use std::sync::Arc;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::catalog::{cancellable, CatalogApi};
use crate::models::MovieDetail;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetailState {
    pub detail: Option<MovieDetail>,
    pub loading: bool,
    pub error: Option<String>,
}

/// Fetches the detail of the selected title. Uses the same cancellation
/// discipline as the search coordinator: one token per lookup, cancelled and
/// checked under the `watch` write lock.
pub struct DetailCoordinator {
    catalog: Arc<dyn CatalogApi>,
    selection: Option<String>,
    inflight: Option<CancellationToken>,
    state: Arc<watch::Sender<DetailState>>,
}

impl DetailCoordinator {
    pub fn new(catalog: Arc<dyn CatalogApi>) -> Self {
        let (tx, _rx) = watch::channel(DetailState::default());
        Self {
            catalog,
            selection: None,
            inflight: None,
            state: Arc::new(tx),
        }
    }

    pub fn selection(&self) -> Option<&str> {
        self.selection.as_deref()
    }

    pub fn snapshot(&self) -> DetailState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<DetailState> {
        self.state.subscribe()
    }

    /// True once the detail for `id` is the current selection and finished
    /// loading without error.
    pub fn is_ready_for(&self, id: &str) -> bool {
        if self.selection.as_deref() != Some(id) {
            return false;
        }
        let state = self.state.borrow();
        !state.loading && state.error.is_none() && state.detail.is_some()
    }

    /// Loaded detail for the current selection, if ready.
    pub fn ready_detail(&self) -> Option<MovieDetail> {
        let id = self.selection.as_deref()?;
        if !self.is_ready_for(id) {
            return None;
        }
        self.state.borrow().detail.clone()
    }

    /// Replaces the selection. `Some` starts a lookup (within a Tokio runtime),
    /// `None` discards all detail state.
    pub fn set_selection(&mut self, id: Option<&str>) {
        let previous = self.inflight.take();
        self.selection = id.map(str::to_owned);

        let Some(id) = id.map(str::to_owned) else {
            self.state.send_modify(|state| {
                if let Some(token) = &previous {
                    token.cancel();
                }
                *state = DetailState::default();
            });
            return;
        };

        let token = CancellationToken::new();
        self.state.send_modify(|state| {
            if let Some(token) = &previous {
                token.cancel();
            }
            state.detail = None;
            state.error = None;
            state.loading = true;
        });
        self.inflight = Some(token.clone());

        debug!(id = %id, "Dispatching lookup");
        tokio::spawn(run_lookup(self.catalog.clone(), self.state.clone(), token, id));
    }
}

impl Drop for DetailCoordinator {
    fn drop(&mut self) {
        if let Some(token) = self.inflight.take() {
            token.cancel();
        }
    }
}

async fn run_lookup(
    catalog: Arc<dyn CatalogApi>,
    state: Arc<watch::Sender<DetailState>>,
    token: CancellationToken,
    id: String,
) {
    let outcome = cancellable(&token, catalog.lookup(&id)).await;

    state.send_if_modified(|state| {
        if token.is_cancelled() {
            debug!(id = %id, "Discarding superseded lookup");
            return false;
        }
        match outcome {
            Ok(detail) => state.detail = Some(detail),
            Err(err) if err.is_cancelled() => return false,
            Err(err) => {
                warn!(id = %id, "Lookup failed: {}", err);
                state.error = Some(err.to_string());
            }
        }
        state.loading = false;
        true
    });
}
