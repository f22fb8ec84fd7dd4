use thiserror::Error;

/// Failures of a catalog request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    /// Network failure, timeout, non-2xx status or an undecodable body.
    #[error("{0}")]
    Transport(String),

    /// The service answered but reported a logical failure ("Movie not found!").
    #[error("{0}")]
    Domain(String),

    /// Superseded by a newer request. Never shown to the user.
    #[error("request cancelled")]
    Cancelled,
}

impl CatalogError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, CatalogError::Cancelled)
    }
}

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("stored watchlist is malformed: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("storage unavailable: {0}")]
    Unavailable(String),
}
