pub mod app;
pub mod catalog;
pub mod config;
pub mod detail;
pub mod error;
pub mod models;
pub mod orchestrator;
pub mod search;
pub mod storage;
pub mod watchlist;

pub use catalog::{CatalogApi, OmdbClient};
pub use error::{CatalogError, PersistenceError};
pub use orchestrator::{InputFocus, Orchestrator, View};
