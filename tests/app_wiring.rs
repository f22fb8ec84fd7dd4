use popcorn::app::build_orchestrator;
use popcorn::config::{AppConfig, CatalogConfig};
use popcorn::orchestrator::View;
use std::fs;

#[tokio::test]
async fn builds_from_config_and_loads_stored_watchlist() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("watched.json"),
        r#"[{"id":"tt0133093","title":"The Matrix","year":"1999","poster_url":"https://img/matrix.jpg","runtime_minutes":136,"imdb_rating":8.7,"user_rating":9}]"#,
    )
    .unwrap();

    let config = AppConfig::new(CatalogConfig::new("test-key"), dir.path());
    let mut orch = build_orchestrator(&config).expect("orchestrator builds");

    assert_eq!(orch.view(), View::Browsing);
    assert_eq!(orch.watchlist().len(), 1);
    assert_eq!(orch.summary().avg_runtime_minutes, 136.0);

    assert!(orch.delete_watched("tt0133093"));
    let stored = fs::read_to_string(dir.path().join("watched.json")).unwrap();
    assert_eq!(stored, "[]");
}

#[tokio::test]
async fn missing_data_dir_starts_empty() {
    let dir = tempfile::tempdir().unwrap();
    let config = AppConfig::new(CatalogConfig::new("test-key"), dir.path().join("not-yet"));
    let mut orch = build_orchestrator(&config).expect("orchestrator builds");

    assert!(orch.watchlist().is_empty());
    orch.set_query("in");
    assert!(orch.search_state().results.is_empty());
    assert!(!orch.search_state().loading);
}
