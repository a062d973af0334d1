use std::fs;

use aipanel_cli::config::{self, LOCAL_CONFIG_PATH};
use aipanel_cli::ConfigError;

#[tokio::test]
async fn explicit_file_is_loaded() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("aipanel.yaml");
    fs::write(
        &path,
        "logging:\n  level: debug\n  json: true\ntimings:\n  adapter:\n    observe_delay_ms: 2500\nbrowser:\n  headless: false\n",
    )
    .unwrap();

    let loaded = config::load(Some(path.as_path())).await.unwrap();
    assert!(loaded.from_file);
    assert_eq!(loaded.path, path);
    assert_eq!(loaded.config.logging.level, "debug");
    assert!(loaded.config.logging.json);
    assert_eq!(loaded.config.timings.adapter.observe_delay_ms, 2500);
    assert_eq!(loaded.config.timings.adapter.settle_ms, 300);
    assert!(!loaded.config.browser.headless);
}

#[tokio::test]
async fn missing_file_falls_back_to_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.yaml");

    let loaded = config::load(Some(path.as_path())).await.unwrap();
    assert!(!loaded.from_file);
    assert_eq!(loaded.config.timings.observer.stable_samples, 10);
    assert_eq!(loaded.config.registry().unwrap().len(), 4);
}

#[tokio::test]
async fn malformed_file_reports_its_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.yaml");
    fs::write(&path, "timings: [not, a, map]\n").unwrap();

    let err = config::load(Some(path.as_path())).await.unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }));
    assert!(err.to_string().contains("broken.yaml"));
}

#[test]
fn explicit_path_wins_resolution() {
    let explicit = std::path::Path::new("/tmp/elsewhere.yaml");
    assert_eq!(config::resolve_path(Some(explicit)), explicit);
    assert_eq!(LOCAL_CONFIG_PATH, "config/aipanel.yaml");
}
