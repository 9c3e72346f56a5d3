use super::*;

fn global(database: Option<&str>, config: Option<&str>) -> GlobalArgs {
    GlobalArgs {
        verbose: false,
        database: database.map(String::from),
        config: config.map(String::from),
    }
}

#[test]
fn test_load_config_defaults() {
    let config = load_config(&global(None, None)).unwrap();
    assert_eq!(config, DriverConfig::default());
}

#[test]
fn test_load_config_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tidemark.yml");
    std::fs::write(&path, "migrations-table: versions\nmulti-statement: true\n").unwrap();

    let config = load_config(&global(None, path.to_str())).unwrap();
    assert_eq!(config.migrations_table, "versions");
    assert!(config.multi_statement);
}

#[test]
fn test_load_config_missing_file() {
    let err = load_config(&global(None, Some("/nonexistent/tidemark.yml"))).unwrap_err();
    assert!(err.to_string().contains("/nonexistent/tidemark.yml"));
}

#[tokio::test]
async fn test_open_driver_requires_database() {
    let err = open_driver(&global(None, None)).await.unwrap_err();
    assert!(err.to_string().contains("TIDEMARK_DATABASE"));
}

#[tokio::test]
async fn test_open_driver_dsn_overrides_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tidemark.yml");
    std::fs::write(&path, "migrations-table: from_file\nmulti-statement: true\n").unwrap();

    let driver = open_driver(&global(
        Some("duckdb://memory?x-migrations-table=from_dsn"),
        path.to_str(),
    ))
    .await
    .unwrap();
    assert_eq!(driver.config().migrations_table, "from_dsn");
    assert!(driver.config().multi_statement);
    close_driver(driver).await.unwrap();
}

#[test]
fn test_ensure_clean() {
    assert!(ensure_clean(VersionState::NONE).is_ok());
    assert!(ensure_clean(VersionState::new(4, false)).is_ok());
    let err = ensure_clean(VersionState::new(4, true)).unwrap_err();
    assert!(err.to_string().contains("tidemark force 4"));
}

#[test]
fn test_open_script_missing() {
    let err = open_script("/nonexistent/1_init.sql").unwrap_err();
    assert!(err.to_string().contains("1_init.sql"));
}
