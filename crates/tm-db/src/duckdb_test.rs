use super::*;

#[tokio::test]
async fn test_in_memory() {
    let db = DuckDbBackend::in_memory().unwrap();
    assert_eq!(db.db_type(), "duckdb");
    db.ping().await.unwrap();
}

#[tokio::test]
async fn test_memory_locations() {
    for location in ["", ":memory:", "memory"] {
        let db = DuckDbBackend::new(location).unwrap();
        db.ping().await.unwrap();
    }
}

#[tokio::test]
async fn test_schema_and_data_modes() {
    let db = DuckDbBackend::in_memory().unwrap();
    let created = db
        .execute(ExecMode::Schema, "CREATE TABLE t1 (id INT)")
        .await
        .unwrap();
    assert_eq!(created, 0);

    let inserted = db
        .execute(ExecMode::Data, "INSERT INTO t1 VALUES (1), (2), (3)")
        .await
        .unwrap();
    assert_eq!(inserted, 3);
    assert!(db.relation_exists("t1").await.unwrap());
}

#[tokio::test]
async fn test_query_rows() {
    let db = DuckDbBackend::in_memory().unwrap();
    db.execute(
        ExecMode::Schema,
        "CREATE TABLE v (sequence UBIGINT, version BIGINT, dirty UTINYINT, note VARCHAR)",
    )
    .await
    .unwrap();
    db.execute(
        ExecMode::Data,
        "INSERT INTO v VALUES (10, 1, 0, 'a'), (20, 2, 1, NULL)",
    )
    .await
    .unwrap();

    let rows = db
        .query(ExecMode::Data, "SELECT * FROM v ORDER BY sequence DESC")
        .await
        .unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].get_u64(0).unwrap(), 20);
    assert_eq!(rows[0].get_i64(1).unwrap(), 2);
    assert!(rows[0].get_bool(2).unwrap());
    assert_eq!(rows[0].values()[3], Value::Null);
    assert_eq!(rows[1].get_str(3).unwrap(), "a");
}

#[tokio::test]
async fn test_query_empty_result() {
    let db = DuckDbBackend::in_memory().unwrap();
    db.execute(ExecMode::Schema, "CREATE TABLE empty (id INT)")
        .await
        .unwrap();
    let rows = db
        .query(ExecMode::Data, "SELECT id FROM empty")
        .await
        .unwrap();
    assert!(rows.is_empty());
}

#[tokio::test]
async fn test_missing_table_is_classified() {
    let db = DuckDbBackend::in_memory().unwrap();
    let err = db
        .query(ExecMode::Data, "SELECT * FROM nonexistent")
        .await
        .unwrap_err();
    assert!(err.is_not_found(), "unexpected error: {err}");
    assert_eq!(err.sql(), Some("SELECT * FROM nonexistent"));
}

#[tokio::test]
async fn test_execution_error_keeps_sql() {
    let db = DuckDbBackend::in_memory().unwrap();
    let err = db
        .execute(ExecMode::Data, "INSERT INTO nowhere VALUES (1")
        .await
        .unwrap_err();
    assert_eq!(err.sql(), Some("INSERT INTO nowhere VALUES (1"));
}

#[tokio::test]
async fn test_execute_in_transaction_commits() {
    let db = DuckDbBackend::in_memory().unwrap();
    db.execute(
        ExecMode::Schema,
        "CREATE TABLE m (sequence UBIGINT PRIMARY KEY, version BIGINT, dirty UTINYINT)",
    )
    .await
    .unwrap();

    let affected = db
        .execute_in_transaction(
            "INSERT INTO m (sequence, version, dirty) VALUES (?, ?, ?)",
            &[Value::UBigInt(1), Value::BigInt(-1), Value::from(1u8)],
        )
        .await
        .unwrap();
    assert_eq!(affected, 1);

    let rows = db.query(ExecMode::Data, "SELECT version, dirty FROM m").await.unwrap();
    assert_eq!(rows[0].get_i64(0).unwrap(), -1);
    assert!(rows[0].get_bool(1).unwrap());
}

#[tokio::test]
async fn test_execute_in_transaction_rolls_back_on_error() {
    let db = DuckDbBackend::in_memory().unwrap();
    db.execute(ExecMode::Schema, "CREATE TABLE m (sequence UBIGINT PRIMARY KEY)")
        .await
        .unwrap();
    db.execute_in_transaction("INSERT INTO m VALUES (?)", &[Value::UBigInt(1)])
        .await
        .unwrap();

    let err = db
        .execute_in_transaction("INSERT INTO m VALUES (?)", &[Value::UBigInt(1)])
        .await;
    assert!(err.is_err());

    // The connection is usable again and still holds one row.
    let rows = db.query(ExecMode::Data, "SELECT COUNT(*) FROM m").await.unwrap();
    assert_eq!(rows[0].get_i64(0).unwrap(), 1);
}

#[tokio::test]
async fn test_relation_exists_qualified() {
    let db = DuckDbBackend::in_memory().unwrap();
    db.execute(ExecMode::Schema, "CREATE SCHEMA meta").await.unwrap();
    db.execute(ExecMode::Schema, "CREATE TABLE meta.versions (id INT)")
        .await
        .unwrap();

    assert!(db.relation_exists("meta.versions").await.unwrap());
    assert!(!db.relation_exists("versions").await.unwrap());
    assert!(!db.relation_exists("it's.odd").await.unwrap());
}

#[tokio::test]
async fn test_list_objects_views_first() {
    let db = DuckDbBackend::in_memory().unwrap();
    db.execute(ExecMode::Schema, "CREATE TABLE base (id INT)")
        .await
        .unwrap();
    db.execute(ExecMode::Schema, "CREATE VIEW base_view AS SELECT * FROM base")
        .await
        .unwrap();

    let objects = db.list_objects().await.unwrap();
    assert_eq!(objects.len(), 2);
    assert_eq!(objects[0].name, "base_view");
    assert_eq!(objects[0].kind, ObjectKind::View);
    assert_eq!(objects[1].name, "base");
    assert_eq!(objects[1].kind, ObjectKind::Table);
    assert_eq!(objects[1].drop_sql(), r#"DROP TABLE "main"."base""#);
}

#[tokio::test]
async fn test_list_objects_beyond_tables() {
    let db = DuckDbBackend::in_memory().unwrap();
    for sql in [
        "CREATE SCHEMA meta",
        "CREATE SEQUENCE seq_ids",
        "CREATE TYPE mood AS ENUM ('ok', 'sad')",
        "CREATE MACRO twice(x) AS x * 2",
        "CREATE MACRO numbers() AS TABLE SELECT 1 AS n",
        "CREATE TABLE meta.t (id INT DEFAULT nextval('seq_ids'), m mood)",
    ] {
        db.execute(ExecMode::Schema, sql).await.unwrap();
    }

    let kinds: Vec<(ObjectKind, String)> = db
        .list_objects()
        .await
        .unwrap()
        .into_iter()
        .map(|o| (o.kind, o.name))
        .collect();
    assert_eq!(
        kinds,
        vec![
            (ObjectKind::Table, "t".to_string()),
            (ObjectKind::TableMacro, "numbers".to_string()),
            (ObjectKind::Macro, "twice".to_string()),
            (ObjectKind::Sequence, "seq_ids".to_string()),
            (ObjectKind::Type, "mood".to_string()),
            (ObjectKind::Schema, "meta".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_list_objects_empty_database() {
    let db = DuckDbBackend::in_memory().unwrap();
    assert!(db.list_objects().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_close_then_use() {
    let db = DuckDbBackend::in_memory().unwrap();
    db.close().await.unwrap();
    assert!(matches!(db.ping().await, Err(DbError::Closed)));
    assert!(matches!(db.close().await, Err(DbError::Closed)));
}

#[tokio::test]
async fn test_file_database_persists() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("app.duckdb");
    {
        let db = DuckDbBackend::from_path(&path).unwrap();
        db.execute(ExecMode::Schema, "CREATE TABLE kept (id INT)")
            .await
            .unwrap();
        db.close().await.unwrap();
    }
    let db = DuckDbBackend::new(path.to_str().unwrap()).unwrap();
    assert!(db.relation_exists("kept").await.unwrap());
}

#[test]
fn test_exec_mode_from_statement_kind() {
    use tm_core::StatementKind;
    assert_eq!(ExecMode::from(StatementKind::Schema), ExecMode::Schema);
    assert_eq!(ExecMode::from(StatementKind::Data), ExecMode::Data);
}
