use ladle_database::*;

#[tokio::test]
async fn connect_in_memory_and_health_check() {
    let db = Database::builder()
        .url("mem://")
        .session("test_ns", "test_db")
        .init()
        .await
        .expect("connect to mem://");

    // Health should be OK for mem://
    db.health().await.expect("health check");
    db.use_ns("test_ns").use_db("test_db").await.expect("session switch");
}

#[tokio::test]
async fn missing_parameters_fail_validation() {
    let err = Database::builder().init().await.unwrap_err();
    assert!(matches!(err, DatabaseError::Validation { .. }));
}

#[tokio::test]
async fn unreachable_engine_is_a_connection_error() {
    // Port 9 (discard) refuses connections immediately.
    let err = Database::builder()
        .url("ws://127.0.0.1:9")
        .session("test_ns", "unreachable")
        .wait_retries(1)
        .init()
        .await
        .unwrap_err();
    assert!(matches!(err, DatabaseError::Connection { .. }));
}

#[tokio::test]
async fn migrations_define_expected_tables() {
    let db = Database::builder()
        .url("mem://")
        .session("test_ns", "migrated")
        .init()
        .await
        .expect("connect and migrate");

    for table in ["user", "tag", "ingredient", "recipe", "migration"] {
        let mut response = db
            .query(format!("!(SELECT VALUE fields FROM ONLY INFO FOR TABLE {table}).is_empty()"))
            .await
            .expect("table info query");
        let defined = response.take::<Option<bool>>(0).expect("parse").unwrap_or_default();
        assert!(defined, "table {table} should be defined by migrations");
    }
}

#[tokio::test]
async fn rerunning_migrations_is_idempotent() {
    let db = Database::builder()
        .url("mem://")
        .session("test_ns", "idempotent")
        .init()
        .await
        .expect("first init");

    // init already ran the full set; a second pass must apply nothing.
    let second = db.migrate().await.expect("second pass");
    assert_eq!(second.applied, 0, "no migration should run twice");
    assert!(second.skipped > 0, "history should cover the builtin set");

    let mut response =
        db.query("SELECT slice, version FROM migration").await.expect("history rows");
    let rows = response.take::<surrealdb::types::Value>(0).expect("rows");
    let rendered = rows.to_string();
    assert!(rendered.contains("identity"), "identity migration recorded: {rendered}");
    assert!(rendered.contains("catalog"), "catalog migration recorded: {rendered}");
}
