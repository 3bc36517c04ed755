use super::{open_connection, CURRENT_SCHEMA_VERSION, DEFAULT_BUSY_TIMEOUT_MS};
use rusqlite::params;
use uuid::Uuid;

fn unique_db_path() -> String {
    std::env::temp_dir()
        .join(format!("snip-db-{}.sqlite", Uuid::now_v7()))
        .display()
        .to_string()
}

fn cleanup_db_files(path: &str) {
    for suffix in ["", "-wal", "-shm"] {
        let candidate = format!("{path}{suffix}");
        let _ = std::fs::remove_file(candidate);
    }
}

fn table_exists(conn: &rusqlite::Connection, table_name: &str) -> bool {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name=?1)",
            params![table_name],
            |row| row.get(0),
        )
        .expect("table existence query should be readable");
    exists == 1
}

fn pragma_i64(conn: &rusqlite::Connection, name: &str) -> i64 {
    conn.query_row(&format!("PRAGMA {name};"), [], |row| row.get(0))
        .unwrap_or_else(|err| panic!("{name} pragma should be readable: {err}"))
}

#[test]
fn configures_connection_pragmas() {
    let path = unique_db_path();
    let conn = open_connection(&path, DEFAULT_BUSY_TIMEOUT_MS).expect("connection should open");

    let journal_mode: String = conn
        .query_row("PRAGMA journal_mode;", [], |row| row.get(0))
        .expect("journal_mode pragma should be readable");
    assert_eq!(journal_mode.to_uppercase(), "WAL");
    assert_eq!(pragma_i64(&conn, "synchronous"), 1);
    assert_eq!(pragma_i64(&conn, "foreign_keys"), 1);
    assert_eq!(pragma_i64(&conn, "temp_store"), 2);
    assert_eq!(pragma_i64(&conn, "busy_timeout"), 5000);

    cleanup_db_files(&path);
}

#[test]
fn busy_timeout_follows_the_argument() {
    let path = unique_db_path();
    let conn = open_connection(&path, 750).expect("connection should open");
    assert_eq!(pragma_i64(&conn, "busy_timeout"), 750);
    cleanup_db_files(&path);
}

#[test]
fn initializes_required_tables_and_schema_version() {
    let path = unique_db_path();
    let conn = open_connection(&path, DEFAULT_BUSY_TIMEOUT_MS).expect("connection should open");

    for table in ["schema_migrations", "meta", "snippet", "tag", "snippet_tag"] {
        assert!(
            table_exists(&conn, table),
            "expected table '{}' to exist",
            table
        );
    }

    let schema_version: String = conn
        .query_row(
            "SELECT value FROM meta WHERE key='schema_version'",
            [],
            |row| row.get(0),
        )
        .expect("schema version should be stored in meta table");
    assert_eq!(schema_version, CURRENT_SCHEMA_VERSION.to_string());

    cleanup_db_files(&path);
}

#[test]
fn reapplies_migrations_idempotently() {
    let path = unique_db_path();
    let conn_first =
        open_connection(&path, DEFAULT_BUSY_TIMEOUT_MS).expect("first open should initialize");
    conn_first
        .execute(
            "INSERT INTO tag (name) VALUES ('survivor')",
            [],
        )
        .expect("seed row should insert");
    drop(conn_first);

    let conn_second =
        open_connection(&path, DEFAULT_BUSY_TIMEOUT_MS).expect("second open should be idempotent");
    let applied_count: i64 = conn_second
        .query_row("SELECT COUNT(*) FROM schema_migrations", [], |row| {
            row.get(0)
        })
        .expect("schema_migrations count should be queryable");
    assert_eq!(applied_count, CURRENT_SCHEMA_VERSION);

    let survivors: i64 = conn_second
        .query_row("SELECT COUNT(*) FROM tag", [], |row| row.get(0))
        .expect("tag count should be queryable");
    assert_eq!(survivors, 1);

    cleanup_db_files(&path);
}

#[test]
fn tag_names_are_unique_ignoring_case() {
    let conn = super::open_in_memory().expect("db should open");
    conn.execute("INSERT INTO tag (name) VALUES ('rust')", [])
        .expect("first insert should succeed");

    let err = conn
        .execute("INSERT INTO tag (name) VALUES ('RUST')", [])
        .expect_err("case variant should collide");
    assert_eq!(
        err.sqlite_error().map(|e| e.extended_code),
        Some(rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE)
    );
}

#[test]
fn tag_names_must_be_non_blank_and_trimmed() {
    let conn = super::open_in_memory().expect("db should open");
    for bad in ["", " padded", "padded "] {
        assert!(
            conn.execute("INSERT INTO tag (name) VALUES (?1)", params![bad])
                .is_err(),
            "'{bad}' should violate the name check"
        );
    }
}

#[test]
fn deleting_rows_cascades_to_links() {
    let conn = super::open_in_memory().expect("db should open");
    conn.execute_batch(
        r#"
INSERT INTO snippet (id, title, content, created_at, updated_at)
VALUES (1, 't', 'c', '2026-01-01T00:00:00Z', '2026-01-01T00:00:00Z');
INSERT INTO tag (id, name) VALUES (1, 'a'), (2, 'b');
INSERT INTO snippet_tag (snippet_id, tag_id) VALUES (1, 1), (1, 2);
DELETE FROM tag WHERE id = 1;
"#,
    )
    .expect("seed should apply");

    let remaining: i64 = conn
        .query_row("SELECT COUNT(*) FROM snippet_tag", [], |row| row.get(0))
        .expect("link count should be readable");
    assert_eq!(remaining, 1);

    conn.execute("DELETE FROM snippet WHERE id = 1", [])
        .expect("snippet delete should succeed");
    let remaining: i64 = conn
        .query_row("SELECT COUNT(*) FROM snippet_tag", [], |row| row.get(0))
        .expect("link count should be readable");
    assert_eq!(remaining, 0);
}

#[test]
fn links_require_existing_rows() {
    let conn = super::open_in_memory().expect("db should open");
    assert!(conn
        .execute(
            "INSERT INTO snippet_tag (snippet_id, tag_id) VALUES (41, 42)",
            [],
        )
        .is_err());
}
