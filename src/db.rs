use std::time::Duration;

use rusqlite::{params, Connection, DatabaseName, OptionalExtension, Result};

use crate::clock;

pub const CURRENT_SCHEMA_VERSION: i64 = 1;
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5000;

struct Migration {
    version: i64,
    name: &'static str,
    sql: &'static str,
}

const MIGRATIONS: [Migration; 1] = [Migration {
    version: 1,
    name: "snippet_tag_schema_v1",
    sql: r#"
CREATE TABLE IF NOT EXISTS meta (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS snippet (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    content TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS tag (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL COLLATE NOCASE UNIQUE
        CHECK (name <> '' AND name = trim(name))
);

CREATE TABLE IF NOT EXISTS snippet_tag (
    snippet_id INTEGER NOT NULL REFERENCES snippet(id) ON DELETE CASCADE,
    tag_id INTEGER NOT NULL REFERENCES tag(id) ON DELETE CASCADE,
    PRIMARY KEY (snippet_id, tag_id)
);

CREATE INDEX IF NOT EXISTS idx_snippet_tag_tag ON snippet_tag(tag_id);
"#,
}];

pub fn open_connection(path: &str, busy_timeout_ms: u64) -> Result<Connection> {
    let mut conn = Connection::open(path)?;
    configure_for_speed(&conn, busy_timeout_ms)?;
    apply_migrations(&mut conn)?;
    Ok(conn)
}

#[cfg(test)]
pub fn open_in_memory() -> Result<Connection> {
    let mut conn = Connection::open_in_memory()?;
    conn.pragma_update(None::<DatabaseName>, "foreign_keys", "ON")?;
    apply_migrations(&mut conn)?;
    Ok(conn)
}

fn configure_for_speed(conn: &Connection, busy_timeout_ms: u64) -> Result<()> {
    conn.pragma_update(None::<DatabaseName>, "journal_mode", "WAL")?;
    conn.pragma_update(None::<DatabaseName>, "synchronous", "NORMAL")?;
    conn.pragma_update(None::<DatabaseName>, "foreign_keys", "ON")?;
    conn.pragma_update(None::<DatabaseName>, "temp_store", "MEMORY")?;
    conn.busy_timeout(Duration::from_millis(busy_timeout_ms))?;
    Ok(())
}

fn apply_migrations(conn: &mut Connection) -> Result<()> {
    let tx = conn.transaction()?;
    tx.execute_batch(
        r#"
CREATE TABLE IF NOT EXISTS schema_migrations (
    version INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    applied_at TEXT NOT NULL
);
"#,
    )?;

    for migration in MIGRATIONS {
        let already_applied: Option<i64> = tx
            .query_row(
                "SELECT version FROM schema_migrations WHERE version = ?1",
                params![migration.version],
                |row| row.get(0),
            )
            .optional()?;

        if already_applied.is_some() {
            continue;
        }

        tx.execute_batch(migration.sql)?;
        tx.execute(
            "INSERT INTO schema_migrations (version, name, applied_at) VALUES (?1, ?2, ?3)",
            params![
                migration.version,
                migration.name,
                clock::format_timestamp(clock::now_utc())
            ],
        )?;
    }

    tx.execute(
        r#"
INSERT INTO meta (key, value)
VALUES ('schema_version', ?1)
ON CONFLICT(key) DO UPDATE SET value = excluded.value
"#,
        params![CURRENT_SCHEMA_VERSION.to_string()],
    )?;

    tx.commit()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnippetRecord {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub created_at: String,
    pub updated_at: String,
}

pub struct InsertSnippet<'a> {
    pub title: &'a str,
    pub content: &'a str,
    pub created_at: &'a str,
    pub updated_at: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagRecord {
    pub id: i64,
    pub name: String,
}

fn snippet_from_row(row: &rusqlite::Row<'_>) -> Result<SnippetRecord> {
    Ok(SnippetRecord {
        id: row.get(0)?,
        title: row.get(1)?,
        content: row.get(2)?,
        created_at: row.get(3)?,
        updated_at: row.get(4)?,
    })
}

fn tag_from_row(row: &rusqlite::Row<'_>) -> Result<TagRecord> {
    Ok(TagRecord {
        id: row.get(0)?,
        name: row.get(1)?,
    })
}

pub fn insert_snippet(conn: &Connection, args: &InsertSnippet<'_>) -> Result<i64> {
    conn.execute(
        r#"
INSERT INTO snippet (title, content, created_at, updated_at)
VALUES (?1, ?2, ?3, ?4)
"#,
        params![args.title, args.content, args.created_at, args.updated_at],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Overwrites the mutable columns. `created_at` is never rewritten.
pub fn update_snippet(conn: &Connection, record: &SnippetRecord) -> Result<usize> {
    conn.execute(
        r#"
UPDATE snippet
SET title = ?2, content = ?3, updated_at = ?4
WHERE id = ?1
"#,
        params![record.id, record.title, record.content, record.updated_at],
    )
}

pub fn get_snippet(conn: &Connection, id: i64) -> Result<Option<SnippetRecord>> {
    conn.query_row(
        r#"
SELECT id, title, content, created_at, updated_at
FROM snippet
WHERE id = ?1
"#,
        params![id],
        snippet_from_row,
    )
    .optional()
}

pub fn list_snippets(conn: &Connection) -> Result<Vec<SnippetRecord>> {
    let mut stmt = conn.prepare(
        r#"
SELECT id, title, content, created_at, updated_at
FROM snippet
ORDER BY id ASC
"#,
    )?;
    let rows = stmt.query_map([], snippet_from_row)?;
    rows.collect()
}

pub fn snippet_exists(conn: &Connection, id: i64) -> Result<bool> {
    conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM snippet WHERE id = ?1)",
        params![id],
        |row| row.get(0),
    )
}

pub fn delete_snippet(conn: &Connection, id: i64) -> Result<usize> {
    conn.execute("DELETE FROM snippet WHERE id = ?1", params![id])
}

pub fn insert_tag(conn: &Connection, name: &str) -> Result<i64> {
    conn.execute("INSERT INTO tag (name) VALUES (?1)", params![name])?;
    Ok(conn.last_insert_rowid())
}

pub fn rename_tag(conn: &Connection, id: i64, name: &str) -> Result<usize> {
    conn.execute(
        "UPDATE tag SET name = ?2 WHERE id = ?1",
        params![id, name],
    )
}

pub fn get_tag(conn: &Connection, id: i64) -> Result<Option<TagRecord>> {
    conn.query_row(
        "SELECT id, name FROM tag WHERE id = ?1",
        params![id],
        tag_from_row,
    )
    .optional()
}

/// Exact match under the column's NOCASE collation.
pub fn find_tag_by_name(conn: &Connection, name: &str) -> Result<Option<TagRecord>> {
    conn.query_row(
        "SELECT id, name FROM tag WHERE name = ?1",
        params![name],
        tag_from_row,
    )
    .optional()
}

pub fn list_tags(conn: &Connection) -> Result<Vec<TagRecord>> {
    let mut stmt = conn.prepare("SELECT id, name FROM tag ORDER BY name ASC, id ASC")?;
    let rows = stmt.query_map([], tag_from_row)?;
    rows.collect()
}

pub fn tag_exists(conn: &Connection, id: i64) -> Result<bool> {
    conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM tag WHERE id = ?1)",
        params![id],
        |row| row.get(0),
    )
}

pub fn delete_tag(conn: &Connection, id: i64) -> Result<usize> {
    conn.execute("DELETE FROM tag WHERE id = ?1", params![id])
}

/// Returns true when the pair was not present before.
pub fn insert_link(conn: &Connection, snippet_id: i64, tag_id: i64) -> Result<bool> {
    let changed = conn.execute(
        "INSERT OR IGNORE INTO snippet_tag (snippet_id, tag_id) VALUES (?1, ?2)",
        params![snippet_id, tag_id],
    )?;
    Ok(changed == 1)
}

/// Returns true when the pair existed.
pub fn delete_link(conn: &Connection, snippet_id: i64, tag_id: i64) -> Result<bool> {
    let changed = conn.execute(
        "DELETE FROM snippet_tag WHERE snippet_id = ?1 AND tag_id = ?2",
        params![snippet_id, tag_id],
    )?;
    Ok(changed == 1)
}

pub fn delete_links_for_snippet(conn: &Connection, snippet_id: i64) -> Result<usize> {
    conn.execute(
        "DELETE FROM snippet_tag WHERE snippet_id = ?1",
        params![snippet_id],
    )
}

pub fn delete_links_for_tag(conn: &Connection, tag_id: i64) -> Result<usize> {
    conn.execute("DELETE FROM snippet_tag WHERE tag_id = ?1", params![tag_id])
}

pub fn list_tags_for_snippet(conn: &Connection, snippet_id: i64) -> Result<Vec<TagRecord>> {
    let mut stmt = conn.prepare(
        r#"
SELECT tag.id, tag.name
FROM snippet_tag
JOIN tag ON tag.id = snippet_tag.tag_id
WHERE snippet_tag.snippet_id = ?1
ORDER BY tag.name ASC, tag.id ASC
"#,
    )?;
    let rows = stmt.query_map(params![snippet_id], tag_from_row)?;
    rows.collect()
}

pub fn list_snippet_ids_for_tag(conn: &Connection, tag_id: i64) -> Result<Vec<i64>> {
    let mut stmt = conn.prepare(
        "SELECT snippet_id FROM snippet_tag WHERE tag_id = ?1 ORDER BY snippet_id ASC",
    )?;
    let rows = stmt.query_map(params![tag_id], |row| row.get(0))?;
    rows.collect()
}

#[cfg(test)]
mod tests;
