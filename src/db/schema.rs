// Database schema — table creation.
//
// A `schema_version` table records the applied schema version so later
// column additions can be gated on it.

use anyhow::{Context, Result};
use rusqlite::Connection;

/// Create all tables if they don't exist yet.
///
/// Idempotent: safe to call on every startup.
pub fn create_tables(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        -- Monitored accounts (the watch-list)
        CREATE TABLE IF NOT EXISTS accounts (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            remote_id TEXT NOT NULL UNIQUE,    -- platform user id
            handle TEXT NOT NULL UNIQUE,
            display_name TEXT NOT NULL DEFAULT '',
            bio TEXT NOT NULL DEFAULT '',
            followers INTEGER NOT NULL DEFAULT 0,
            added_at TEXT NOT NULL,            -- YYYY-MM-DD HH:MM:SS[.f]+00:00 (UTC)
            last_fetched TEXT
        );

        -- Fetched posts. remote_id is the dedup key.
        CREATE TABLE IF NOT EXISTS posts (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            account_id INTEGER NOT NULL REFERENCES accounts(id),
            remote_id TEXT NOT NULL UNIQUE,
            kind TEXT NOT NULL,                -- original / repost / quote
            text TEXT NOT NULL DEFAULT '',
            referenced_handle TEXT,            -- amplified author (handle string, not a FK)
            referenced_post_id TEXT,
            likes INTEGER NOT NULL DEFAULT 0,
            reposts INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL,          -- YYYY-MM-DD HH:MM:SS[.f]+00:00 (UTC)
            fetched_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        -- Posts read from the API per calendar month (free tier quota)
        CREATE TABLE IF NOT EXISTS api_usage (
            month TEXT PRIMARY KEY,            -- YYYY-MM
            posts_read INTEGER NOT NULL DEFAULT 0,
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_posts_account ON posts(account_id);
        CREATE INDEX IF NOT EXISTS idx_posts_created ON posts(created_at);
        CREATE INDEX IF NOT EXISTS idx_posts_kind ON posts(kind);
        ",
    )
    .context("Failed to create database tables")?;

    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
        [1],
    )?;

    Ok(())
}

/// Count the number of tables in the database (useful for init confirmation).
pub fn table_count(conn: &Connection) -> Result<i64> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'",
        [],
        |row| row.get(0),
    )?;
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_tables_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        create_tables(&conn).unwrap();
        create_tables(&conn).unwrap();
    }

    #[test]
    fn test_table_count() {
        let conn = Connection::open_in_memory().unwrap();
        create_tables(&conn).unwrap();
        // schema_version, accounts, posts, api_usage
        assert_eq!(table_count(&conn).unwrap(), 4i64);
    }
}
