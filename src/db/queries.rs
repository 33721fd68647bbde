// Database queries — CRUD operations for all tables.
//
// Every database interaction goes through this module. This keeps SQL
// contained in one place and gives the rest of the app clean Rust interfaces.

use anyhow::Result;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};

use super::models::{Account, MonthlyUsage, NewAccount, NewPost, Post, PostCounts, PostKind};

const POST_COLUMNS: &str = "id, account_id, remote_id, kind, text, referenced_handle,
    referenced_post_id, likes, reposts, created_at";

const ACCOUNT_COLUMNS: &str =
    "id, remote_id, handle, display_name, bio, followers, added_at, last_fetched";

fn account_from_row(row: &Row<'_>) -> rusqlite::Result<Account> {
    Ok(Account {
        id: row.get(0)?,
        remote_id: row.get(1)?,
        handle: row.get(2)?,
        display_name: row.get(3)?,
        bio: row.get(4)?,
        followers: row.get(5)?,
        added_at: row.get(6)?,
        last_fetched: row.get(7)?,
    })
}

fn post_from_row(row: &Row<'_>) -> rusqlite::Result<Post> {
    let kind: String = row.get(3)?;
    Ok(Post {
        id: row.get(0)?,
        account_id: row.get(1)?,
        remote_id: row.get(2)?,
        kind: PostKind::parse(&kind),
        text: row.get(4)?,
        referenced_handle: row.get(5)?,
        referenced_post_id: row.get(6)?,
        likes: row.get(7)?,
        reposts: row.get(8)?,
        created_at: row.get(9)?,
    })
}

// --- Accounts ---

/// Add an account to the watch-list, or refresh its metadata if the
/// remote id is already known. Returns the local id.
pub fn upsert_account(conn: &Connection, account: &NewAccount) -> Result<i64> {
    conn.execute(
        "INSERT INTO accounts (remote_id, handle, display_name, bio, followers, added_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)
         ON CONFLICT(remote_id) DO UPDATE SET
            handle = ?2,
            display_name = ?3,
            bio = ?4,
            followers = ?5",
        params![
            account.remote_id,
            account.handle,
            account.display_name,
            account.bio,
            account.followers,
            Utc::now(),
        ],
    )?;

    let id = conn.query_row(
        "SELECT id FROM accounts WHERE remote_id = ?1",
        params![account.remote_id],
        |row| row.get(0),
    )?;
    Ok(id)
}

/// Remove an account and its stored posts. Returns false if no such handle.
pub fn remove_account(conn: &Connection, handle: &str) -> Result<bool> {
    let Some(account) = get_account_by_handle(conn, handle)? else {
        return Ok(false);
    };
    conn.execute("DELETE FROM posts WHERE account_id = ?1", params![account.id])?;
    conn.execute("DELETE FROM accounts WHERE id = ?1", params![account.id])?;
    Ok(true)
}

/// All monitored accounts, ordered by handle.
pub fn list_accounts(conn: &Connection) -> Result<Vec<Account>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {ACCOUNT_COLUMNS} FROM accounts ORDER BY handle"
    ))?;
    let rows = stmt.query_map([], account_from_row)?;

    let mut accounts = Vec::new();
    for row in rows {
        accounts.push(row?);
    }
    Ok(accounts)
}

/// Look up an account by handle (case-sensitive, as stored).
pub fn get_account_by_handle(conn: &Connection, handle: &str) -> Result<Option<Account>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE handle = ?1"
    ))?;
    let result = stmt.query_row(params![handle], account_from_row).optional()?;
    Ok(result)
}

/// Stamp an account's last successful fetch time.
pub fn update_last_fetched(conn: &Connection, account_id: i64, at: DateTime<Utc>) -> Result<()> {
    conn.execute(
        "UPDATE accounts SET last_fetched = ?1 WHERE id = ?2",
        params![at, account_id],
    )?;
    Ok(())
}

// --- Posts ---

/// Insert a post unless its remote id is already stored.
/// Returns true if a new row was written.
pub fn insert_post(conn: &Connection, account_id: i64, post: &NewPost) -> Result<bool> {
    let changed = conn.execute(
        "INSERT OR IGNORE INTO posts
            (account_id, remote_id, kind, text, referenced_handle, referenced_post_id,
             likes, reposts, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            account_id,
            post.remote_id,
            post.kind.as_str(),
            post.text,
            post.referenced_handle,
            post.referenced_post_id,
            post.likes,
            post.reposts,
            post.created_at,
        ],
    )?;
    Ok(changed > 0)
}

/// The remote id of an account's most recent stored post, used as the
/// `since_id` cursor for incremental fetches.
pub fn newest_post_id(conn: &Connection, account_id: i64) -> Result<Option<String>> {
    let mut stmt = conn.prepare(
        "SELECT remote_id FROM posts WHERE account_id = ?1
         ORDER BY created_at DESC, id DESC LIMIT 1",
    )?;
    let result = stmt.query_row(params![account_id], |row| row.get(0)).optional()?;
    Ok(result)
}

/// All posts created at or after `since`, newest first.
pub fn get_posts_since(conn: &Connection, since: DateTime<Utc>) -> Result<Vec<Post>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {POST_COLUMNS} FROM posts
         WHERE created_at >= ?1
         ORDER BY created_at DESC"
    ))?;
    let rows = stmt.query_map(params![since], post_from_row)?;

    let mut posts = Vec::new();
    for row in rows {
        posts.push(row?);
    }
    Ok(posts)
}

/// One account's posts created at or after `since`, newest first.
pub fn get_posts_for_account(
    conn: &Connection,
    account_id: i64,
    since: DateTime<Utc>,
) -> Result<Vec<Post>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {POST_COLUMNS} FROM posts
         WHERE account_id = ?1 AND created_at >= ?2
         ORDER BY created_at DESC"
    ))?;
    let rows = stmt.query_map(params![account_id, since], post_from_row)?;

    let mut posts = Vec::new();
    for row in rows {
        posts.push(row?);
    }
    Ok(posts)
}

/// Count posts by kind since a point in time.
pub fn count_by_type(conn: &Connection, since: DateTime<Utc>) -> Result<PostCounts> {
    let (original, repost, quote): (i64, i64, i64) = conn.query_row(
        "SELECT
            COALESCE(SUM(CASE WHEN kind = 'original' THEN 1 ELSE 0 END), 0),
            COALESCE(SUM(CASE WHEN kind = 'repost' THEN 1 ELSE 0 END), 0),
            COALESCE(SUM(CASE WHEN kind = 'quote' THEN 1 ELSE 0 END), 0)
         FROM posts WHERE created_at >= ?1",
        params![since],
        |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
    )?;
    Ok(PostCounts {
        original: original as usize,
        repost: repost as usize,
        quote: quote as usize,
    })
}

/// Total number of stored posts.
pub fn post_count(conn: &Connection) -> Result<i64> {
    let count = conn.query_row("SELECT COUNT(*) FROM posts", [], |row| row.get(0))?;
    Ok(count)
}

// --- API usage ---

/// Add to the number of posts read from the API in `month` (YYYY-MM).
pub fn add_posts_read(conn: &Connection, month: &str, count: i64) -> Result<()> {
    conn.execute(
        "INSERT INTO api_usage (month, posts_read, updated_at)
         VALUES (?1, ?2, datetime('now'))
         ON CONFLICT(month) DO UPDATE SET
            posts_read = posts_read + ?2,
            updated_at = datetime('now')",
        params![month, count],
    )?;
    Ok(())
}

/// Usage for `month` (YYYY-MM). Months with no row read as zero.
pub fn get_month_usage(conn: &Connection, month: &str) -> Result<MonthlyUsage> {
    let posts_read: Option<i64> = conn
        .query_row(
            "SELECT posts_read FROM api_usage WHERE month = ?1",
            params![month],
            |row| row.get(0),
        )
        .optional()?;
    Ok(MonthlyUsage {
        month: month.to_string(),
        posts_read: posts_read.unwrap_or(0),
    })
}
