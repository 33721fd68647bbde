// SqliteDatabase — rusqlite backend implementing the Database trait.
//
// The Connection is wrapped in tokio::sync::Mutex because Connection is !Sync.
// Trait methods lock the mutex, do synchronous rusqlite work, and return.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::Connection;
use tokio::sync::Mutex;

use super::models::{Account, MonthlyUsage, NewAccount, NewPost, Post, PostCounts};
use super::queries;
use super::traits::Database;

pub struct SqliteDatabase {
    conn: Mutex<Connection>,
}

impl SqliteDatabase {
    /// Wrap an already-opened rusqlite Connection.
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }
}

#[async_trait]
impl Database for SqliteDatabase {
    async fn table_count(&self) -> Result<i64> {
        let conn = self.conn.lock().await;
        super::schema::table_count(&conn)
    }

    async fn upsert_account(&self, account: &NewAccount) -> Result<i64> {
        let conn = self.conn.lock().await;
        queries::upsert_account(&conn, account)
    }

    async fn remove_account(&self, handle: &str) -> Result<bool> {
        let conn = self.conn.lock().await;
        queries::remove_account(&conn, handle)
    }

    async fn list_accounts(&self) -> Result<Vec<Account>> {
        let conn = self.conn.lock().await;
        queries::list_accounts(&conn)
    }

    async fn get_account_by_handle(&self, handle: &str) -> Result<Option<Account>> {
        let conn = self.conn.lock().await;
        queries::get_account_by_handle(&conn, handle)
    }

    async fn update_last_fetched(&self, account_id: i64, at: DateTime<Utc>) -> Result<()> {
        let conn = self.conn.lock().await;
        queries::update_last_fetched(&conn, account_id, at)
    }

    async fn insert_post(&self, account_id: i64, post: &NewPost) -> Result<bool> {
        let conn = self.conn.lock().await;
        queries::insert_post(&conn, account_id, post)
    }

    async fn newest_post_id(&self, account_id: i64) -> Result<Option<String>> {
        let conn = self.conn.lock().await;
        queries::newest_post_id(&conn, account_id)
    }

    async fn get_posts_since(&self, since: DateTime<Utc>) -> Result<Vec<Post>> {
        let conn = self.conn.lock().await;
        queries::get_posts_since(&conn, since)
    }

    async fn get_posts_for_account(
        &self,
        account_id: i64,
        since: DateTime<Utc>,
    ) -> Result<Vec<Post>> {
        let conn = self.conn.lock().await;
        queries::get_posts_for_account(&conn, account_id, since)
    }

    async fn count_by_type(&self, since: DateTime<Utc>) -> Result<PostCounts> {
        let conn = self.conn.lock().await;
        queries::count_by_type(&conn, since)
    }

    async fn post_count(&self) -> Result<i64> {
        let conn = self.conn.lock().await;
        queries::post_count(&conn)
    }

    async fn add_posts_read(&self, month: &str, count: i64) -> Result<()> {
        let conn = self.conn.lock().await;
        queries::add_posts_read(&conn, month, count)
    }

    async fn get_month_usage(&self, month: &str) -> Result<MonthlyUsage> {
        let conn = self.conn.lock().await;
        queries::get_month_usage(&conn, month)
    }
}
