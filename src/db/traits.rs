// Database trait — async interface for all post-store operations.
//
// Implementor: SqliteDatabase (wraps rusqlite). Methods are async so the
// fetch pipeline and daemon loop can hold an `Arc<dyn Database>` across
// await points without caring how the backend synchronizes.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::models::{Account, MonthlyUsage, NewAccount, NewPost, Post, PostCounts};

#[async_trait]
pub trait Database: Send + Sync {
    // --- Lifecycle ---

    /// Count the number of user-created tables in the database.
    async fn table_count(&self) -> Result<i64>;

    // --- Accounts ---

    /// Add or refresh a monitored account. Returns its local id.
    async fn upsert_account(&self, account: &NewAccount) -> Result<i64>;

    /// Remove an account and its posts. Returns false if the handle is unknown.
    async fn remove_account(&self, handle: &str) -> Result<bool>;

    /// All monitored accounts, ordered by handle.
    async fn list_accounts(&self) -> Result<Vec<Account>>;

    async fn get_account_by_handle(&self, handle: &str) -> Result<Option<Account>>;

    async fn update_last_fetched(&self, account_id: i64, at: DateTime<Utc>) -> Result<()>;

    // --- Posts ---

    /// Insert a post unless its remote id is already stored.
    async fn insert_post(&self, account_id: i64, post: &NewPost) -> Result<bool>;

    /// Remote id of the account's newest stored post.
    async fn newest_post_id(&self, account_id: i64) -> Result<Option<String>>;

    /// Posts created at or after `since`, newest first.
    async fn get_posts_since(&self, since: DateTime<Utc>) -> Result<Vec<Post>>;

    /// One account's posts created at or after `since`, newest first.
    async fn get_posts_for_account(&self, account_id: i64, since: DateTime<Utc>)
        -> Result<Vec<Post>>;

    async fn count_by_type(&self, since: DateTime<Utc>) -> Result<PostCounts>;

    async fn post_count(&self) -> Result<i64>;

    // --- API usage ---

    async fn add_posts_read(&self, month: &str, count: i64) -> Result<()>;

    async fn get_month_usage(&self, month: &str) -> Result<MonthlyUsage>;
}
