// X (Twitter) API integration — account lookup and timeline fetching.

pub mod client;
pub mod posts;
pub mod rate_limit;

pub use client::XClient;

use anyhow::Result;
use async_trait::async_trait;

use crate::db::models::{NewAccount, NewPost};

/// Strip whitespace and a leading `@` from a user-supplied handle.
pub fn normalize_handle(input: &str) -> String {
    let trimmed = input.trim();
    trimmed.strip_prefix('@').unwrap_or(trimmed).to_string()
}

/// Where monitored accounts and their posts come from.
///
/// XClient is the real implementation; the fetch cycle only depends on
/// this trait so it can run against canned data.
#[async_trait]
pub trait PostSource: Send + Sync {
    /// Resolve a handle to account metadata.
    async fn lookup_account(&self, handle: &str) -> Result<NewAccount>;

    /// Posts by `remote_id` newer than `since_id` (all recent posts if None).
    async fn fetch_posts(&self, remote_id: &str, since_id: Option<&str>) -> Result<Vec<NewPost>>;

    /// Called before each account's fetch so the source can pace itself.
    async fn wait_for_rate_limit(&self) {}
}

#[async_trait]
impl PostSource for XClient {
    async fn lookup_account(&self, handle: &str) -> Result<NewAccount> {
        let user = self.get_user(handle).await?;
        Ok(NewAccount {
            followers: user.followers(),
            remote_id: user.id,
            handle: user.username,
            display_name: user.name,
            bio: user.description,
        })
    }

    async fn fetch_posts(&self, remote_id: &str, since_id: Option<&str>) -> Result<Vec<NewPost>> {
        let response = self.get_user_posts(remote_id, since_id).await?;
        Ok(posts::normalize(&response))
    }

    async fn wait_for_rate_limit(&self) {
        XClient::wait_for_rate_limit(self).await;
    }
}
