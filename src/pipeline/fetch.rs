// Fetch cycle: pull new posts for every monitored account into the store.
//
// Accounts are fetched one at a time, newest-stored post id first, so each
// request only returns what we haven't seen. Every post read counts against
// the monthly API quota whether or not it turns out to be new. A failing
// account is logged and skipped; the rest of the cycle still runs.

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

use crate::db::models::{Account, NewAccount};
use crate::db::Database;
use crate::x::PostSource;

/// What one fetch cycle did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchSummary {
    pub accounts: usize,
    pub posts_read: usize,
    pub new_posts: usize,
    /// Handles whose fetch failed this cycle.
    pub failed: Vec<String>,
}

/// Current month key for API usage (YYYY-MM).
pub fn current_month() -> String {
    Utc::now().format("%Y-%m").to_string()
}

/// Look up a handle and add it to the watch-list.
///
/// A handle already on the list is rejected before the API is called.
pub async fn add_account(
    source: &dyn PostSource,
    db: &Arc<dyn Database>,
    handle: &str,
) -> Result<NewAccount> {
    if db.get_account_by_handle(handle).await?.is_some() {
        anyhow::bail!("Account @{} is already being monitored", handle);
    }

    let account = source
        .lookup_account(handle)
        .await
        .with_context(|| format!("Failed to look up @{}", handle))?;

    let id = db.upsert_account(&account).await?;
    info!(handle = %account.handle, id = id, "Account added to watch-list");
    Ok(account)
}

/// Fetch one account and store its new posts. Returns (read, inserted).
async fn fetch_account(
    source: &dyn PostSource,
    db: &Arc<dyn Database>,
    account: &Account,
) -> Result<(usize, usize)> {
    source.wait_for_rate_limit().await;

    let since_id = db.newest_post_id(account.id).await?;
    let posts = source
        .fetch_posts(&account.remote_id, since_id.as_deref())
        .await
        .with_context(|| format!("Failed to fetch posts for @{}", account.handle))?;

    let mut inserted = 0;
    for post in &posts {
        if db.insert_post(account.id, post).await? {
            inserted += 1;
        }
    }

    db.update_last_fetched(account.id, Utc::now()).await?;
    if !posts.is_empty() {
        db.add_posts_read(&current_month(), posts.len() as i64)
            .await?;
    }

    Ok((posts.len(), inserted))
}

/// Run one fetch cycle over all monitored accounts.
pub async fn run(source: &dyn PostSource, db: &Arc<dyn Database>) -> Result<FetchSummary> {
    let accounts = db.list_accounts().await?;
    if accounts.is_empty() {
        println!("No accounts to fetch. Add one with `xmon add <handle>`.");
        return Ok(FetchSummary::default());
    }

    let mut summary = FetchSummary {
        accounts: accounts.len(),
        ..Default::default()
    };

    let pb = ProgressBar::new(accounts.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("  Fetching [{bar:30}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    for account in &accounts {
        pb.set_message(format!("@{}", account.handle));
        match fetch_account(source, db, account).await {
            Ok((read, inserted)) => {
                info!(
                    handle = %account.handle,
                    read = read,
                    new = inserted,
                    "Fetched account"
                );
                summary.posts_read += read;
                summary.new_posts += inserted;
            }
            Err(e) => {
                warn!(
                    handle = %account.handle,
                    error = %e,
                    "Fetch failed, continuing with next account"
                );
                summary.failed.push(account.handle.clone());
            }
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    info!(
        accounts = summary.accounts,
        read = summary.posts_read,
        new = summary.new_posts,
        failed = summary.failed.len(),
        "Fetch cycle complete"
    );

    Ok(summary)
}
