// System status display — DB stats, watch-list size, API quota, last fetch.

use anyhow::Result;
use std::sync::Arc;

use crate::db::models::MONTHLY_POST_LIMIT;
use crate::db::Database;
use crate::output::terminal::display_quota_warning;
use crate::pipeline::fetch::current_month;

/// Display system status to the terminal.
pub async fn show(db: &Arc<dyn Database>, db_display_path: &str) -> Result<()> {
    // Database file size
    let file_size = std::fs::metadata(db_display_path)
        .map(|m| format_bytes(m.len()))
        .unwrap_or_else(|_| "unknown".to_string());
    println!("Database: {} ({})", db_display_path, file_size);

    let accounts = db.list_accounts().await?;
    println!("Monitored accounts: {}", accounts.len());
    if accounts.is_empty() {
        println!("  Run `xmon add <handle>` to start monitoring");
    }

    println!("Stored posts: {}", db.post_count().await?);

    // Most recent fetch across all accounts
    match accounts.iter().filter_map(|a| a.last_fetched).max() {
        Some(last) => println!("Last fetch: {}", last.format("%Y-%m-%d %H:%M UTC")),
        None => println!("Last fetch: never"),
    }

    let usage = db.get_month_usage(&current_month()).await?;
    println!(
        "API usage ({}): {}/{} posts read ({:.0}%), {} remaining",
        usage.month,
        usage.posts_read,
        MONTHLY_POST_LIMIT,
        usage.percent_used(),
        usage.remaining()
    );
    display_quota_warning(&usage);

    Ok(())
}

fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}
