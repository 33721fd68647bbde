// Colored terminal output for digests, the watch-list, and account detail.
//
// main.rs does the data loading and delegates all formatting here.

use chrono::{DateTime, Utc};
use colored::Colorize;

use crate::db::models::{Account, MonthlyUsage, Post, PostCounts, PostKind};
use crate::digest::{Digest, DIGEST_TEXT_LIMIT};

/// Recent posts in `show` are cut shorter than digest listings.
const RECENT_TEXT_LIMIT: usize = 70;

/// Display a digest in the terminal.
pub fn display_digest(digest: &Digest) {
    println!(
        "\n{} ({} - {})",
        "X DIGEST".magenta().bold(),
        digest.since.format("%b %-d"),
        digest.until.format("%b %-d, %Y"),
    );
    println!("{}", "━".repeat(37).dimmed());

    let counts = &digest.counts;
    println!(
        "\nSummary: {} accounts · {} posts · {} reposts · {} quotes\n",
        digest.account_count, counts.original, counts.repost, counts.quote
    );

    if digest.is_empty() {
        println!("  {}", "No posts in this window. Run `xmon fetch` first.".dimmed());
        println!();
        return;
    }

    if !digest.most_active.is_empty() {
        println!("{}", "Most Active".cyan().bold());
        for activity in &digest.most_active {
            println!(
                "  {:<20} {} posts",
                format!("@{}", activity.handle).cyan(),
                activity.count
            );
        }
        println!();
    }

    if !digest.most_amplified.is_empty() {
        println!("{}", "Most Amplified".cyan().bold());
        for amplified in &digest.most_amplified {
            println!(
                "  {:<20} {}",
                format!("@{}", amplified.handle).cyan(),
                format!("({} times)", amplified.count).dimmed()
            );
        }
        println!();
    }

    if !digest.amplified_by.is_empty() {
        println!("{}", "Amplified By Several".cyan().bold());
        for user in &digest.amplified_by {
            let amplifiers: Vec<String> =
                user.amplifiers.iter().map(|a| format!("@{}", a)).collect();
            println!(
                "  {:<20} {}",
                format!("@{}", user.handle).cyan(),
                amplifiers.join(", ").dimmed()
            );
        }
        println!();
    }

    if !digest.topics.is_empty() {
        println!("{}", "Trending Topics".cyan().bold());
        println!("  {}\n", digest.topics.join(" · ").dimmed());
    }

    if !digest.top_posts.is_empty() {
        println!("{}", "Notable Posts".cyan().bold());
        for post in &digest.top_posts {
            println!(
                "  {}: {}",
                format!("@{}", post.handle).cyan(),
                super::truncate_chars(&post.text, DIGEST_TEXT_LIMIT)
            );
            println!(
                "    {}",
                format!("↳ {} likes · {} reposts", post.likes, post.reposts).dimmed()
            );
        }
        println!();
    }
}

/// Display the narrative section of `digest --smart`.
pub fn display_insights(result: &anyhow::Result<String>) {
    println!("{}", "Key Themes (AI-generated)".cyan().bold());
    match result {
        Ok(text) => {
            for line in text.lines().filter(|l| !l.trim().is_empty()) {
                println!("  {}", line.trim());
            }
        }
        Err(e) => {
            println!("  {}", format!("Insights unavailable: {:#}", e).dimmed());
        }
    }
    println!();
}

/// Display the monitored account list.
pub fn display_accounts(accounts: &[Account]) {
    if accounts.is_empty() {
        println!("No accounts monitored yet. Add one with `xmon add <handle>`.");
        return;
    }

    println!(
        "\n{}",
        format!("=== Monitored Accounts ({}) ===", accounts.len()).bold()
    );
    println!();
    println!(
        "  {:<22} {:<28} {:>10}  {}",
        "Handle".dimmed(),
        "Name".dimmed(),
        "Followers".dimmed(),
        "Last fetched".dimmed(),
    );
    println!("  {}", "-".repeat(78).dimmed());

    for account in accounts {
        let last_fetched = account
            .last_fetched
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "never".to_string());
        println!(
            "  @{:<21} {:<28} {:>10}  {}",
            account.handle,
            super::truncate_chars(&account.display_name, 28),
            format_count(account.followers),
            last_fetched.dimmed(),
        );
    }
    println!();
}

/// Display one account's profile, activity breakdown, and recent posts.
pub fn display_account_detail(account: &Account, counts: &PostCounts, recent: &[Post], days: u32) {
    println!(
        "\n{} {}",
        format!("@{}", account.handle).cyan().bold(),
        account.display_name.bold()
    );
    if !account.bio.is_empty() {
        println!("  {}", account.bio.dimmed());
    }
    println!("  Followers: {}", format_count(account.followers));

    println!(
        "\n  Last {} days: {} posts · {} reposts · {} quotes",
        days, counts.original, counts.repost, counts.quote
    );

    if recent.is_empty() {
        println!("\n  {}", "No recent posts.".dimmed());
        return;
    }

    println!("\n  {}", "Recent posts:".bold());
    for post in recent {
        let marker = match post.kind {
            PostKind::Original => "".normal(),
            PostKind::Repost => "[RT] ".yellow(),
            PostKind::Quote => "[QT] ".blue(),
        };
        println!(
            "    {} {}{}",
            post.created_at.format("%b %-d %H:%M").to_string().dimmed(),
            marker,
            super::truncate_chars(&post.text, RECENT_TEXT_LIMIT)
        );
    }
    println!();
}

/// Print the monthly quota warning, if any.
pub fn display_quota_warning(usage: &MonthlyUsage) {
    if let Some(warning) = usage.quota_warning() {
        if usage.remaining() == 0 {
            println!("{} {}", "!!".red().bold(), warning.red());
        } else {
            println!("{} {}", "!".yellow(), warning.yellow());
        }
    }
}

/// One line describing the API rate-limit window after a fetch.
pub fn format_rate_limit(remaining: u32, reset_at: Option<DateTime<Utc>>) -> String {
    match reset_at {
        Some(reset) => format!(
            "Rate limit: {} requests remaining (resets {})",
            remaining,
            reset.format("%H:%M UTC")
        ),
        None => format!("Rate limit: {} requests remaining", remaining),
    }
}

/// 1234567 -> "1.2M", 45600 -> "45.6K".
pub fn format_count(n: i64) -> String {
    if n >= 1_000_000 {
        format!("{:.1}M", n as f64 / 1_000_000.0)
    } else if n >= 1_000 {
        format!("{:.1}K", n as f64 / 1_000.0)
    } else {
        n.to_string()
    }
}
