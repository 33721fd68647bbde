use anyhow::Result;
use chrono::Utc;
use clap::{Parser, Subcommand};
use colored::Colorize;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

use xmon::config::Config;
use xmon::db::models::PostCounts;
use xmon::db::Database;
use xmon::digest::{
    build_digest, prompt::build_narrative_prompt, window_start, Digest, DigestOptions,
};
use xmon::llm::{NarrativeGenerator, OllamaClient};
use xmon::output::terminal;
use xmon::pipeline::{daemon, fetch};
use xmon::x::{normalize_handle, XClient};

/// xmon: watch-list monitoring for X accounts.
///
/// Periodically pulls posts from the accounts you follow closely and
/// summarizes what they're posting, amplifying, and talking about.
#[derive(Parser)]
#[command(name = "xmon", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the database
    Init,

    /// Add an account to the watch-list
    Add {
        /// The handle to monitor (with or without @)
        handle: String,
    },

    /// Remove an account and its stored posts
    Remove {
        handle: String,
    },

    /// List monitored accounts
    Accounts,

    /// Show recent activity for one account
    Show {
        handle: String,

        /// Number of days to include (default: 7)
        #[arg(long, default_value = "7")]
        days: u32,
    },

    /// Fetch new posts for all monitored accounts
    Fetch,

    /// Show an activity digest
    Digest {
        /// Number of days to include (default: XMON_DIGEST_DAYS or 7)
        #[arg(long)]
        days: Option<u32>,

        /// Add AI-generated insights from the local Ollama model
        #[arg(long)]
        smart: bool,

        /// Print the digest as JSON instead of formatted text
        #[arg(long)]
        json: bool,
    },

    /// Fetch on a schedule until interrupted
    Daemon {
        /// Minutes between fetches (default: XMON_FETCH_INTERVAL or 60)
        #[arg(long)]
        interval: Option<u64>,
    },

    /// Show system status (DB stats, API quota, last fetch)
    Status,
}

/// `digest --json` output: the digest plus the narrative when requested.
#[derive(Serialize)]
struct DigestReport<'a> {
    #[serde(flatten)]
    digest: &'a Digest,
    #[serde(skip_serializing_if = "Option::is_none")]
    insights: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    // Set up structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("xmon=info")),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::load()?;

    match cli.command {
        Commands::Init => {
            info!("Initializing xmon database...");
            let db = xmon::db::initialize_sqlite(&config.db_path)?;
            let table_count = db.table_count().await?;
            println!("Database initialized at: {}", config.db_path);
            println!("Tables created: {table_count}");
            println!("\nxmon is ready. Next step: set X_BEARER_TOKEN in your .env file");
            println!("Then run: xmon add <handle>");
        }

        Commands::Add { handle } => {
            config.require_bearer_token()?;
            let db = xmon::db::initialize_sqlite(&config.db_path)?;
            let client = XClient::new(&config.bearer_token)?;
            let handle = normalize_handle(&handle);

            let account = fetch::add_account(&client, &db, &handle).await?;
            println!(
                "{} Added @{} ({}, {} followers)",
                "✓".green(),
                account.handle,
                account.display_name,
                terminal::format_count(account.followers)
            );
        }

        Commands::Remove { handle } => {
            let db = xmon::db::open_sqlite(&config.db_path)?;
            let handle = normalize_handle(&handle);
            if db.remove_account(&handle).await? {
                println!("{} Removed @{}", "✓".green(), handle);
            } else {
                anyhow::bail!("Account @{} is not on the watch-list", handle);
            }
        }

        Commands::Accounts => {
            let db = xmon::db::open_sqlite(&config.db_path)?;
            let accounts = db.list_accounts().await?;
            terminal::display_accounts(&accounts);
        }

        Commands::Show { handle, days } => {
            let db = xmon::db::open_sqlite(&config.db_path)?;
            let handle = normalize_handle(&handle);
            let Some(account) = db.get_account_by_handle(&handle).await? else {
                anyhow::bail!("Account @{} not found. Add it with `xmon add {}`", handle, handle);
            };

            let since = window_start(Utc::now(), days)?;
            let posts = db.get_posts_for_account(account.id, since).await?;
            let counts = PostCounts::from_posts(&posts);
            let recent: Vec<_> = posts.into_iter().take(5).collect();
            terminal::display_account_detail(&account, &counts, &recent, days);
        }

        Commands::Fetch => {
            config.require_bearer_token()?;
            let db = xmon::db::open_sqlite(&config.db_path)?;
            let client = XClient::new(&config.bearer_token)?;

            let summary = fetch::run(&client, &db).await?;
            if summary.accounts > 0 {
                println!(
                    "{} Fetched {} accounts: {} posts read, {} new",
                    "✓".green(),
                    summary.accounts,
                    summary.posts_read,
                    summary.new_posts
                );
                if !summary.failed.is_empty() {
                    println!(
                        "{} Failed: {}",
                        "!".yellow(),
                        summary
                            .failed
                            .iter()
                            .map(|h| format!("@{h}"))
                            .collect::<Vec<_>>()
                            .join(", ")
                    );
                }
            }

            if let Some(remaining) = client.rate_limit().remaining() {
                let line = terminal::format_rate_limit(remaining, client.rate_limit().reset_at());
                println!("{}", line.dimmed());
            }

            let usage = db.get_month_usage(&fetch::current_month()).await?;
            terminal::display_quota_warning(&usage);
        }

        Commands::Digest { days, smart, json } => {
            let db = xmon::db::open_sqlite(&config.db_path)?;
            let days = days.unwrap_or(config.digest_days);
            let digest = load_digest(&db, days).await?;

            let insights = if smart {
                Some(generate_insights(&config, &digest).await)
            } else {
                None
            };

            if json {
                let report = DigestReport {
                    digest: &digest,
                    insights: insights.and_then(|r| r.ok()),
                };
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                terminal::display_digest(&digest);
                if let Some(result) = &insights {
                    terminal::display_insights(result);
                }
            }
        }

        Commands::Daemon { interval } => {
            config.require_bearer_token()?;
            let db = xmon::db::open_sqlite(&config.db_path)?;
            let client = XClient::new(&config.bearer_token)?;
            let minutes = interval.unwrap_or(config.fetch_interval_minutes).max(1);
            let period = daemon::interval_from_minutes(minutes)?;

            println!(
                "Fetching every {} minutes. Press Ctrl+C to stop.",
                minutes
            );

            let cycles = daemon::run(
                period,
                || fetch::run(&client, &db),
                shutdown_signal(),
            )
            .await;

            println!("Daemon stopped after {} cycles.", cycles);
        }

        Commands::Status => {
            if !std::path::Path::new(&config.db_path).exists() {
                println!("Database: not initialized");
                println!("\nRun `xmon init` to set up the database.");
                return Ok(());
            }
            let db = xmon::db::open_sqlite(&config.db_path)?;
            xmon::status::show(&db, &config.db_path).await?;
        }
    }

    Ok(())
}

/// Build a digest for the last `days` days from the store.
async fn load_digest(db: &Arc<dyn Database>, days: u32) -> Result<Digest> {
    let until = Utc::now();
    let since = window_start(until, days)?;

    let accounts = db.list_accounts().await?;
    let posts = db.get_posts_since(since).await?;
    info!(posts = posts.len(), days = days, "Building digest");

    Ok(build_digest(
        since,
        until,
        &accounts,
        &posts,
        &DigestOptions::default(),
    ))
}

/// Ask the local model for a narrative. Failures are returned, not raised,
/// so the digest still prints.
async fn generate_insights(config: &Config, digest: &Digest) -> Result<String> {
    let client = OllamaClient::new(&config.llm_url, &config.llm_model)?;
    let prompt = build_narrative_prompt(digest);
    info!(model = client.model(), "Generating digest insights");

    let result = client.generate(&prompt).await;
    if let Err(e) = &result {
        warn!(error = %e, "Insight generation failed");
    }
    result
}

/// Resolves on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
