// Composition tests — the full collect -> store -> digest -> prompt chain.
//
// A canned PostSource stands in for the X API and an in-memory SQLite
// database stands in for the on-disk store, so nothing touches the network
// or the filesystem.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use rusqlite::Connection;

use xmon::db::models::{NewAccount, NewPost, PostKind};
use xmon::db::schema::create_tables;
use xmon::db::sqlite::SqliteDatabase;
use xmon::db::Database;
use xmon::digest::prompt::build_narrative_prompt;
use xmon::digest::{build_digest, DigestOptions, DIGEST_TEXT_LIMIT};
use xmon::output::truncate_chars;
use xmon::pipeline::fetch;
use xmon::x::PostSource;

struct CannedSource {
    accounts: HashMap<String, NewAccount>,
    /// remote user id -> timeline, newest first
    timelines: HashMap<String, Vec<NewPost>>,
}

#[async_trait]
impl PostSource for CannedSource {
    async fn lookup_account(&self, handle: &str) -> Result<NewAccount> {
        self.accounts
            .get(handle)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("User @{handle} not found"))
    }

    async fn fetch_posts(&self, remote_id: &str, since_id: Option<&str>) -> Result<Vec<NewPost>> {
        let Some(timeline) = self.timelines.get(remote_id) else {
            anyhow::bail!("X API /users/{remote_id}/tweets returned 503 Service Unavailable");
        };
        Ok(timeline
            .iter()
            .filter(|p| since_id.map_or(true, |id| p.remote_id.as_str() > id))
            .cloned()
            .collect())
    }
}

/// Wraps a source and counts account lookups.
struct CountingSource {
    inner: CannedSource,
    lookups: AtomicUsize,
}

#[async_trait]
impl PostSource for CountingSource {
    async fn lookup_account(&self, handle: &str) -> Result<NewAccount> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.inner.lookup_account(handle).await
    }

    async fn fetch_posts(&self, remote_id: &str, since_id: Option<&str>) -> Result<Vec<NewPost>> {
        self.inner.fetch_posts(remote_id, since_id).await
    }
}

fn account(remote_id: &str, handle: &str) -> NewAccount {
    NewAccount {
        remote_id: remote_id.to_string(),
        handle: handle.to_string(),
        display_name: handle.to_string(),
        bio: String::new(),
        followers: 1000,
    }
}

fn new_post(
    remote_id: &str,
    kind: PostKind,
    text: &str,
    referenced: Option<&str>,
    likes: i64,
    created_at: DateTime<Utc>,
) -> NewPost {
    NewPost {
        remote_id: remote_id.to_string(),
        kind,
        text: text.to_string(),
        referenced_handle: referenced.map(str::to_string),
        referenced_post_id: referenced.map(|_| "1".to_string()),
        likes,
        reposts: 0,
        created_at,
    }
}

fn source(now: DateTime<Utc>) -> CannedSource {
    let hour = Duration::hours(1);
    let accounts: HashMap<String, NewAccount> = [
        ("naval", account("10", "naval")),
        ("pmarca", account("20", "pmarca")),
        ("balajis", account("30", "balajis")),
    ]
    .into_iter()
    .map(|(h, a)| (h.to_string(), a))
    .collect();

    let mut timelines = HashMap::new();
    timelines.insert(
        "10".to_string(),
        vec![
            new_post(
                "105",
                PostKind::Original,
                "#AI is transforming everything",
                None,
                900,
                now - hour,
            ),
            new_post(
                "104",
                PostKind::Repost,
                "RT @elonmusk: rockets",
                Some("elonmusk"),
                0,
                now - hour * 2,
            ),
            new_post(
                "103",
                PostKind::Original,
                "Building with #AI agents",
                None,
                50,
                now - hour * 3,
            ),
            // Outside a one-week window
            new_post(
                "101",
                PostKind::Original,
                "ancient history",
                None,
                99999,
                now - Duration::days(30),
            ),
        ],
    );
    timelines.insert(
        "20".to_string(),
        vec![
            new_post(
                "205",
                PostKind::Quote,
                "The agents are getting smarter",
                Some("elonmusk"),
                300,
                now - hour,
            ),
            new_post(
                "204",
                PostKind::Repost,
                "RT @naval: read more",
                Some("naval"),
                0,
                now - hour * 4,
            ),
        ],
    );
    // balajis (remote id 30) has no timeline: every fetch fails

    CannedSource {
        accounts,
        timelines,
    }
}

fn memory_db() -> Arc<dyn Database> {
    let conn = Connection::open_in_memory().unwrap();
    create_tables(&conn).unwrap();
    Arc::new(SqliteDatabase::new(conn))
}

// ============================================================
// Chain: add -> fetch -> store
// ============================================================

#[tokio::test]
async fn fetch_cycle_stores_posts_and_survives_failures() {
    let now = Utc::now();
    let src = source(now);
    let db = memory_db();

    for handle in ["naval", "pmarca", "balajis"] {
        fetch::add_account(&src, &db, handle).await.unwrap();
    }
    assert!(fetch::add_account(&src, &db, "nobody").await.is_err());

    let summary = fetch::run(&src, &db).await.unwrap();
    assert_eq!(summary.accounts, 3);
    assert_eq!(summary.posts_read, 6);
    assert_eq!(summary.new_posts, 6);
    assert_eq!(summary.failed, vec!["balajis".to_string()]);
    assert_eq!(db.post_count().await.unwrap(), 6);

    let usage = db.get_month_usage(&fetch::current_month()).await.unwrap();
    assert_eq!(usage.posts_read, 6);

    // Second cycle asks only for posts newer than what's stored
    let again = fetch::run(&src, &db).await.unwrap();
    assert_eq!(again.posts_read, 0);
    assert_eq!(again.new_posts, 0);
    assert_eq!(db.post_count().await.unwrap(), 6);

    let accounts = db.list_accounts().await.unwrap();
    let naval = accounts.iter().find(|a| a.handle == "naval").unwrap();
    assert!(naval.last_fetched.is_some());
    let balajis = accounts.iter().find(|a| a.handle == "balajis").unwrap();
    assert!(balajis.last_fetched.is_none());
}

#[tokio::test]
async fn adding_a_monitored_handle_again_skips_the_api() {
    let src = CountingSource {
        inner: source(Utc::now()),
        lookups: AtomicUsize::new(0),
    };
    let db = memory_db();

    fetch::add_account(&src, &db, "naval").await.unwrap();
    let err = fetch::add_account(&src, &db, "naval").await.unwrap_err();

    assert!(err.to_string().contains("already being monitored"));
    assert_eq!(src.lookups.load(Ordering::SeqCst), 1);
    assert_eq!(db.list_accounts().await.unwrap().len(), 1);
}

#[tokio::test]
async fn fetch_with_empty_watch_list_is_a_no_op() {
    let now = Utc::now();
    let summary = fetch::run(&source(now), &memory_db()).await.unwrap();
    assert_eq!(summary, fetch::FetchSummary::default());
}

// ============================================================
// Chain: store -> digest -> prompt
// ============================================================

#[tokio::test]
async fn stored_posts_produce_expected_digest_and_prompt() {
    let now = Utc::now();
    let src = source(now);
    let db = memory_db();
    for handle in ["naval", "pmarca"] {
        fetch::add_account(&src, &db, handle).await.unwrap();
    }
    fetch::run(&src, &db).await.unwrap();

    let since = now - Duration::days(7);
    let accounts = db.list_accounts().await.unwrap();
    let posts = db.get_posts_since(since).await.unwrap();
    let until = now + Duration::seconds(1);
    let digest = build_digest(since, until, &accounts, &posts, &DigestOptions::default());

    assert_eq!(digest.account_count, 2);
    assert_eq!(digest.counts.original, 2);
    assert_eq!(digest.counts.repost, 2);
    assert_eq!(digest.counts.quote, 1);

    assert_eq!(digest.most_active[0].handle, "naval");
    assert_eq!(digest.most_active[0].count, 3);

    assert_eq!(digest.most_amplified[0].handle, "elonmusk");
    assert_eq!(digest.most_amplified[0].count, 2);

    // elonmusk is amplified by both naval and pmarca; naval only by pmarca
    assert_eq!(digest.amplified_by.len(), 1);
    assert_eq!(digest.amplified_by[0].handle, "elonmusk");
    assert_eq!(digest.amplified_by[0].count, 2);

    assert_eq!(digest.topics[0], "#ai");
    assert!(digest.topics.contains(&"agents".to_string()));

    // Quotes are not eligible for top content; the 30-day-old post is out of window
    let top: Vec<&str> = digest.top_posts.iter().map(|p| p.text.as_str()).collect();
    assert_eq!(top, vec!["#AI is transforming everything", "Building with #AI agents"]);

    let prompt = build_narrative_prompt(&digest);
    assert!(prompt.contains("- 5 total posts (2 original, 2 reposts, 1 quotes)"));
    assert!(prompt.contains("- @elonmusk amplified by: naval, pmarca"));
    assert!(prompt.contains("- @naval: 3 posts"));
    assert!(prompt.contains("\"#AI is transforming everything\" (900 likes, 0 reposts)"));

    // JSON output round-trips through serde
    let json = serde_json::to_string(&digest).unwrap();
    assert!(json.contains("\"amplified_by\""));
}

#[tokio::test]
async fn removed_account_drops_out_of_digest() {
    let now = Utc::now();
    let src = source(now);
    let db = memory_db();
    for handle in ["naval", "pmarca"] {
        fetch::add_account(&src, &db, handle).await.unwrap();
    }
    fetch::run(&src, &db).await.unwrap();

    assert!(db.remove_account("pmarca").await.unwrap());
    assert!(!db.remove_account("pmarca").await.unwrap());

    let since = now - Duration::days(7);
    let accounts = db.list_accounts().await.unwrap();
    let posts = db.get_posts_since(since).await.unwrap();
    let digest = build_digest(
        since,
        now + Duration::seconds(1),
        &accounts,
        &posts,
        &DigestOptions::default(),
    );

    assert_eq!(digest.counts.total(), 3);
    assert!(digest.amplified_by.is_empty());
    assert!(digest.most_active.iter().all(|a| a.handle == "naval"));
}

#[test]
fn digest_listing_truncation_matches_limit() {
    let long = "word ".repeat(40);
    let shown = truncate_chars(&long, DIGEST_TEXT_LIMIT);
    assert_eq!(shown.chars().count(), DIGEST_TEXT_LIMIT);
    assert!(shown.ends_with("..."));
}
