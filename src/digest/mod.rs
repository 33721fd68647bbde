// Digest assembly — one immutable summary of watch-list activity for a
// time window.
//
// `build_digest` is a pure function: the caller loads accounts and posts
// from the store, and every ranking below is computed from that snapshot.
// The same `Digest` feeds terminal rendering, `--json` output, and the
// narrative prompt (see `prompt`).

pub mod prompt;

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::analysis::activity::{rank_active_accounts, AccountActivity};
use crate::analysis::amplification::{
    amplification_edges, rank_amplified, tally_amplified, AmplificationCount, AmplifiedUser,
};
use crate::analysis::handle_lookup;
use crate::analysis::top_content::{rank_top_posts, TopPost};
use crate::analysis::topics::extract_topics;
use crate::db::models::{Account, Post, PostCounts};

/// Post text is cut to this many characters in digest listings.
pub const DIGEST_TEXT_LIMIT: usize = 80;

/// Post text is cut to this many characters in the narrative prompt.
pub const PROMPT_TEXT_LIMIT: usize = 100;

/// Start of a window covering the `days` days before `until`.
pub fn window_start(until: DateTime<Utc>, days: u32) -> Result<DateTime<Utc>> {
    Duration::try_days(i64::from(days))
        .and_then(|span| until.checked_sub_signed(span))
        .ok_or_else(|| anyhow::anyhow!("--days {} reaches past the earliest supported date", days))
}

/// Per-section size limits for a digest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DigestOptions {
    pub active_limit: usize,
    pub amplified_limit: usize,
    pub topic_limit: usize,
    pub top_posts_limit: usize,
    /// Distinct amplifiers a handle needs to appear in `amplified_by`.
    pub min_amplifiers: usize,
}

impl Default for DigestOptions {
    fn default() -> Self {
        Self {
            active_limit: 5,
            amplified_limit: 5,
            topic_limit: 8,
            top_posts_limit: 3,
            min_amplifiers: 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Digest {
    pub since: DateTime<Utc>,
    pub until: DateTime<Utc>,
    /// Monitored accounts at build time.
    pub account_count: usize,
    pub counts: PostCounts,
    pub most_active: Vec<AccountActivity>,
    /// Raw amplification tally ("amplified N times").
    pub most_amplified: Vec<AmplificationCount>,
    /// Handles amplified by several distinct monitored accounts.
    pub amplified_by: Vec<AmplifiedUser>,
    pub topics: Vec<String>,
    pub top_posts: Vec<TopPost>,
}

impl Digest {
    pub fn is_empty(&self) -> bool {
        self.counts.total() == 0
    }
}

/// Assemble a digest over posts created in `[since, until)`.
pub fn build_digest(
    since: DateTime<Utc>,
    until: DateTime<Utc>,
    accounts: &[Account],
    posts: &[Post],
    options: &DigestOptions,
) -> Digest {
    let window: Vec<Post> = posts
        .iter()
        .filter(|p| p.created_at >= since && p.created_at < until)
        .cloned()
        .collect();

    let handles = handle_lookup(accounts);

    let texts: Vec<&str> = window
        .iter()
        .map(|p| p.text.as_str())
        .filter(|t| !t.is_empty())
        .collect();

    let edges = amplification_edges(&window, &handles);

    Digest {
        since,
        until,
        account_count: accounts.len(),
        counts: PostCounts::from_posts(&window),
        most_active: rank_active_accounts(&window, &handles, options.active_limit),
        most_amplified: tally_amplified(&window, options.amplified_limit),
        amplified_by: rank_amplified(&edges, options.min_amplifiers),
        topics: extract_topics(&texts, options.topic_limit),
        top_posts: rank_top_posts(&window, &handles, options.top_posts_limit),
    }
}
