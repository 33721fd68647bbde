// Data models — Rust structs that map to database rows.
//
// These are the types that flow through the application. They're separate
// from the database queries so the analysis modules can use them without
// depending on rusqlite directly.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A monitored account on the watch-list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: i64,
    /// The platform's own user id (stable across handle changes)
    pub remote_id: String,
    pub handle: String,
    pub display_name: String,
    pub bio: String,
    pub followers: i64,
    pub added_at: DateTime<Utc>,
    pub last_fetched: Option<DateTime<Utc>>,
}

/// Account metadata as returned by the fetch step, before it has a local id.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub remote_id: String,
    pub handle: String,
    pub display_name: String,
    pub bio: String,
    pub followers: i64,
}

/// Original post, plain repost, or quote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostKind {
    Original,
    /// Amplification without commentary
    Repost,
    /// Amplification with added commentary
    Quote,
}

impl PostKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostKind::Original => "original",
            PostKind::Repost => "repost",
            PostKind::Quote => "quote",
        }
    }

    /// Parse the stored string form. Anything unrecognized is an original.
    pub fn parse(s: &str) -> Self {
        match s {
            "repost" => PostKind::Repost,
            "quote" => PostKind::Quote,
            _ => PostKind::Original,
        }
    }

    /// Reposts and quotes both amplify another author's content.
    pub fn is_amplification(&self) -> bool {
        matches!(self, PostKind::Repost | PostKind::Quote)
    }
}

impl std::fmt::Display for PostKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A stored post. `remote_id` is the dedup key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    pub account_id: i64,
    pub remote_id: String,
    pub kind: PostKind,
    pub text: String,
    /// Handle of the amplified author (reposts and quotes only).
    /// This is a plain string, not a reference to a monitored account.
    pub referenced_handle: Option<String>,
    pub referenced_post_id: Option<String>,
    pub likes: i64,
    pub reposts: i64,
    pub created_at: DateTime<Utc>,
}

impl Post {
    /// Likes plus reposts, the ranking key for notable content.
    pub fn engagement(&self) -> i64 {
        self.likes + self.reposts
    }
}

/// A normalized post from the fetch step, ready to insert.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub remote_id: String,
    pub kind: PostKind,
    pub text: String,
    pub referenced_handle: Option<String>,
    pub referenced_post_id: Option<String>,
    pub likes: i64,
    pub reposts: i64,
    pub created_at: DateTime<Utc>,
}

/// Post counts by kind for a window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostCounts {
    pub original: usize,
    pub repost: usize,
    pub quote: usize,
}

impl PostCounts {
    pub fn from_posts(posts: &[Post]) -> Self {
        let mut counts = Self::default();
        for post in posts {
            match post.kind {
                PostKind::Original => counts.original += 1,
                PostKind::Repost => counts.repost += 1,
                PostKind::Quote => counts.quote += 1,
            }
        }
        counts
    }

    pub fn total(&self) -> usize {
        self.original + self.repost + self.quote
    }
}

/// API usage for one calendar month (YYYY-MM).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthlyUsage {
    pub month: String,
    pub posts_read: i64,
}

/// Free-tier monthly read allowance for the X API.
pub const MONTHLY_POST_LIMIT: i64 = 1500;

impl MonthlyUsage {
    pub fn remaining(&self) -> i64 {
        (MONTHLY_POST_LIMIT - self.posts_read).max(0)
    }

    pub fn percent_used(&self) -> f64 {
        self.posts_read as f64 / MONTHLY_POST_LIMIT as f64 * 100.0
    }

    /// A warning line when the month's quota is running low, None otherwise.
    pub fn quota_warning(&self) -> Option<String> {
        let pct = self.percent_used();
        if self.remaining() == 0 {
            Some(format!(
                "Monthly API limit reached! {}/{} posts read ({:.0}%)",
                self.posts_read, MONTHLY_POST_LIMIT, pct
            ))
        } else if pct >= 90.0 {
            Some(format!(
                "API quota critical: {}/{} posts read ({:.0}%), {} remaining",
                self.posts_read,
                MONTHLY_POST_LIMIT,
                pct,
                self.remaining()
            ))
        } else if pct >= 75.0 {
            Some(format!(
                "API quota warning: {}/{} posts read ({:.0}%), {} remaining",
                self.posts_read,
                MONTHLY_POST_LIMIT,
                pct,
                self.remaining()
            ))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_kind_roundtrip() {
        for kind in [PostKind::Original, PostKind::Repost, PostKind::Quote] {
            assert_eq!(PostKind::parse(kind.as_str()), kind);
        }
        assert_eq!(PostKind::parse("something-else"), PostKind::Original);
    }

    #[test]
    fn test_quota_warning_thresholds() {
        let usage = |n| MonthlyUsage {
            month: "2026-10".to_string(),
            posts_read: n,
        };
        assert!(usage(0).quota_warning().is_none());
        assert!(usage(1124).quota_warning().is_none());
        assert!(usage(1125).quota_warning().unwrap().contains("warning"));
        assert!(usage(1350).quota_warning().unwrap().contains("critical"));
        assert!(usage(1500).quota_warning().unwrap().contains("limit reached"));
        assert_eq!(usage(2000).remaining(), 0);
    }
}
