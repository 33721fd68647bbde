// Top content — the highest-engagement original posts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::HandleLookup;
use crate::db::models::{Post, PostKind};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopPost {
    pub handle: String,
    /// Full post text; listings truncate at render time.
    pub text: String,
    pub likes: i64,
    pub reposts: i64,
    pub created_at: DateTime<Utc>,
}

impl TopPost {
    pub fn engagement(&self) -> i64 {
        self.likes + self.reposts
    }
}

/// Rank original posts by likes + reposts.
///
/// Ties go to the newer post, then to the lower remote id. Reposts and
/// quotes are not eligible, nor are posts from accounts missing in `handles`.
pub fn rank_top_posts(posts: &[Post], handles: &HandleLookup, limit: usize) -> Vec<TopPost> {
    let mut originals: Vec<(&Post, &String)> = posts
        .iter()
        .filter(|p| p.kind == PostKind::Original)
        .filter_map(|p| handles.get(&p.account_id).map(|h| (p, h)))
        .collect();

    originals.sort_by(|(a, _), (b, _)| {
        b.engagement()
            .cmp(&a.engagement())
            .then_with(|| b.created_at.cmp(&a.created_at))
            .then_with(|| a.remote_id.cmp(&b.remote_id))
    });

    originals
        .into_iter()
        .take(limit)
        .map(|(post, handle)| TopPost {
            handle: handle.clone(),
            text: post.text.clone(),
            likes: post.likes,
            reposts: post.reposts,
            created_at: post.created_at,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn post(remote_id: &str, kind: PostKind, likes: i64, reposts: i64, age_hours: i64) -> Post {
        Post {
            id: 0,
            account_id: 1,
            remote_id: remote_id.to_string(),
            kind,
            text: format!("post {}", remote_id),
            referenced_handle: None,
            referenced_post_id: None,
            likes,
            reposts,
            created_at: Utc::now() - Duration::hours(age_hours),
        }
    }

    fn handles() -> HandleLookup {
        [(1, "naval".to_string())].into_iter().collect()
    }

    #[test]
    fn test_ranks_by_engagement_originals_only() {
        let posts = vec![
            post("1", PostKind::Original, 10, 5, 1),
            post("2", PostKind::Repost, 1000, 1000, 1),
            post("3", PostKind::Original, 50, 0, 1),
            post("4", PostKind::Quote, 500, 0, 1),
        ];
        let top = rank_top_posts(&posts, &handles(), 3);
        let texts: Vec<&str> = top.iter().map(|p| p.text.as_str()).collect();
        assert_eq!(texts, vec!["post 3", "post 1"]);
        assert_eq!(top[0].engagement(), 50);
    }

    #[test]
    fn test_ties_prefer_newer() {
        let posts = vec![
            post("old", PostKind::Original, 5, 5, 10),
            post("new", PostKind::Original, 8, 2, 1),
        ];
        let top = rank_top_posts(&posts, &handles(), 1);
        assert_eq!(top[0].text, "post new");
    }

    #[test]
    fn test_unknown_account_skipped() {
        let mut orphan = post("x", PostKind::Original, 99, 99, 1);
        orphan.account_id = 42;
        assert!(rank_top_posts(&[orphan], &handles(), 3).is_empty());
    }
}
