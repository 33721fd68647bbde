// Amplification graph — who reposts and quotes whom.
//
// Every repost or quote is an edge from the amplifying monitored account to
// the author it references. The referenced author is identified only by its
// handle string, so handles outside the watch-list are counted too.
//
// Two views are built from the same posts:
// - `rank_amplified`: fan-in by *distinct* amplifiers (a set per handle),
//   filtered by a minimum so one enthusiastic account can't fake consensus.
// - `tally_amplified`: the raw "amplified N times" post count.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use super::{sort_by_count_then_label, HandleLookup};
use crate::db::models::Post;

/// Upper bound on `rank_amplified` output regardless of input size.
pub const MAX_AMPLIFIED_USERS: usize = 10;

/// One amplification: `amplifier` reposted or quoted `amplified`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AmplificationEdge {
    pub amplified: String,
    pub amplifier: String,
}

impl AmplificationEdge {
    pub fn new(amplified: impl Into<String>, amplifier: impl Into<String>) -> Self {
        Self {
            amplified: amplified.into(),
            amplifier: amplifier.into(),
        }
    }
}

/// An amplified handle with everyone who amplified it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmplifiedUser {
    pub handle: String,
    pub amplifiers: BTreeSet<String>,
    /// Number of distinct amplifiers (`amplifiers.len()`).
    pub count: usize,
    /// Number of amplifying posts, repeats by the same amplifier included.
    pub mentions: usize,
}

/// Raw post-level amplification count for one handle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmplificationCount {
    pub handle: String,
    pub count: usize,
}

fn referenced_handle(post: &Post) -> Option<&str> {
    if !post.kind.is_amplification() {
        return None;
    }
    post.referenced_handle
        .as_deref()
        .filter(|handle| !handle.is_empty())
}

/// Extract amplification edges from posts.
///
/// Only reposts and quotes with a non-empty referenced handle qualify, and
/// the amplifying account must be known to `handles`.
pub fn amplification_edges(posts: &[Post], handles: &HandleLookup) -> Vec<AmplificationEdge> {
    posts
        .iter()
        .filter_map(|post| {
            let amplified = referenced_handle(post)?;
            let amplifier = handles.get(&post.account_id)?;
            Some(AmplificationEdge::new(amplified, amplifier.as_str()))
        })
        .collect()
}

/// Handles amplified by at least `min_amplifiers` distinct accounts.
///
/// Ordered by distinct-amplifier count descending, then handle. At most
/// [`MAX_AMPLIFIED_USERS`] entries.
pub fn rank_amplified(edges: &[AmplificationEdge], min_amplifiers: usize) -> Vec<AmplifiedUser> {
    let mut graph: BTreeMap<&str, (BTreeSet<String>, usize)> = BTreeMap::new();
    for edge in edges {
        let (amplifiers, mentions) = graph.entry(edge.amplified.as_str()).or_default();
        amplifiers.insert(edge.amplifier.clone());
        *mentions += 1;
    }

    let mut users: Vec<AmplifiedUser> = graph
        .into_iter()
        .filter(|(_, (amplifiers, _))| amplifiers.len() >= min_amplifiers)
        .map(|(handle, (amplifiers, mentions))| AmplifiedUser {
            handle: handle.to_string(),
            count: amplifiers.len(),
            amplifiers,
            mentions,
        })
        .collect();

    users.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.handle.cmp(&b.handle)));
    users.truncate(MAX_AMPLIFIED_USERS);
    users
}

/// Count amplifying posts per referenced handle, most amplified first.
pub fn tally_amplified(posts: &[Post], limit: usize) -> Vec<AmplificationCount> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for handle in posts.iter().filter_map(referenced_handle) {
        *counts.entry(handle.to_string()).or_insert(0) += 1;
    }

    let mut entries: Vec<(String, usize)> = counts.into_iter().collect();
    sort_by_count_then_label(&mut entries);
    entries.truncate(limit);

    entries
        .into_iter()
        .map(|(handle, count)| AmplificationCount { handle, count })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::PostKind;
    use chrono::Utc;

    fn amp_post(account_id: i64, kind: PostKind, referenced: Option<&str>) -> Post {
        Post {
            id: 0,
            account_id,
            remote_id: String::new(),
            kind,
            text: String::new(),
            referenced_handle: referenced.map(str::to_string),
            referenced_post_id: None,
            likes: 0,
            reposts: 0,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_edges_skip_originals_and_empty_references() {
        let handles: HandleLookup = [(1, "pmarca".to_string())].into_iter().collect();
        let posts = vec![
            amp_post(1, PostKind::Repost, Some("elonmusk")),
            amp_post(1, PostKind::Quote, Some("naval")),
            amp_post(1, PostKind::Original, Some("ignored")),
            amp_post(1, PostKind::Repost, Some("")),
            amp_post(1, PostKind::Repost, None),
            amp_post(7, PostKind::Repost, Some("orphan")),
        ];
        let edges = amplification_edges(&posts, &handles);
        assert_eq!(
            edges,
            vec![
                AmplificationEdge::new("elonmusk", "pmarca"),
                AmplificationEdge::new("naval", "pmarca"),
            ]
        );
    }

    #[test]
    fn test_repeat_amplifier_counts_once() {
        let edges = vec![
            AmplificationEdge::new("sama", "naval"),
            AmplificationEdge::new("sama", "naval"),
            AmplificationEdge::new("sama", "naval"),
        ];
        let ranked = rank_amplified(&edges, 1);
        assert_eq!(ranked[0].count, 1);
        assert_eq!(ranked[0].mentions, 3);
        assert!(rank_amplified(&edges, 2).is_empty());
    }

    #[test]
    fn test_threshold_boundary() {
        let edges = vec![
            AmplificationEdge::new("a", "x"),
            AmplificationEdge::new("a", "y"),
            AmplificationEdge::new("a", "z"),
            AmplificationEdge::new("b", "x"),
            AmplificationEdge::new("b", "y"),
        ];
        let handles: Vec<String> = rank_amplified(&edges, 3)
            .into_iter()
            .map(|u| u.handle)
            .collect();
        assert_eq!(handles, vec!["a"]);
        assert_eq!(rank_amplified(&edges, 2).len(), 2);
    }

    #[test]
    fn test_output_capped() {
        let edges: Vec<AmplificationEdge> = (0..15)
            .flat_map(|i| {
                let target = format!("user{:02}", i);
                [
                    AmplificationEdge::new(target.clone(), "x"),
                    AmplificationEdge::new(target, "y"),
                ]
            })
            .collect();
        let ranked = rank_amplified(&edges, 2);
        assert_eq!(ranked.len(), MAX_AMPLIFIED_USERS);
        assert_eq!(ranked[0].handle, "user00");
    }

    #[test]
    fn test_tally_counts_every_post() {
        let posts = vec![
            amp_post(1, PostKind::Repost, Some("elonmusk")),
            amp_post(1, PostKind::Repost, Some("elonmusk")),
            amp_post(2, PostKind::Quote, Some("naval")),
            amp_post(2, PostKind::Original, None),
        ];
        let tally = tally_amplified(&posts, 5);
        assert_eq!(
            tally,
            vec![
                AmplificationCount {
                    handle: "elonmusk".to_string(),
                    count: 2
                },
                AmplificationCount {
                    handle: "naval".to_string(),
                    count: 1
                },
            ]
        );
        assert_eq!(tally_amplified(&posts, 1).len(), 1);
    }
}
