// Post normalization — X API tweets into storable posts.
//
// The timeline endpoint returns a user's own tweets; reposts and quotes only
// point at the referenced tweet by id. Its author comes from the expansions:
// `includes.tweets[].author_id` gives the user id, `includes.users[]` maps
// that id to a handle.

use chrono::Utc;

use super::client::{Includes, Tweet, TweetsResponse};
use crate::db::models::{NewPost, PostKind};

/// Classify a tweet by its first amplifying reference.
///
/// Replies (`replied_to`) are treated as originals.
pub fn classify(tweet: &Tweet) -> PostKind {
    for reference in &tweet.referenced_tweets {
        match reference.kind.as_str() {
            "retweeted" => return PostKind::Repost,
            "quoted" => return PostKind::Quote,
            _ => {}
        }
    }
    PostKind::Original
}

/// The (handle, post id) a repost or quote points at.
///
/// The handle is None when the referenced tweet or its author wasn't
/// included in the response (deleted or protected tweets).
fn resolve_reference(
    tweet: &Tweet,
    kind: PostKind,
    includes: &Includes,
) -> (Option<String>, Option<String>) {
    let wanted = match kind {
        PostKind::Repost => "retweeted",
        PostKind::Quote => "quoted",
        PostKind::Original => return (None, None),
    };

    let Some(reference) = tweet.referenced_tweets.iter().find(|r| r.kind == wanted) else {
        return (None, None);
    };

    let handle = includes
        .tweets
        .iter()
        .find(|t| t.id == reference.id)
        .and_then(|t| t.author_id.as_deref())
        .and_then(|author_id| includes.users.iter().find(|u| u.id == author_id))
        .map(|u| u.username.clone());

    (handle, Some(reference.id.clone()))
}

/// Convert a timeline response into posts ready for insertion.
pub fn normalize(response: &TweetsResponse) -> Vec<NewPost> {
    response
        .data
        .iter()
        .map(|tweet| {
            let kind = classify(tweet);
            let (referenced_handle, referenced_post_id) =
                resolve_reference(tweet, kind, &response.includes);
            let metrics = tweet.public_metrics.clone().unwrap_or_default();

            NewPost {
                remote_id: tweet.id.clone(),
                kind,
                text: tweet.text.clone(),
                referenced_handle,
                referenced_post_id,
                likes: metrics.like_count,
                reposts: metrics.retweet_count,
                created_at: tweet.created_at.unwrap_or_else(Utc::now),
            }
        })
        .collect()
}
