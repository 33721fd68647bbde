// Activity ranking — which monitored accounts posted the most.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::{sort_by_count_then_label, HandleLookup};
use crate::db::models::Post;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountActivity {
    pub handle: String,
    pub count: usize,
}

/// Rank accounts by how many posts (of any kind) they have in `posts`.
///
/// Posts whose owning account isn't in `handles` are ignored; that happens
/// when an account was removed from the watch-list after its posts were
/// stored. Ties are ordered by handle.
pub fn rank_active_accounts(
    posts: &[Post],
    handles: &HandleLookup,
    limit: usize,
) -> Vec<AccountActivity> {
    let mut per_account: HashMap<i64, usize> = HashMap::new();
    for post in posts {
        *per_account.entry(post.account_id).or_insert(0) += 1;
    }

    let mut entries: Vec<(String, usize)> = per_account
        .into_iter()
        .filter_map(|(id, count)| handles.get(&id).map(|h| (h.clone(), count)))
        .collect();

    sort_by_count_then_label(&mut entries);
    entries.truncate(limit);

    entries
        .into_iter()
        .map(|(handle, count)| AccountActivity { handle, count })
        .collect()
}
