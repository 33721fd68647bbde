// Digest analytics — pure ranking functions over stored posts.
//
// Each submodule is a stateless transformation over in-memory snapshots
// handed over by the store. None of them do I/O, and all of them return
// empty results (never errors) for empty input.

pub mod activity;
pub mod amplification;
pub mod top_content;
pub mod topics;

use std::collections::HashMap;

use crate::db::models::Account;

/// Local account id -> handle. Posts only carry the owning account's id.
pub type HandleLookup = HashMap<i64, String>;

/// Build the id -> handle lookup from the monitored account list.
pub fn handle_lookup(accounts: &[Account]) -> HandleLookup {
    accounts
        .iter()
        .map(|a| (a.id, a.handle.clone()))
        .collect()
}

/// Sort (label, count) pairs by count descending, then label ascending.
///
/// Frequency maps have no intrinsic order, so the label tie-break is what
/// makes every ranking reproducible across runs.
pub(crate) fn sort_by_count_then_label(entries: &mut [(String, usize)]) {
    entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
}
