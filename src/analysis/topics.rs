// Topic extraction — hashtag and keyword mining from post text.
//
// Two frequency passes feed one merged list:
// - Hashtags: every `#tag` occurrence counts, case-folded.
// - Keywords: alphabetic tokens with URLs and @mentions stripped, stop words
//   removed, and each distinct word counted at most once per post so one
//   repetitive post can't dominate the ranking.
//
// Hashtags always come first in the merged list; keywords fill what's left.

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use regex_lite::Regex;
use serde::{Deserialize, Serialize};

use super::sort_by_count_then_label;

/// Keywords shorter than this never appear in the output.
pub const DEFAULT_MIN_KEYWORD_LENGTH: usize = 4;

/// A keyword must appear in at least this many posts to count as a topic.
pub const DEFAULT_MIN_KEYWORD_COUNT: usize = 2;

/// Each source (hashtags, keywords) is cut to this many entries before merging.
const MAX_PER_SOURCE: usize = 10;

static HASHTAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#(\w+)").expect("invalid regex"));
static URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"https?://\S+").expect("invalid regex"));
static MENTION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@\w+").expect("invalid regex"));
static WORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[a-zA-Z]{3,}\b").expect("invalid regex"));

/// Articles, pronouns, auxiliaries, filler, and platform noise.
const STOP_WORDS: &[&str] = &[
    "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by",
    "from", "is", "are", "was", "were", "be", "been", "being", "have", "has", "had", "do",
    "does", "did", "will", "would", "could", "should", "may", "might", "must", "this", "that",
    "these", "those", "it", "its", "i", "you", "he", "she", "we", "they", "me", "him", "her",
    "us", "them", "my", "your", "his", "our", "their", "what", "which", "who", "whom", "when",
    "where", "why", "how", "all", "each", "every", "both", "few", "more", "most", "other",
    "some", "such", "no", "not", "only", "own", "same", "so", "than", "too", "very", "just",
    "can", "now", "new", "like", "get", "got", "going", "about", "into", "over", "after",
    "before", "between", "under", "again", "then", "here", "there", "also", "even", "still",
    "through", "rt", "via", "amp", "https", "http",
];

/// Whether a lower-cased word is filtered out of the keyword pass.
pub fn is_stop_word(word: &str) -> bool {
    STOP_WORDS.contains(&word)
}

/// A ranked (topic, occurrence count) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicCount {
    pub topic: String,
    pub count: usize,
}

/// Count hashtags across all texts, case-insensitively.
///
/// Returns at most 10 tags (without the `#`), most frequent first.
pub fn extract_hashtags<S: AsRef<str>>(texts: &[S]) -> Vec<TopicCount> {
    let mut counts: HashMap<String, usize> = HashMap::new();

    for text in texts {
        for caps in HASHTAG_RE.captures_iter(text.as_ref()) {
            if let Some(tag) = caps.get(1) {
                *counts.entry(tag.as_str().to_lowercase()).or_insert(0) += 1;
            }
        }
    }

    rank(counts)
}

/// Count significant keywords across all texts.
///
/// Each distinct word is counted once per text. Words shorter than
/// `min_length`, stop words, and words seen in fewer than `min_count`
/// texts are dropped. Returns at most 10 keywords, most frequent first.
pub fn extract_keywords<S: AsRef<str>>(
    texts: &[S],
    min_length: usize,
    min_count: usize,
) -> Vec<TopicCount> {
    let mut counts: HashMap<String, usize> = HashMap::new();

    for text in texts {
        let stripped = URL_RE.replace_all(text.as_ref(), "");
        let stripped = MENTION_RE.replace_all(&stripped, "");
        let lower = stripped.to_lowercase();

        let mut seen: HashSet<&str> = HashSet::new();
        for word in WORD_RE.find_iter(&lower).map(|m| m.as_str()) {
            if word.len() >= min_length && !is_stop_word(word) && seen.insert(word) {
                *counts.entry(word.to_string()).or_insert(0) += 1;
            }
        }
    }

    counts.retain(|_, count| *count >= min_count);
    rank(counts)
}

/// Merge hashtags and keywords into at most `limit` topic labels.
///
/// Hashtags come first (prefixed with `#`), then keywords. A keyword that
/// matches a hashtag already in the list is skipped.
pub fn extract_topics<S: AsRef<str>>(texts: &[S], limit: usize) -> Vec<String> {
    let hashtags = extract_hashtags(texts);
    let keywords = extract_keywords(
        texts,
        DEFAULT_MIN_KEYWORD_LENGTH,
        DEFAULT_MIN_KEYWORD_COUNT,
    );

    let mut seen: HashSet<String> = HashSet::new();
    let mut result = Vec::new();

    for h in hashtags {
        if result.len() >= limit {
            break;
        }
        if seen.insert(h.topic.clone()) {
            result.push(format!("#{}", h.topic));
        }
    }

    for k in keywords {
        if result.len() >= limit {
            break;
        }
        if seen.insert(k.topic.clone()) {
            result.push(k.topic);
        }
    }

    result
}

fn rank(counts: HashMap<String, usize>) -> Vec<TopicCount> {
    let mut entries: Vec<(String, usize)> = counts.into_iter().collect();
    sort_by_count_then_label(&mut entries);
    entries.truncate(MAX_PER_SOURCE);
    entries
        .into_iter()
        .map(|(topic, count)| TopicCount { topic, count })
        .collect()
}
