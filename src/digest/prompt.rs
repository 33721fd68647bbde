// Narrative prompt — the text handed to the language model for `digest --smart`.
//
// Sections appear in a fixed order and empty sections are left out. The
// model's reply is printed as-is; nothing here parses it.

use std::fmt;

use super::{Digest, PROMPT_TEXT_LIMIT};
use crate::output::truncate_chars;

const PREAMBLE: &str = "Analyze this X activity digest and provide 2-3 brief insights about \
emerging themes and what these influential people are focusing on.";

const CLOSING: &str = "Provide 2-3 concise bullet points about emerging themes, sentiment shifts, \
or notable patterns. Focus on what these influential people are signaling. Keep each bullet \
under 120 characters.";

/// Render a digest as a narrative-generation prompt.
pub fn build_narrative_prompt(digest: &Digest) -> String {
    NarrativePrompt(digest).to_string()
}

struct NarrativePrompt<'a>(&'a Digest);

impl fmt::Display for NarrativePrompt<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digest = self.0;
        let counts = &digest.counts;

        writeln!(f, "{}\n", PREAMBLE)?;
        writeln!(f, "Activity Summary:")?;
        writeln!(
            f,
            "- {} total posts ({} original, {} reposts, {} quotes)",
            counts.total(),
            counts.original,
            counts.repost,
            counts.quote
        )?;

        if !digest.topics.is_empty() {
            writeln!(f, "- Trending topics: {}", digest.topics.join(", "))?;
        }

        if !digest.amplified_by.is_empty() {
            writeln!(
                f,
                "\nMost amplified accounts (who multiple people are reposting):"
            )?;
            for user in &digest.amplified_by {
                let amplifiers: Vec<&str> = user.amplifiers.iter().map(String::as_str).collect();
                writeln!(
                    f,
                    "- @{} amplified by: {}",
                    user.handle,
                    amplifiers.join(", ")
                )?;
            }
        }

        if !digest.most_active.is_empty() {
            writeln!(f, "\nMost active accounts:")?;
            for activity in &digest.most_active {
                writeln!(f, "- @{}: {} posts", activity.handle, activity.count)?;
            }
        }

        if !digest.top_posts.is_empty() {
            writeln!(f, "\nNotable posts (highest engagement):")?;
            for post in &digest.top_posts {
                writeln!(
                    f,
                    "- @{}: \"{}\" ({} likes, {} reposts)",
                    post.handle,
                    truncate_chars(&post.text, PROMPT_TEXT_LIMIT),
                    post.likes,
                    post.reposts
                )?;
            }
        }

        write!(f, "\n{}", CLOSING)
    }
}
