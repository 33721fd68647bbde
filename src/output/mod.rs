// Output formatting — terminal display of digests and the watch-list.

pub mod terminal;

/// Truncate a string to at most `max_chars` characters.
///
/// Longer text keeps its first `max_chars - 3` characters followed by
/// "...", so the result is exactly `max_chars` long. Counts chars, not
/// bytes, so multi-byte text (emoji, accents) never splits mid-character.
/// Below 3 there's no room for the ellipsis and the text is cut bare.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    let char_count = text.chars().count();
    if char_count <= max_chars {
        text.to_string()
    } else if max_chars < 3 {
        text.chars().take(max_chars).collect()
    } else {
        let truncated: String = text.chars().take(max_chars - 3).collect();
        format!("{truncated}...")
    }
}
