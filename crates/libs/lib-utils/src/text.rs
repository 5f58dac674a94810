//! # Text Utilities
//!
//! Character-safe truncation used for chat titles and log excerpts.

/// Keep the first `max_chars` characters of `text`, appending `...` when
/// anything was cut.
///
/// Counts `char`s, so multi-byte input is never split mid code point.
pub fn truncate_with_ellipsis(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => format!("{}...", &text[..byte_idx]),
        None => text.to_string(),
    }
}

/// Short single-line excerpt for logs and error details.
pub fn excerpt(text: &str, max_chars: usize) -> String {
    let flat: String = text
        .chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect();
    truncate_with_ellipsis(flat.trim(), max_chars)
}
