//! Utility functions and helpers.

pub mod http;
pub mod json;
pub mod url;

/// Shorten text for log lines without splitting a character.
pub fn truncate_for_log(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}…", &text[..idx]),
        None => text.to_string(),
    }
}
