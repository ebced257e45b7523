//! Line Sanitizer — cleans a single caption before it lands on a panel.

use std::sync::LazyLock;

use regex::Regex;

/// Stand-in for a caption with nothing left to say. Never an empty string.
pub const PLACEHOLDER: &str = "…";

/// Hard cap on words per caption. The prompt asks for ~9; this is the local limit.
pub const MAX_WORDS: usize = 12;

/// Panel labels models like to prepend ("Plan:", "Option A:", "Line 3:").
static LABEL_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^\s*(plan|detail|realization|reaction|option\s*[ab]|button\s*[ab]|top|bottom|line\s*\d+)\s*:\s*",
    )
    .expect("label prefix pattern is valid")
});

/// Trims, strips one leading panel label, caps the word count and falls back to
/// [`PLACEHOLDER`] when nothing is left.
pub fn sanitize_line(line: &str) -> String {
    let trimmed = line.trim();
    let unlabeled = LABEL_PREFIX.replace(trimmed, "");

    let words: Vec<&str> = unlabeled.split_whitespace().collect();
    let capped = if words.len() > MAX_WORDS {
        words[..MAX_WORDS].join(" ")
    } else {
        unlabeled.to_string()
    };

    if capped.is_empty() {
        PLACEHOLDER.to_string()
    } else {
        capped
    }
}
