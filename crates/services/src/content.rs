//! Preview text derived from post bodies.

use once_cell::sync::Lazy;
use regex::Regex;

static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("valid tag regex"));
static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

/// Strips markup from `content` and keeps at most `max_chars` characters.
///
/// Blank results collapse to an empty string.
pub fn short_content(content: &str, max_chars: usize) -> String {
    let stripped = TAG_RE.replace_all(content, " ");
    let stripped = stripped
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&");
    let collapsed = WHITESPACE_RE.replace_all(stripped.trim(), " ");

    collapsed.chars().take(max_chars).collect()
}
