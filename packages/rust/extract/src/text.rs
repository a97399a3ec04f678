//! Text cleanup passes applied to raw marker captures.
//!
//! Each pass is a small `&str -> String` function; field extractors compose
//! the passes they need.

use std::sync::LazyLock;

use regex::Regex;
use scraper::Html;

/// Ellipsis appended to hard-truncated descriptions.
pub const ELLIPSIS: char = '…';

static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace regex"));

/// Collapse every whitespace run to a single space and trim the ends.
pub fn collapse_whitespace(s: &str) -> String {
    WHITESPACE_RE.replace_all(s.trim(), " ").into_owned()
}

/// Text content of an HTML fragment: tags dropped, character references decoded.
pub fn fragment_text(s: &str) -> String {
    if !s.contains(['<', '&']) {
        return s.to_string();
    }
    Html::parse_fragment(s).root_element().text().collect()
}

/// Drop everything from the first `separator` onward (the appended site name).
///
/// An empty separator disables stripping.
pub fn strip_site_suffix<'a>(title: &'a str, separator: &str) -> &'a str {
    if separator.is_empty() {
        return title;
    }
    title.split(separator).next().unwrap_or(title)
}

/// Shorten `text` to at most `max_chars` characters.
///
/// Prefers cutting right after the last sentence terminator (`.`, `!`, `?`)
/// that fits; otherwise hard-cuts and appends [`ELLIPSIS`], still within the
/// limit.
pub fn truncate_description(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    if max_chars == 0 {
        return String::new();
    }

    let window_end = text
        .char_indices()
        .nth(max_chars)
        .map_or(text.len(), |(idx, _)| idx);
    let window = &text[..window_end];

    let sentence_end = window
        .char_indices()
        .filter(|&(idx, c)| {
            matches!(c, '.' | '!' | '?')
                && text[idx + c.len_utf8()..]
                    .chars()
                    .next()
                    .is_none_or(char::is_whitespace)
        })
        .map(|(idx, c)| idx + c.len_utf8())
        .last();

    if let Some(end) = sentence_end {
        return text[..end].to_string();
    }

    let hard_end = text
        .char_indices()
        .nth(max_chars - 1)
        .map_or(text.len(), |(idx, _)| idx);
    let mut cut = text[..hard_end].trim_end().to_string();
    cut.push(ELLIPSIS);
    cut
}
