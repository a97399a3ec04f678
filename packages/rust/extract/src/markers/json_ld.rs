//! Markers that read scalar fields from embedded JSON (typically JSON-LD).
//!
//! Embedded JSON is often not valid JSON by the time it reaches us (templated,
//! truncated, or mixed with other script), so fields are located by scanning
//! for `"key": scalar` pairs in the raw text instead of parsing whole documents.
//! Each scalar is decoded with `serde_json` so escapes are handled correctly;
//! script bodies are raw text to the HTML parser, so character references
//! left in them are decoded afterwards.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use super::{EpisodeDocument, Marker};
use crate::text::fragment_text;

/// Matches `"key": "string"` or `"key": number`.
///
/// Scanning left to right consumes whole string values, so a key-looking
/// sequence inside a string is never treated as a key.
static JSON_PAIR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""([A-Za-z@_][A-Za-z0-9@_]*)"\s*:\s*("(?:[^"\\]|\\.)*"|-?\d+(?:\.\d+)?)"#)
        .expect("json pair regex")
});

/// The first scalar value stored under `key` anywhere in the document.
///
/// Strings are returned unescaped; numbers are returned as their literal text.
pub struct JsonFieldMarker {
    key: String,
    label: String,
}

impl JsonFieldMarker {
    pub fn new(key: &str) -> Self {
        Self {
            key: key.to_string(),
            label: format!("json:{key}"),
        }
    }
}

impl Marker for JsonFieldMarker {
    fn find(&self, doc: &EpisodeDocument<'_>) -> Option<String> {
        JSON_PAIR_RE
            .captures_iter(doc.raw())
            .filter(|caps| caps[1] == self.key)
            .find_map(|caps| decode_scalar(&caps[2]))
            .map(|value| fragment_text(&value))
    }

    fn name(&self) -> &str {
        &self.label
    }
}

/// Decode a JSON scalar literal into its text form.
fn decode_scalar(literal: &str) -> Option<String> {
    match serde_json::from_str::<Value>(literal) {
        Ok(Value::String(s)) => Some(s),
        Ok(Value::Number(n)) => Some(n.to_string()),
        // Invalid escapes: keep the raw text between the quotes.
        _ => literal
            .strip_prefix('"')
            .and_then(|s| s.strip_suffix('"'))
            .map(String::from),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn find(marker: &JsonFieldMarker, raw: &str) -> Option<String> {
        marker.find(&EpisodeDocument::parse(raw))
    }

    const LD: &str = r#"<script type="application/ld+json">
{
  "@context": "https://schema.org",
  "@type": "PodcastEpisode",
  "name": "Ep 12",
  "datePublished": "2024-06-01T10:00:00Z",
  "episodeNumber": 12,
  "description": "Line one.\nLine \"two\"."
}
</script>"#;

    #[test]
    fn string_field_is_unescaped() {
        let marker = JsonFieldMarker::new("description");
        assert_eq!(
            find(&marker, LD).as_deref(),
            Some("Line one.\nLine \"two\".")
        );
    }

    #[test]
    fn numeric_field_as_text() {
        let marker = JsonFieldMarker::new("episodeNumber");
        assert_eq!(find(&marker, LD).as_deref(), Some("12"));
    }

    #[test]
    fn quoted_number_is_returned_verbatim() {
        let doc = r#"{"episodeNumber": "7"}"#;
        assert_eq!(find(&JsonFieldMarker::new("episodeNumber"), doc).as_deref(), Some("7"));
    }

    #[test]
    fn key_inside_string_value_is_ignored() {
        let doc = r#"{"name": "\"datePublished\": \"fake\"", "datePublished": "2023-02-03"}"#;
        let marker = JsonFieldMarker::new("datePublished");
        assert_eq!(find(&marker, doc).as_deref(), Some("2023-02-03"));
    }

    #[test]
    fn non_scalar_values_are_skipped() {
        let doc = r#"{"description": {"text": "nested"}, "other": 1}"#;
        assert!(find(&JsonFieldMarker::new("description"), doc).is_none());
    }

    #[test]
    fn character_references_in_script_are_decoded() {
        let doc = r#"<script type="application/ld+json">{"description": "Polls &amp; pundits"}</script>"#;
        assert_eq!(
            find(&JsonFieldMarker::new("description"), doc).as_deref(),
            Some("Polls & pundits")
        );
    }

    #[test]
    fn missing_field() {
        assert!(find(&JsonFieldMarker::new("datePublished"), "<html></html>").is_none());
    }
}
