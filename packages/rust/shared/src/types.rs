//! Core domain types for episode catalogs.

use std::sync::LazyLock;

use serde::{Deserialize, Serialize};
use url::Url;

/// Title used when no title marker can be recovered from a document.
pub const DEFAULT_TITLE: &str = "Episode";

static SEGMENT_BASE: LazyLock<Url> =
    LazyLock::new(|| Url::parse("http://localhost/").expect("segment base url"));

// ---------------------------------------------------------------------------
// AccessTier
// ---------------------------------------------------------------------------

/// Whether an episode is open to everyone or gated behind a membership.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessTier {
    #[default]
    Public,
    Restricted,
}

impl AccessTier {
    /// Stable lowercase name, used for CSS classes and asset names.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Restricted => "restricted",
        }
    }
}

impl std::fmt::Display for AccessTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// EpisodeRecord
// ---------------------------------------------------------------------------

/// One entry in the catalog, recovered from a single episode document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpisodeRecord {
    /// Source filename without extension. Unique within a catalog.
    pub slug: String,
    /// Display title (falls back to [`DEFAULT_TITLE`]).
    pub title: String,
    /// Publish timestamp exactly as found in the source; empty if absent.
    pub published_raw: String,
    /// Unix seconds parsed from `published_raw`; `0` when unknown.
    pub published_timestamp: i64,
    /// Whitespace-normalized summary; empty if absent.
    pub description: String,
    /// Episode ordinal, display only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub episode_number: Option<u32>,
    pub access_tier: AccessTier,
}

impl EpisodeRecord {
    /// A record with every field at its fallback value.
    pub fn fallback(slug: impl Into<String>) -> Self {
        Self {
            slug: slug.into(),
            title: DEFAULT_TITLE.to_string(),
            published_raw: String::new(),
            published_timestamp: 0,
            description: String::new(),
            episode_number: None,
            access_tier: AccessTier::Public,
        }
    }

    /// Site-relative URL of the episode page, with the slug percent-encoded
    /// as a single path segment.
    pub fn url(&self) -> String {
        let mut url = SEGMENT_BASE.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.clear().push(&self.slug);
        }
        url.path().to_string()
    }

    /// Whether the publish date was recovered and parsed.
    pub fn has_known_date(&self) -> bool {
        self.published_timestamp != 0
    }

    /// Date portion of the raw timestamp for display (`YYYY-MM-DD` for ISO input).
    ///
    /// Returns `None` when no raw date was found, so callers omit the date
    /// entirely rather than printing a placeholder.
    pub fn display_date(&self) -> Option<&str> {
        let raw = self.published_raw.trim();
        if raw.is_empty() {
            return None;
        }
        Some(raw.char_indices().nth(10).map_or(raw, |(idx, _)| &raw[..idx]))
    }
}
