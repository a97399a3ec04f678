//! Marker trait and the built-in marker chains for each metadata field.
//!
//! A marker recognizes one textual pattern in a raw episode document. Markers
//! for the same field are grouped in a [`MarkerChain`] and tried in priority
//! order; the first one yielding a usable value wins.

mod html;
mod json_ld;

pub use html::{HeadingMarker, MetaTagMarker, TitleElementMarker};
pub use json_ld::JsonFieldMarker;

use scraper::Html;

// ---------------------------------------------------------------------------
// Document
// ---------------------------------------------------------------------------

/// One episode document: the raw text plus its parsed HTML tree.
///
/// Parsed once per document and shared by every marker.
pub struct EpisodeDocument<'a> {
    raw: &'a str,
    html: Html,
}

impl<'a> EpisodeDocument<'a> {
    pub fn parse(raw: &'a str) -> Self {
        Self {
            raw,
            html: Html::parse_document(raw),
        }
    }

    /// The document text exactly as read.
    pub fn raw(&self) -> &'a str {
        self.raw
    }

    pub fn html(&self) -> &Html {
        &self.html
    }
}

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// A single recognizable pattern for one metadata field.
pub trait Marker: Send + Sync {
    /// Return the raw text captured by this marker, if it occurs in `doc`.
    fn find(&self, doc: &EpisodeDocument<'_>) -> Option<String>;

    /// Human-readable marker name for tracing.
    fn name(&self) -> &str;
}

/// A value recovered by a chain, with the marker that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerMatch {
    pub value: String,
    pub marker: String,
}

// ---------------------------------------------------------------------------
// Chain
// ---------------------------------------------------------------------------

/// Holds markers for one field in priority order.
pub struct MarkerChain {
    markers: Vec<Box<dyn Marker>>,
}

impl MarkerChain {
    /// Create a chain from markers listed highest priority first.
    pub fn new(markers: Vec<Box<dyn Marker>>) -> Self {
        Self { markers }
    }

    /// `<title>`, then `og:title`, then the first `<h1>`.
    pub fn title() -> Self {
        Self::new(vec![
            Box::new(TitleElementMarker),
            Box::new(MetaTagMarker::new("og:title")),
            Box::new(HeadingMarker),
        ])
    }

    /// JSON-LD `datePublished`, then `article:published_time`.
    pub fn published() -> Self {
        Self::new(vec![
            Box::new(JsonFieldMarker::new("datePublished")),
            Box::new(MetaTagMarker::new("article:published_time")),
        ])
    }

    /// `og:description`, then `description` meta, then JSON-LD `description`.
    pub fn description() -> Self {
        Self::new(vec![
            Box::new(MetaTagMarker::new("og:description")),
            Box::new(MetaTagMarker::new("description")),
            Box::new(JsonFieldMarker::new("description")),
        ])
    }

    /// JSON-LD `episodeNumber`.
    pub fn episode_number() -> Self {
        Self::new(vec![Box::new(JsonFieldMarker::new("episodeNumber"))])
    }

    /// Try each marker in order, passing its raw capture through `clean`.
    ///
    /// A marker whose capture cleans to `None` does not count as a match, so
    /// the next marker gets a chance.
    pub fn first_match<F>(&self, doc: &EpisodeDocument<'_>, clean: F) -> Option<MarkerMatch>
    where
        F: Fn(&str) -> Option<String>,
    {
        self.markers.iter().find_map(|marker| {
            let raw = marker.find(doc)?;
            let value = clean(&raw)?;
            Some(MarkerMatch {
                value,
                marker: marker.name().to_string(),
            })
        })
    }

    /// Marker names in priority order.
    pub fn names(&self) -> Vec<&str> {
        self.markers.iter().map(|m| m.name()).collect()
    }
}
