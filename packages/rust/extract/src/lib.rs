//! Episode metadata recovery from rendered documents.
//!
//! Episode pages are not structured data, so every field is recovered by a
//! chain of markers tried in priority order (see [`markers`]), cleaned with
//! the passes in [`text`], and defaulted when nothing matches. Extraction
//! never fails: the worst case is a record with every field at its fallback.

pub mod date;
pub mod markers;
pub mod text;
pub mod tier;

use tracing::debug;

use castindex_shared::{EpisodeRecord, ExtractOptions};

pub use date::{parse_published, published_timestamp};
pub use markers::{EpisodeDocument, Marker, MarkerChain, MarkerMatch};
pub use tier::AccessTierDetector;

/// Recovers [`EpisodeRecord`]s from raw documents.
///
/// Build once per run and reuse across documents.
pub struct Extractor {
    title: MarkerChain,
    published: MarkerChain,
    description: MarkerChain,
    episode_number: MarkerChain,
    tier: AccessTierDetector,
    options: ExtractOptions,
}

impl Extractor {
    /// Create an extractor with the built-in marker chains.
    pub fn new(options: &ExtractOptions) -> Self {
        Self {
            title: MarkerChain::title(),
            published: MarkerChain::published(),
            description: MarkerChain::description(),
            episode_number: MarkerChain::episode_number(),
            tier: AccessTierDetector::new(&options.restricted_marker),
            options: options.clone(),
        }
    }

    /// Recover a best-effort record for the document identified by `slug`.
    pub fn extract(&self, slug: &str, raw: &str) -> EpisodeRecord {
        let doc = EpisodeDocument::parse(raw);
        let mut record = EpisodeRecord::fallback(slug);

        let separator = self.options.title_separator.as_str();
        if let Some(m) = self.title.first_match(&doc, |raw| clean_title(raw, separator)) {
            debug!(slug, marker = %m.marker, "title recovered");
            record.title = m.value;
        }

        if let Some(m) = self.published.first_match(&doc, non_empty_trimmed) {
            debug!(slug, marker = %m.marker, raw = %m.value, "publish date recovered");
            record.published_timestamp = published_timestamp(&m.value);
            record.published_raw = m.value;
        }

        let max_len = self.options.description_max_len;
        if let Some(m) = self.description.first_match(&doc, |raw| clean_description(raw, max_len)) {
            debug!(slug, marker = %m.marker, "description recovered");
            record.description = m.value;
        }

        record.episode_number = self
            .episode_number
            .first_match(&doc, |raw| raw.trim().parse::<u32>().ok().map(|n| n.to_string()))
            .and_then(|m| m.value.parse().ok());

        record.access_tier = self.tier.detect(raw);

        record
    }
}

/// Convenience wrapper: build an [`Extractor`] and extract one document.
pub fn extract_record(slug: &str, doc: &str, options: &ExtractOptions) -> EpisodeRecord {
    Extractor::new(options).extract(slug, doc)
}

// ---------------------------------------------------------------------------
// Field cleaners
// ---------------------------------------------------------------------------

/// Collapse whitespace, drop the site-name suffix and trim.
fn clean_title(raw: &str, separator: &str) -> Option<String> {
    let text = text::collapse_whitespace(raw);
    let title = text::strip_site_suffix(&text, separator).trim();
    (!title.is_empty()).then(|| title.to_string())
}

/// Collapse whitespace and apply the optional length limit.
fn clean_description(raw: &str, max_len: Option<usize>) -> Option<String> {
    let text = text::collapse_whitespace(raw);
    if text.is_empty() {
        return None;
    }
    Some(match max_len {
        Some(max) => text::truncate_description(&text, max),
        None => text,
    })
}

fn non_empty_trimmed(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
