//! Episode catalog: deduplicated and ordered newest first.
//!
//! Ordering is by publish timestamp descending, ties broken by slug
//! ascending. Records with an unknown date share timestamp `0` and therefore
//! sort after every dated record, in slug order.

use std::cmp::Ordering;
use std::collections::HashMap;

use tracing::{debug, instrument, warn};

use castindex_shared::{AccessTier, EpisodeRecord};

/// The complete, sorted, deduplicated set of records for one build.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    episodes: Vec<EpisodeRecord>,
}

/// Counts reported after a build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CatalogStats {
    pub episodes: usize,
    pub restricted: usize,
    pub undated: usize,
}

impl Catalog {
    /// Build a catalog from records in scan order.
    ///
    /// When a slug repeats, the later record replaces the earlier one.
    #[instrument(skip_all)]
    pub fn from_records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = EpisodeRecord>,
    {
        let mut episodes: Vec<EpisodeRecord> = Vec::new();
        let mut by_slug: HashMap<String, usize> = HashMap::new();

        for record in records {
            match by_slug.get(&record.slug) {
                Some(&idx) => {
                    warn!(slug = %record.slug, "duplicate slug, keeping the later record");
                    episodes[idx] = record;
                }
                None => {
                    by_slug.insert(record.slug.clone(), episodes.len());
                    episodes.push(record);
                }
            }
        }

        episodes.sort_by(catalog_order);

        debug!(episodes = episodes.len(), "catalog built");

        Self { episodes }
    }

    /// Records in catalog order.
    pub fn episodes(&self) -> &[EpisodeRecord] {
        &self.episodes
    }

    pub fn len(&self) -> usize {
        self.episodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.episodes.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, EpisodeRecord> {
        self.episodes.iter()
    }

    /// The most recently published episode.
    pub fn newest(&self) -> Option<&EpisodeRecord> {
        self.episodes.first()
    }

    /// Whether the records are in catalog order.
    pub fn is_sorted(&self) -> bool {
        self.episodes
            .windows(2)
            .all(|pair| catalog_order(&pair[0], &pair[1]) != Ordering::Greater)
    }

    pub fn stats(&self) -> CatalogStats {
        CatalogStats {
            episodes: self.episodes.len(),
            restricted: self
                .episodes
                .iter()
                .filter(|e| e.access_tier == AccessTier::Restricted)
                .count(),
            undated: self.episodes.iter().filter(|e| !e.has_known_date()).count(),
        }
    }

    pub fn into_records(self) -> Vec<EpisodeRecord> {
        self.episodes
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a EpisodeRecord;
    type IntoIter = std::slice::Iter<'a, EpisodeRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.episodes.iter()
    }
}

/// Dated records newest first, then undated records; ties by slug ascending.
///
/// Undated (timestamp 0) always sorts last, even after pre-1970 dates.
pub fn catalog_order(a: &EpisodeRecord, b: &EpisodeRecord) -> Ordering {
    b.has_known_date()
        .cmp(&a.has_known_date())
        .then_with(|| b.published_timestamp.cmp(&a.published_timestamp))
        .then_with(|| a.slug.cmp(&b.slug))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(slug: &str, ts: i64) -> EpisodeRecord {
        let mut r = EpisodeRecord::fallback(slug);
        r.published_timestamp = ts;
        if ts != 0 {
            r.published_raw = format!("ts:{ts}");
        }
        r
    }

    fn slugs(catalog: &Catalog) -> Vec<&str> {
        catalog.iter().map(|e| e.slug.as_str()).collect()
    }

    #[test]
    fn sorts_newest_first() {
        let catalog = Catalog::from_records(vec![
            record("jan", 1_704_067_200),
            record("unknown", 0),
            record("jun", 1_717_200_000),
        ]);
        assert_eq!(slugs(&catalog), ["jun", "jan", "unknown"]);
        assert!(catalog.is_sorted());
    }

    #[test]
    fn undated_records_sort_after_dated_ones() {
        let catalog = Catalog::from_records(vec![
            record("b-undated", 0),
            record("old", 1),
            record("a-undated", 0),
            record("new", 2),
        ]);
        assert_eq!(slugs(&catalog), ["new", "old", "a-undated", "b-undated"]);
    }

    #[test]
    fn pre_1970_dates_sort_before_undated() {
        let catalog = Catalog::from_records(vec![
            record("undated", 0),
            record("moon-landing", -14_182_940),
            record("recent", 1_700_000_000),
        ]);
        assert_eq!(slugs(&catalog), ["recent", "moon-landing", "undated"]);
        assert!(catalog.is_sorted());
        assert_eq!(catalog.newest().map(|r| r.slug.as_str()), Some("recent"));
    }

    #[test]
    fn ties_break_by_slug() {
        let catalog = Catalog::from_records(vec![
            record("zeta", 100),
            record("alpha", 100),
            record("mid", 100),
        ]);
        assert_eq!(slugs(&catalog), ["alpha", "mid", "zeta"]);
    }

    #[test]
    fn order_is_independent_of_input_order() {
        let forward = Catalog::from_records(vec![record("a", 5), record("b", 5), record("c", 0)]);
        let reversed = Catalog::from_records(vec![record("c", 0), record("b", 5), record("a", 5)]);
        assert_eq!(forward, reversed);
    }

    #[test]
    fn sorting_is_idempotent() {
        let once = Catalog::from_records(vec![
            record("x", 3),
            record("y", 0),
            record("z", 3),
            record("w", 9),
        ]);
        let twice = Catalog::from_records(once.clone().into_records());
        assert_eq!(once, twice);
    }

    #[test]
    fn later_duplicate_wins() {
        let mut first = record("dup", 10);
        first.title = "First".into();
        let mut second = record("dup", 20);
        second.title = "Second".into();

        let catalog = Catalog::from_records(vec![first, record("other", 15), second]);
        assert_eq!(catalog.len(), 2);
        assert_eq!(slugs(&catalog), ["dup", "other"]);
        assert_eq!(catalog.episodes()[0].title, "Second");
    }

    #[test]
    fn empty_input_is_valid() {
        let catalog = Catalog::from_records(Vec::new());
        assert!(catalog.is_empty());
        assert!(catalog.newest().is_none());
        assert!(catalog.is_sorted());
    }

    #[test]
    fn stats_count_tiers_and_dates() {
        let mut gated = record("gated", 0);
        gated.access_tier = AccessTier::Restricted;
        let catalog = Catalog::from_records(vec![gated, record("open", 7)]);
        let stats = catalog.stats();
        assert_eq!(stats.episodes, 2);
        assert_eq!(stats.restricted, 1);
        assert_eq!(stats.undated, 1);
    }
}
