//! Markers that read HTML elements: `<title>`, `<h1>` and `<meta>` tags.
//!
//! Element text and attribute values come from the parsed document, so
//! character references are already decoded.

use std::sync::LazyLock;

use scraper::Selector;

use super::{EpisodeDocument, Marker};

static TITLE_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("title").expect("title selector"));

static H1_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("h1").expect("h1 selector"));

static META_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("meta[content]").expect("meta selector"));

/// The document's `<title>` element.
pub struct TitleElementMarker;

impl Marker for TitleElementMarker {
    fn find(&self, doc: &EpisodeDocument<'_>) -> Option<String> {
        doc.html()
            .select(&TITLE_SEL)
            .next()
            .map(|el| el.text().collect::<String>())
    }

    fn name(&self) -> &str {
        "title"
    }
}

/// The first `<h1>` content heading, with inline markup flattened to text.
pub struct HeadingMarker;

impl Marker for HeadingMarker {
    fn find(&self, doc: &EpisodeDocument<'_>) -> Option<String> {
        doc.html()
            .select(&H1_SEL)
            .next()
            .map(|el| el.text().collect::<String>())
    }

    fn name(&self) -> &str {
        "h1"
    }
}

/// The `content` of the first `<meta>` tag whose `property` or `name` equals `key`.
///
/// Key comparison ignores case.
pub struct MetaTagMarker {
    key: String,
    label: String,
}

impl MetaTagMarker {
    pub fn new(key: &str) -> Self {
        Self {
            key: key.to_string(),
            label: format!("meta:{key}"),
        }
    }

    fn is_keyed(&self, value: Option<&str>) -> bool {
        value.is_some_and(|v| v.trim().eq_ignore_ascii_case(&self.key))
    }
}

impl Marker for MetaTagMarker {
    fn find(&self, doc: &EpisodeDocument<'_>) -> Option<String> {
        doc.html().select(&META_SEL).find_map(|el| {
            let meta = el.value();
            if self.is_keyed(meta.attr("property")) || self.is_keyed(meta.attr("name")) {
                meta.attr("content").map(String::from)
            } else {
                None
            }
        })
    }

    fn name(&self) -> &str {
        &self.label
    }
}
