//! Sitemap generation.
//!
//! One `<urlset>` covering the home page, every later listing page and every
//! episode. Locations are absolute, joined against the configured base URL.

use std::collections::HashSet;

use chrono::NaiveDate;
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use tracing::{debug, instrument};
use url::Url;

use castindex_shared::{CastIndexError, Result};

use crate::catalog::Catalog;
use crate::paginate::page_path;

const SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

const HOME_PRIORITY: f32 = 1.0;
const PAGE_PRIORITY: f32 = 0.5;
const EPISODE_PRIORITY: f32 = 0.8;

/// One `<url>` element.
#[derive(Debug, Clone, PartialEq)]
pub struct SitemapEntry {
    /// Absolute URL.
    pub loc: String,
    /// `YYYY-MM-DD`, only when the episode date is known.
    pub lastmod: Option<String>,
    pub priority: Option<f32>,
}

/// Collect sitemap entries: home, listing pages `2..=total_pages`, then
/// episodes in catalog order. Repeated locations keep the first entry.
pub fn sitemap_entries(
    catalog: &Catalog,
    total_pages: usize,
    base_url: &Url,
) -> Result<Vec<SitemapEntry>> {
    let mut entries = Vec::with_capacity(total_pages + catalog.len());
    let mut seen: HashSet<String> = HashSet::new();

    let mut push = |entry: SitemapEntry| {
        if seen.insert(entry.loc.clone()) {
            entries.push(entry);
        } else {
            debug!(loc = %entry.loc, "duplicate sitemap location skipped");
        }
    };

    push(SitemapEntry {
        loc: absolute_url(base_url, "/")?,
        lastmod: None,
        priority: Some(HOME_PRIORITY),
    });

    for number in 2..=total_pages {
        push(SitemapEntry {
            loc: absolute_url(base_url, &page_path(number))?,
            lastmod: None,
            priority: Some(PAGE_PRIORITY),
        });
    }

    for episode in catalog {
        push(SitemapEntry {
            loc: absolute_url(base_url, &episode.url())?,
            lastmod: lastmod_date(&episode.published_raw),
            priority: Some(EPISODE_PRIORITY),
        });
    }

    Ok(entries)
}

/// Serialize entries as a sitemap XML document.
pub fn render_sitemap(entries: &[SitemapEntry]) -> Result<String> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);

    write(&mut writer, Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    write(
        &mut writer,
        Event::Start(BytesStart::new("urlset").with_attributes([("xmlns", SITEMAP_NS)])),
    )?;

    for entry in entries {
        write(&mut writer, Event::Start(BytesStart::new("url")))?;
        write_text_element(&mut writer, "loc", &entry.loc)?;
        if let Some(lastmod) = &entry.lastmod {
            write_text_element(&mut writer, "lastmod", lastmod)?;
        }
        if let Some(priority) = entry.priority {
            write_text_element(&mut writer, "priority", &format!("{priority:.1}"))?;
        }
        write(&mut writer, Event::End(BytesEnd::new("url")))?;
    }

    write(&mut writer, Event::End(BytesEnd::new("urlset")))?;

    let mut xml = String::from_utf8(writer.into_inner())
        .map_err(|e| CastIndexError::Xml(e.to_string()))?;
    xml.push('\n');
    Ok(xml)
}

/// Build the complete sitemap document for a catalog.
#[instrument(skip_all, fields(episodes = catalog.len(), total_pages = total_pages))]
pub fn build_sitemap(catalog: &Catalog, total_pages: usize, base_url: &Url) -> Result<String> {
    let entries = sitemap_entries(catalog, total_pages, base_url)?;
    debug!(entries = entries.len(), "sitemap entries collected");
    render_sitemap(&entries)
}

/// Resolve a site-relative path against `base_url`, keeping any path prefix
/// the base carries (`https://host/show` + `/ep-1` → `https://host/show/ep-1`).
pub fn absolute_url(base_url: &Url, path: &str) -> Result<String> {
    let mut base = base_url.clone();
    if !base.path().ends_with('/') {
        let with_slash = format!("{}/", base.path());
        base.set_path(&with_slash);
    }
    // "./" keeps a slug containing ':' from parsing as a scheme.
    let relative = format!("./{}", path.trim_start_matches('/'));
    base.join(&relative)
        .map(String::from)
        .map_err(|e| CastIndexError::url(path, e))
}

/// Date portion of a raw timestamp, if it is a valid `YYYY-MM-DD`.
fn lastmod_date(raw: &str) -> Option<String> {
    let date = raw.trim().get(..10)?;
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .ok()
        .map(|_| date.to_string())
}

fn write(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<()> {
    writer
        .write_event(event)
        .map_err(|e| CastIndexError::Xml(e.to_string()))
}

/// `<name>text</name>`, with `text` escaped.
fn write_text_element(writer: &mut Writer<Vec<u8>>, name: &str, text: &str) -> Result<()> {
    write(writer, Event::Start(BytesStart::new(name)))?;
    write(writer, Event::Text(BytesText::new(text)))?;
    write(writer, Event::End(BytesEnd::new(name)))
}
