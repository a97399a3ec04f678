//! End-to-end `build` pipeline: source dir → extract → catalog → paginate →
//! render → write.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use tokio::task::JoinSet;
use tracing::{debug, info, instrument, warn};

use castindex_extract::Extractor;
use castindex_shared::{CastIndexError, EmptyCatalogPolicy, EpisodeRecord, Result, SiteConfig};

use crate::catalog::Catalog;
use crate::paginate::paginate;
use crate::render::{render_listing, render_newest};
use crate::sitemap::build_sitemap;
use crate::writer::{OutputFile, write_all};

/// Stem of generated listing files; never treated as an episode.
const INDEX_STEM: &str = "index";

/// Result of a `build` run.
#[derive(Debug, Clone)]
pub struct BuildResult {
    pub episode_count: usize,
    pub page_count: usize,
    pub restricted_count: usize,
    pub undated_count: usize,
    /// Every file written, sorted.
    pub files_written: Vec<PathBuf>,
    pub elapsed: std::time::Duration,
}

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called when a source document has been read and extracted.
    fn document_read(&self, slug: &str, current: usize, total: usize);
    /// Called when an output file has been written.
    fn file_written(&self, path: &Path, current: usize, total: usize);
    /// Called when the pipeline completes.
    fn done(&self, result: &BuildResult);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn document_read(&self, _slug: &str, _current: usize, _total: usize) {}
    fn file_written(&self, _path: &Path, _current: usize, _total: usize) {}
    fn done(&self, _result: &BuildResult) {}
}

/// Run the full `build` pipeline.
///
/// 1. Scan and read source documents
/// 2. Extract records and build the catalog
/// 3. Apply the empty-catalog policy (nothing is written on failure)
/// 4. Render listing pages, sitemap and newest redirect
/// 5. Write everything atomically
#[instrument(skip_all, fields(source = %site.source_dir.display(), out = %site.output_dir.display()))]
pub async fn build_site(site: &SiteConfig, progress: &dyn ProgressReporter) -> Result<BuildResult> {
    let start = Instant::now();

    let catalog = load_catalog(site, progress).await?;

    if catalog.is_empty() {
        match site.empty_catalog {
            EmptyCatalogPolicy::Fail => {
                return Err(CastIndexError::EmptyCatalog {
                    dir: site.source_dir.clone(),
                });
            }
            EmptyCatalogPolicy::EmptyListing => {
                warn!(dir = %site.source_dir.display(), "no episodes found, writing empty listing");
            }
        }
    }

    progress.phase("Rendering pages");
    let (files, page_count) = render_site(&catalog, site)?;

    progress.phase("Writing output");
    let files_written = write_all(files, |path, current, total| {
        progress.file_written(path, current, total);
    })
    .await?;

    let stats = catalog.stats();
    let result = BuildResult {
        episode_count: stats.episodes,
        page_count,
        restricted_count: stats.restricted,
        undated_count: stats.undated,
        files_written,
        elapsed: start.elapsed(),
    };

    info!(
        episodes = result.episode_count,
        pages = result.page_count,
        files = result.files_written.len(),
        elapsed_ms = result.elapsed.as_millis() as u64,
        "build complete"
    );

    progress.done(&result);
    Ok(result)
}

/// Scan, read and extract every source document, then build the catalog.
///
/// Reads run concurrently; records are fed to the catalog in scan order so
/// slug collisions resolve the same way on every run.
#[instrument(skip_all, fields(source = %site.source_dir.display()))]
pub async fn load_catalog(site: &SiteConfig, progress: &dyn ProgressReporter) -> Result<Catalog> {
    progress.phase("Scanning episodes");
    let sources = scan_sources(&site.source_dir, &site.source_extension).await?;
    let total = sources.len();
    info!(documents = total, "source documents found");

    progress.phase("Extracting metadata");
    let extractor = Arc::new(Extractor::new(&site.extract));
    let mut tasks = JoinSet::new();

    for (idx, path) in sources.into_iter().enumerate() {
        let extractor = Arc::clone(&extractor);
        tasks.spawn(async move {
            let bytes = tokio::fs::read(&path)
                .await
                .map_err(|e| CastIndexError::io(&path, e))?;
            let doc = String::from_utf8_lossy(&bytes);
            let record = extractor.extract(&slug_for(&path), &doc);
            debug!(path = %path.display(), slug = %record.slug, tier = %record.access_tier, "extracted");
            Ok::<_, CastIndexError>((idx, record))
        });
    }

    let mut slots: Vec<Option<EpisodeRecord>> = vec![None; total];
    let mut done = 0;
    while let Some(joined) = tasks.join_next().await {
        let (idx, record) = joined.map_err(|e| CastIndexError::Task(e.to_string()))??;
        done += 1;
        progress.document_read(&record.slug, done, total);
        slots[idx] = Some(record);
    }

    Ok(Catalog::from_records(slots.into_iter().flatten()))
}

/// Render every output file for a catalog. Returns the files and the page count.
pub fn render_site(catalog: &Catalog, site: &SiteConfig) -> Result<(Vec<OutputFile>, usize)> {
    let pages = paginate(catalog, site.page_size);
    let page_count = pages.len();

    let mut files: Vec<OutputFile> = pages
        .iter()
        .map(|page| {
            OutputFile::new(
                page.output_file(&site.output_dir),
                render_listing(page, site),
            )
        })
        .collect();

    files.push(OutputFile::new(
        site.output_dir.join("sitemap.xml"),
        build_sitemap(catalog, page_count, &site.base_url)?,
    ));

    if site.newest_redirect {
        if let Some(newest) = catalog.newest() {
            files.push(OutputFile::new(
                site.output_dir.join("newest").join("index.html"),
                render_newest(newest),
            ));
        }
    }

    debug!(files = files.len(), pages = page_count, "site rendered");
    Ok((files, page_count))
}

/// List episode documents directly inside `dir`, sorted by path.
///
/// Only files (or symlinks to files) whose extension matches
/// (case-insensitively) are kept, and generated `index` files are skipped so
/// source and output dirs may coincide.
pub async fn scan_sources(dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    let mut entries = tokio::fs::read_dir(dir)
        .await
        .map_err(|e| CastIndexError::io(dir, e))?;

    let mut sources = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| CastIndexError::io(dir, e))?
    {
        let path = entry.path();
        if !is_episode_source(&path, extension) {
            debug!(path = %path.display(), "skipping non-episode file");
            continue;
        }
        // Follows symlinks; a dangling link is an error, not a skip.
        let metadata = tokio::fs::metadata(&path)
            .await
            .map_err(|e| CastIndexError::io(&path, e))?;
        if metadata.is_file() {
            sources.push(path);
        } else {
            debug!(path = %path.display(), "skipping non-file entry");
        }
    }

    sources.sort();
    Ok(sources)
}

fn is_episode_source(path: &Path, extension: &str) -> bool {
    let ext_matches = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(extension));
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
    ext_matches && !stem.is_empty() && !stem.starts_with('.') && stem != INDEX_STEM
}

/// Slug is the filename without its extension.
fn slug_for(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroUsize;

    use castindex_shared::{AccessTier, AppConfig};

    use super::*;

    const FIXTURES: &str = "../../../fixtures/episodes";

    fn temp_dir(label: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "castindex-{label}-test-{}",
            uuid::Uuid::now_v7()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    /// Copy the fixture episodes into a fresh source dir.
    fn fixture_source() -> PathBuf {
        let dir = temp_dir("source");
        for entry in std::fs::read_dir(FIXTURES).unwrap() {
            let path = entry.unwrap().path();
            std::fs::copy(&path, dir.join(path.file_name().unwrap())).unwrap();
        }
        dir
    }

    fn site(source: &Path, out: &Path, page_size: usize) -> SiteConfig {
        let mut app = AppConfig::default();
        app.site.name = "The Strategists".into();
        app.site.base_url = "https://episodes.example.com".into();
        let mut site = SiteConfig::try_from(&app).unwrap();
        site.source_dir = source.to_path_buf();
        site.output_dir = out.to_path_buf();
        site.page_size = NonZeroUsize::new(page_size).unwrap();
        site
    }

    #[test]
    fn episode_source_filter() {
        assert!(is_episode_source(Path::new("html/ep-1.html"), "html"));
        assert!(is_episode_source(Path::new("html/EP-1.HTML"), "html"));
        assert!(!is_episode_source(Path::new("html/index.html"), "html"));
        assert!(!is_episode_source(Path::new("html/notes.txt"), "html"));
        assert!(!is_episode_source(Path::new("html/.index.html.tmp"), "html"));
        assert!(!is_episode_source(Path::new("html/noext"), "html"));
    }

    #[tokio::test]
    async fn scan_skips_dirs_index_and_other_extensions() {
        let dir = temp_dir("scan");
        std::fs::write(dir.join("b.html"), "").unwrap();
        std::fs::write(dir.join("a.html"), "").unwrap();
        std::fs::write(dir.join("index.html"), "").unwrap();
        std::fs::write(dir.join("sitemap.xml"), "").unwrap();
        std::fs::create_dir_all(dir.join("page").join("2")).unwrap();
        std::fs::create_dir_all(dir.join("nested.html")).unwrap();

        let sources = scan_sources(&dir, "html").await.unwrap();
        assert_eq!(sources, [dir.join("a.html"), dir.join("b.html")]);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn scan_follows_symlinked_episodes() {
        let dir = temp_dir("scan-link");
        let elsewhere = temp_dir("scan-target");
        std::fs::write(dir.join("a.html"), "").unwrap();
        std::fs::write(elsewhere.join("real.html"), "<title>Linked</title>").unwrap();
        std::os::unix::fs::symlink(elsewhere.join("real.html"), dir.join("linked.html")).unwrap();

        let sources = scan_sources(&dir, "html").await.unwrap();
        assert_eq!(sources, [dir.join("a.html"), dir.join("linked.html")]);

        let _ = std::fs::remove_dir_all(&dir);
        let _ = std::fs::remove_dir_all(&elsewhere);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn build_reports_unreadable_episode_path() {
        let source = fixture_source();
        let out = temp_dir("out");
        let dangling = source.join("ep-999-gone.html");
        std::os::unix::fs::symlink(source.join("does-not-exist.html"), &dangling).unwrap();

        let err = build_site(&site(&source, &out, 24), &SilentProgress)
            .await
            .unwrap_err();
        match err {
            CastIndexError::Io { path, .. } => assert_eq!(path, dangling),
            other => panic!("expected I/O error, got {other:?}"),
        }
        assert!(!out.join("index.html").exists());

        let _ = std::fs::remove_dir_all(&source);
        let _ = std::fs::remove_dir_all(&out);
    }

    #[tokio::test]
    async fn missing_source_dir_is_io_error() {
        let dir = std::env::temp_dir().join(format!("castindex-missing-{}", uuid::Uuid::now_v7()));
        let err = scan_sources(&dir, "html").await.unwrap_err();
        assert!(matches!(err, CastIndexError::Io { .. }));
    }

    #[tokio::test]
    async fn load_catalog_from_fixtures() {
        let source = fixture_source();
        let out = temp_dir("out");
        let catalog = load_catalog(&site(&source, &out, 24), &SilentProgress)
            .await
            .unwrap();

        let slugs: Vec<&str> = catalog.iter().map(|e| e.slug.as_str()).collect();
        assert_eq!(
            slugs,
            [
                "ep-212-budget-fallout",
                "ep-211-leadership-race",
                "ep-210-by-election-night",
                "bonus-members-qa",
            ]
        );
        assert_eq!(catalog.episodes()[3].access_tier, AccessTier::Restricted);
        assert!(catalog.is_sorted());

        let _ = std::fs::remove_dir_all(&source);
        let _ = std::fs::remove_dir_all(&out);
    }

    #[tokio::test]
    async fn build_writes_pages_sitemap_and_newest() {
        let source = fixture_source();
        let out = temp_dir("out");
        let result = build_site(&site(&source, &out, 2), &SilentProgress)
            .await
            .unwrap();

        assert_eq!(result.episode_count, 4);
        assert_eq!(result.page_count, 2);
        assert_eq!(result.restricted_count, 1);
        assert_eq!(result.undated_count, 1);
        assert_eq!(result.files_written.len(), 4);

        let home = std::fs::read_to_string(out.join("index.html")).unwrap();
        assert!(home.contains(r#"href="/ep-212-budget-fallout""#));
        assert!(home.contains(r#"<link rel="next" href="/page/2/">"#));
        assert!(!home.contains("bonus-members-qa"));

        let second = std::fs::read_to_string(out.join("page/2/index.html")).unwrap();
        assert!(second.contains(r#"<link rel="prev" href="/">"#));
        assert!(second.contains(r#"<a class="card restricted" href="/bonus-members-qa">"#));

        let sitemap = std::fs::read_to_string(out.join("sitemap.xml")).unwrap();
        assert_eq!(sitemap.matches("<url>").count(), 1 + 1 + 4);
        assert!(sitemap.contains("<loc>https://episodes.example.com/ep-211-leadership-race</loc>"));
        assert!(sitemap.contains("<lastmod>2024-05-25</lastmod>"));

        let newest = std::fs::read_to_string(out.join("newest/index.html")).unwrap();
        assert!(newest.contains("url=/ep-212-budget-fallout"));

        let _ = std::fs::remove_dir_all(&source);
        let _ = std::fs::remove_dir_all(&out);
    }

    #[tokio::test]
    async fn build_into_source_dir_is_repeatable() {
        let source = fixture_source();
        let config = site(&source, &source, 24);

        let first = build_site(&config, &SilentProgress).await.unwrap();
        let home_first = std::fs::read_to_string(source.join("index.html")).unwrap();
        let second = build_site(&config, &SilentProgress).await.unwrap();
        let home_second = std::fs::read_to_string(source.join("index.html")).unwrap();

        assert_eq!(first.episode_count, second.episode_count);
        assert_eq!(home_first, home_second);

        let _ = std::fs::remove_dir_all(&source);
    }

    #[tokio::test]
    async fn empty_source_fails_without_writing() {
        let source = temp_dir("empty");
        let out = temp_dir("out");

        let err = build_site(&site(&source, &out, 24), &SilentProgress)
            .await
            .unwrap_err();
        assert!(matches!(err, CastIndexError::EmptyCatalog { .. }));
        assert!(!out.join("index.html").exists());
        assert!(!out.join("sitemap.xml").exists());

        let _ = std::fs::remove_dir_all(&source);
        let _ = std::fs::remove_dir_all(&out);
    }

    #[tokio::test]
    async fn empty_source_with_empty_listing_policy() {
        let source = temp_dir("empty");
        let out = temp_dir("out");
        let mut config = site(&source, &out, 24);
        config.empty_catalog = EmptyCatalogPolicy::EmptyListing;

        let result = build_site(&config, &SilentProgress).await.unwrap();
        assert_eq!(result.episode_count, 0);
        assert_eq!(result.page_count, 1);
        assert!(!out.join("newest").exists());

        let home = std::fs::read_to_string(out.join("index.html")).unwrap();
        assert!(home.contains("No episodes yet."));
        let sitemap = std::fs::read_to_string(out.join("sitemap.xml")).unwrap();
        assert_eq!(sitemap.matches("<url>").count(), 1);

        let _ = std::fs::remove_dir_all(&source);
        let _ = std::fs::remove_dir_all(&out);
    }

    #[tokio::test]
    async fn newest_redirect_can_be_disabled() {
        let source = fixture_source();
        let out = temp_dir("out");
        let mut config = site(&source, &out, 24);
        config.newest_redirect = false;

        let result = build_site(&config, &SilentProgress).await.unwrap();
        assert_eq!(result.files_written.len(), 2);
        assert!(!out.join("newest").exists());

        let _ = std::fs::remove_dir_all(&source);
        let _ = std::fs::remove_dir_all(&out);
    }

    #[tokio::test]
    async fn duplicate_slugs_keep_later_file() {
        let source = temp_dir("dups");
        std::fs::write(source.join("ep-1.html"), "<title>Lower | Show</title>").unwrap();
        std::fs::write(source.join("ep-1.HTML"), "<title>Upper | Show</title>").unwrap();
        let out = temp_dir("out");

        let catalog = load_catalog(&site(&source, &out, 24), &SilentProgress)
            .await
            .unwrap();
        assert_eq!(catalog.len(), 1);
        // "ep-1.HTML" sorts before "ep-1.html", so the lowercase file wins.
        assert_eq!(catalog.episodes()[0].title, "Lower");

        let _ = std::fs::remove_dir_all(&source);
        let _ = std::fs::remove_dir_all(&out);
    }
}
