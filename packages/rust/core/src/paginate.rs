//! Fixed-size pagination of the catalog.
//!
//! Page `p` (1-based) covers catalog indices `[(p-1)*k, p*k)`. Page 1 is the
//! home listing at `/`; later pages live at `/page/<n>/`.

use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use castindex_shared::EpisodeRecord;

use crate::catalog::Catalog;

/// One listing page: a contiguous slice of the catalog plus its position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page<'a> {
    /// 1-based page number.
    pub number: usize,
    /// Total pages in this build (always at least 1).
    pub total_pages: usize,
    pub episodes: &'a [EpisodeRecord],
}

impl Page<'_> {
    pub fn is_first(&self) -> bool {
        self.number == 1
    }

    pub fn is_last(&self) -> bool {
        self.number >= self.total_pages
    }

    /// Site-relative path of this page; also its canonical URL.
    pub fn path(&self) -> String {
        page_path(self.number)
    }

    /// Path of the newer neighbour, absent on page 1.
    pub fn prev_path(&self) -> Option<String> {
        (!self.is_first()).then(|| page_path(self.number - 1))
    }

    /// Path of the older neighbour, absent on the last page.
    pub fn next_path(&self) -> Option<String> {
        (!self.is_last()).then(|| page_path(self.number + 1))
    }

    /// Where this page is written under `output_dir`.
    pub fn output_file(&self, output_dir: &Path) -> PathBuf {
        page_output_file(output_dir, self.number)
    }
}

/// Site-relative path for page `number`: `/` for page 1, `/page/<n>/` otherwise.
pub fn page_path(number: usize) -> String {
    if number <= 1 {
        "/".to_string()
    } else {
        format!("/page/{number}/")
    }
}

/// Output file for page `number` under `output_dir`.
pub fn page_output_file(output_dir: &Path, number: usize) -> PathBuf {
    if number <= 1 {
        output_dir.join("index.html")
    } else {
        output_dir
            .join("page")
            .join(number.to_string())
            .join("index.html")
    }
}

/// `max(1, ceil(episodes / page_size))`.
pub fn total_pages(episodes: usize, page_size: NonZeroUsize) -> usize {
    episodes.div_ceil(page_size.get()).max(1)
}

/// Split the catalog into pages in catalog order.
///
/// An empty catalog yields a single empty page.
pub fn paginate(catalog: &Catalog, page_size: NonZeroUsize) -> Vec<Page<'_>> {
    let total = total_pages(catalog.len(), page_size);

    if catalog.is_empty() {
        return vec![Page {
            number: 1,
            total_pages: total,
            episodes: catalog.episodes(),
        }];
    }

    catalog
        .episodes()
        .chunks(page_size.get())
        .enumerate()
        .map(|(idx, episodes)| Page {
            number: idx + 1,
            total_pages: total,
            episodes,
        })
        .collect()
}
