//! Core pipeline orchestration and domain logic for castindex.
//!
//! This crate turns extracted episode records into a sorted catalog,
//! paginated listing pages and a sitemap, and writes them to disk
//! (`build_site`).

pub mod catalog;
pub mod paginate;
pub mod pipeline;
pub mod render;
pub mod sitemap;
pub mod writer;

pub use catalog::{Catalog, CatalogStats};
pub use paginate::{Page, paginate, total_pages};
pub use pipeline::{BuildResult, ProgressReporter, SilentProgress, build_site, load_catalog};
