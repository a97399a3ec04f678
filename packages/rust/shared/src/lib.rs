//! Shared types, error model, and configuration for castindex.
//!
//! This crate is the foundation depended on by all other castindex crates.
//! It provides:
//! - [`CastIndexError`]: the unified error type
//! - Domain types ([`EpisodeRecord`], [`AccessTier`])
//! - Configuration ([`AppConfig`], [`SiteConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, BuildSection, EmptyCatalogPolicy, ExtractOptions, LinksSection, NavLink,
    SiteConfig, SiteSection, config_dir, config_file_path, init_config, load_config,
    load_config_from, resolve_config,
};
pub use error::{CastIndexError, Result};
pub use types::{AccessTier, DEFAULT_TITLE, EpisodeRecord};
