//! Application configuration for castindex.
//!
//! Project config lives at `./castindex.toml`, with a per-user fallback at
//! `~/.castindex/castindex.toml`. CLI flags override config file values,
//! which override defaults.

use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{CastIndexError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "castindex.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".castindex";

// ---------------------------------------------------------------------------
// Config structs (matching castindex.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Site identity.
    #[serde(default)]
    pub site: SiteSection,

    /// Build inputs, outputs and policies.
    #[serde(default)]
    pub build: BuildSection,

    /// Metadata extraction tuning.
    #[serde(default)]
    pub extract: ExtractOptions,

    /// Outbound links shown on listing pages.
    #[serde(default)]
    pub links: LinksSection,
}

/// `[site]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteSection {
    /// Show name, used in page titles and the home hero.
    #[serde(default = "default_site_name")]
    pub name: String,

    /// One-line pitch shown on the home page and as its meta description.
    #[serde(default)]
    pub tagline: String,

    /// Absolute origin used for sitemap URLs.
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for SiteSection {
    fn default() -> Self {
        Self {
            name: default_site_name(),
            tagline: String::new(),
            base_url: default_base_url(),
        }
    }
}

fn default_site_name() -> String {
    "Podcast".into()
}
fn default_base_url() -> String {
    "https://example.com/".into()
}

/// `[build]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildSection {
    /// Directory holding one rendered document per episode.
    #[serde(default = "default_source_dir")]
    pub source_dir: String,

    /// Directory the listing pages and sitemap are written to.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// File extension of episode documents (without the dot).
    #[serde(default = "default_source_extension")]
    pub source_extension: String,

    /// Episodes per listing page.
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// What to do when no episodes are found.
    #[serde(default)]
    pub empty_catalog: EmptyCatalogPolicy,

    /// Whether to emit `newest/index.html` pointing at the latest episode.
    #[serde(default = "default_true")]
    pub newest_redirect: bool,
}

impl Default for BuildSection {
    fn default() -> Self {
        Self {
            source_dir: default_source_dir(),
            output_dir: default_output_dir(),
            source_extension: default_source_extension(),
            page_size: default_page_size(),
            empty_catalog: EmptyCatalogPolicy::default(),
            newest_redirect: true,
        }
    }
}

fn default_source_dir() -> String {
    "html".into()
}
fn default_output_dir() -> String {
    "html".into()
}
fn default_source_extension() -> String {
    "html".into()
}
fn default_page_size() -> usize {
    24
}
fn default_true() -> bool {
    true
}

/// Policy for a build whose source directory holds no episodes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EmptyCatalogPolicy {
    /// Abort with a non-zero exit and write nothing.
    #[default]
    Fail,
    /// Write a single empty-state listing and a home-only sitemap.
    EmptyListing,
}

/// `[extract]` section. Also used directly as the extractor's runtime options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractOptions {
    /// Separator between an episode title and the appended site name.
    #[serde(default = "default_title_separator")]
    pub title_separator: String,

    /// Asset path whose presence marks an episode as restricted.
    #[serde(default = "default_restricted_marker")]
    pub restricted_marker: String,

    /// Truncate descriptions to this many characters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description_max_len: Option<usize>,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            title_separator: default_title_separator(),
            restricted_marker: default_restricted_marker(),
            description_max_len: None,
        }
    }
}

fn default_title_separator() -> String {
    "|".into()
}
fn default_restricted_marker() -> String {
    "/assets/patreon.png".into()
}

/// `[links]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LinksSection {
    /// "Listen on" links shown in the home hero.
    #[serde(default)]
    pub listen: Vec<NavLink>,

    /// Links shown in every page footer.
    #[serde(default)]
    pub footer: Vec<NavLink>,
}

/// A labelled outbound link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavLink {
    pub label: String,
    pub url: String,
}

// ---------------------------------------------------------------------------
// Site config (runtime, merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Runtime build configuration: validated and merged from config file + CLI flags.
///
/// Passed explicitly into every pipeline stage; nothing is read from globals.
#[derive(Debug, Clone)]
pub struct SiteConfig {
    pub site_name: String,
    pub tagline: String,
    pub base_url: Url,
    pub page_size: NonZeroUsize,
    pub source_dir: PathBuf,
    pub output_dir: PathBuf,
    pub source_extension: String,
    pub empty_catalog: EmptyCatalogPolicy,
    pub newest_redirect: bool,
    pub extract: ExtractOptions,
    pub listen_links: Vec<NavLink>,
    pub footer_links: Vec<NavLink>,
}

impl TryFrom<&AppConfig> for SiteConfig {
    type Error = CastIndexError;

    fn try_from(config: &AppConfig) -> Result<Self> {
        let base_url = Url::parse(&config.site.base_url).map_err(|e| {
            CastIndexError::config(format!(
                "invalid base_url '{}': {e}",
                config.site.base_url
            ))
        })?;

        if base_url.cannot_be_a_base() {
            return Err(CastIndexError::config(format!(
                "base_url '{base_url}' cannot be used as a base for page URLs"
            )));
        }

        let page_size = NonZeroUsize::new(config.build.page_size)
            .ok_or_else(|| CastIndexError::config("page_size must be at least 1"))?;

        Ok(Self {
            site_name: config.site.name.clone(),
            tagline: config.site.tagline.clone(),
            base_url,
            page_size,
            source_dir: PathBuf::from(&config.build.source_dir),
            output_dir: PathBuf::from(&config.build.output_dir),
            source_extension: config.build.source_extension.trim_start_matches('.').to_string(),
            empty_catalog: config.build.empty_catalog,
            newest_redirect: config.build.newest_redirect,
            extract: config.extract.clone(),
            listen_links: config.links.listen.clone(),
            footer_links: config.links.footer.clone(),
        })
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the per-user config directory (`~/.castindex/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| CastIndexError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the per-user config file (`~/.castindex/castindex.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Find the config file to use.
///
/// An explicit path must exist. Otherwise `./castindex.toml` wins over the
/// per-user file; `None` means "use defaults".
pub fn resolve_config(explicit: Option<&Path>) -> Result<Option<PathBuf>> {
    if let Some(path) = explicit {
        if !path.exists() {
            return Err(CastIndexError::config(format!(
                "config file {} does not exist",
                path.display()
            )));
        }
        return Ok(Some(path.to_path_buf()));
    }

    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.exists() {
        return Ok(Some(local));
    }

    // A missing home directory just means there is no per-user config.
    match config_file_path() {
        Ok(path) if path.exists() => Ok(Some(path)),
        _ => Ok(None),
    }
}

/// Load the application config. Returns defaults if no config file is found.
pub fn load_config(explicit: Option<&Path>) -> Result<AppConfig> {
    match resolve_config(explicit)? {
        Some(path) => load_config_from(&path),
        None => {
            tracing::debug!("config file not found, using defaults");
            Ok(AppConfig::default())
        }
    }
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| CastIndexError::io(path, e))?;

    tracing::debug!(path = %path.display(), "loaded config file");

    toml::from_str(&content)
        .map_err(|e| CastIndexError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Write a default config file at `path` (or `./castindex.toml`).
/// Refuses to overwrite an existing file. Returns the path written.
pub fn init_config(path: Option<&Path>) -> Result<PathBuf> {
    let path = path.map_or_else(|| PathBuf::from(CONFIG_FILE_NAME), Path::to_path_buf);

    if path.exists() {
        return Err(CastIndexError::config(format!(
            "{} already exists; remove it first to regenerate",
            path.display()
        )));
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| CastIndexError::io(parent, e))?;
    }

    let content = toml::to_string_pretty(&AppConfig::default())
        .map_err(|e| CastIndexError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| CastIndexError::io(&path, e))?;
    tracing::info!(path = %path.display(), "created default config file");

    Ok(path)
}
