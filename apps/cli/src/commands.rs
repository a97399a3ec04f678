//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use color_eyre::eyre::Result;
use castindex_core::pipeline::{BuildResult, ProgressReporter, SilentProgress};
use castindex_shared::{
    AppConfig, EmptyCatalogPolicy, SiteConfig, init_config, load_config, resolve_config,
};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// castindex: build episode listings and a sitemap from rendered episode pages.
#[derive(Parser)]
#[command(
    name = "castindex",
    version,
    about = "Build paginated episode listings and a sitemap from rendered episode pages.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file (defaults to ./castindex.toml, then ~/.castindex/castindex.toml).
    #[arg(long, global = true, env = "CASTINDEX_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Build listing pages, sitemap and newest redirect.
    Build {
        #[command(flatten)]
        overrides: BuildOverrides,
    },

    /// Extract and catalog episodes without writing anything.
    Inspect {
        /// Print the catalog as JSON instead of a table.
        #[arg(long)]
        json: bool,

        /// Directory of episode documents.
        #[arg(long)]
        source: Option<PathBuf>,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Flags that override config file values for a build.
#[derive(Args, Debug, Default, Clone)]
pub(crate) struct BuildOverrides {
    /// Directory of episode documents.
    #[arg(long)]
    pub source: Option<PathBuf>,

    /// Output directory for listing pages and sitemap.
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// Absolute site origin used for sitemap URLs.
    #[arg(long)]
    pub base_url: Option<String>,

    /// Episodes per listing page.
    #[arg(long)]
    pub page_size: Option<usize>,

    /// Write an empty listing instead of failing when no episodes are found.
    #[arg(long)]
    pub allow_empty: bool,
}

impl BuildOverrides {
    /// Layer flags over the loaded file config.
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(source) = &self.source {
            config.build.source_dir = source.to_string_lossy().into_owned();
        }
        if let Some(out) = &self.out {
            config.build.output_dir = out.to_string_lossy().into_owned();
        }
        if let Some(base_url) = &self.base_url {
            config.site.base_url = base_url.clone();
        }
        if let Some(page_size) = self.page_size {
            config.build.page_size = page_size;
        }
        if self.allow_empty {
            config.build.empty_catalog = EmptyCatalogPolicy::EmptyListing;
        }
    }
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "castindex=info",
        1 => "castindex=debug",
        _ => "castindex=trace",
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config.as_deref();
    match cli.command {
        Command::Build { overrides } => cmd_build(config_path, &overrides).await,
        Command::Inspect { json, source } => cmd_inspect(config_path, source, json).await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(config_path).await,
            ConfigAction::Show => cmd_config_show(config_path).await,
        },
    }
}

/// Load the file config, layer the flags over it and validate.
fn resolve_site(config_path: Option<&Path>, overrides: &BuildOverrides) -> Result<SiteConfig> {
    let mut config = load_config(config_path)?;
    overrides.apply(&mut config);
    Ok(SiteConfig::try_from(&config)?)
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_build(config_path: Option<&Path>, overrides: &BuildOverrides) -> Result<()> {
    let site = resolve_site(config_path, overrides)?;

    info!(
        source = %site.source_dir.display(),
        out = %site.output_dir.display(),
        page_size = site.page_size.get(),
        "building episode index"
    );

    let reporter = CliProgress::new();
    let result = castindex_core::build_site(&site, &reporter).await;
    if result.is_err() {
        reporter.spinner.finish_and_clear();
    }
    let result = result?;

    println!();
    println!("  Episode index built!");
    println!("  Episodes:   {}", result.episode_count);
    println!("  Pages:      {}", result.page_count);
    println!("  Restricted: {}", result.restricted_count);
    println!("  Undated:    {}", result.undated_count);
    println!("  Files:      {}", result.files_written.len());
    println!("  Output:     {}", site.output_dir.display());
    println!(
        "  Time:       {:.1}s",
        result.elapsed.as_secs_f64()
    );
    println!();

    Ok(())
}

async fn cmd_inspect(config_path: Option<&Path>, source: Option<PathBuf>, json: bool) -> Result<()> {
    let overrides = BuildOverrides {
        source,
        ..BuildOverrides::default()
    };
    let site = resolve_site(config_path, &overrides)?;

    let catalog = castindex_core::load_catalog(&site, &SilentProgress).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(catalog.episodes())?);
        return Ok(());
    }

    println!(
        "{:<36} {:<10} {:<10} {:>5}  TITLE",
        "SLUG", "DATE", "TIER", "#"
    );
    for ep in &catalog {
        println!(
            "{:<36} {:<10} {:<10} {:>5}  {}",
            ep.slug,
            ep.display_date().unwrap_or("-"),
            ep.access_tier.as_str(),
            ep.episode_number.map_or_else(|| "-".to_string(), |n| n.to_string()),
            ep.title,
        );
    }

    let stats = catalog.stats();
    println!();
    println!(
        "  {} episodes ({} restricted, {} undated), {} pages at {} per page",
        stats.episodes,
        stats.restricted,
        stats.undated,
        castindex_core::total_pages(stats.episodes, site.page_size),
        site.page_size,
    );

    Ok(())
}

async fn cmd_config_init(config_path: Option<&Path>) -> Result<()> {
    let path = init_config(config_path)?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

async fn cmd_config_show(config_path: Option<&Path>) -> Result<()> {
    match resolve_config(config_path)? {
        Some(path) => println!("# loaded from {}", path.display()),
        None => println!("# no config file found, showing defaults"),
    }
    let config: AppConfig = load_config(config_path)?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn document_read(&self, slug: &str, current: usize, total: usize) {
        self.spinner
            .set_message(format!("Extracting [{current}/{total}] {slug}"));
    }

    fn file_written(&self, path: &Path, current: usize, total: usize) {
        self.spinner
            .set_message(format!("Writing [{current}/{total}] {}", path.display()));
    }

    fn done(&self, _result: &BuildResult) {
        self.spinner.finish_and_clear();
    }
}
