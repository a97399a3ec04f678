//! castindex CLI: episode listing and sitemap builder.
//!
//! Reads rendered episode pages from a directory and writes paginated
//! listing pages plus a sitemap next to them.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
