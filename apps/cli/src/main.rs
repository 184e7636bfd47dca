//! linkshowcase CLI: turn a sitemap tree into a browsable Markdown link
//! showcase, and keep that showcase's own `sitemap.xml` current.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
