//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::Result;
use indicatif::{ProgressBar, ProgressStyle};
use linkshowcase_core::{CrawlRunResult, PREVIEW_LINES, ProgressReporter};
use linkshowcase_shared::{AppConfig, CrawlConfig, RegenConfig, init_config, load_config};
use tracing::info;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// linkshowcase: sitemap tree in, Markdown link showcase out.
#[derive(Parser)]
#[command(
    name = "linkshowcase",
    version,
    about = "Crawl a sitemap tree into batched Markdown link lists and regenerate their sitemap.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file to use instead of the default lookup.
    #[arg(long, global = true, env = "LINKSHOWCASE_CONFIG")]
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
    /// Resolve a sitemap tree and write batched link lists plus an index.
    Crawl {
        /// Root sitemap URL.
        #[arg(long)]
        sitemap: Option<String>,

        /// Output directory.
        #[arg(short, long)]
        out: Option<String>,

        /// URLs per batch file.
        #[arg(long)]
        batch_size: Option<usize>,
    },

    /// Rebuild `sitemap.xml` from the Markdown files in the lists directory.
    Regen {
        /// Public URL the showcase is served from.
        #[arg(long)]
        base_url: Option<String>,

        /// Directory holding the batch files.
        #[arg(long)]
        lists_dir: Option<String>,

        /// Sitemap file to write.
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
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
        0 => "linkshowcase=info",
        1 => "linkshowcase=debug",
        _ => "linkshowcase=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt().with_env_filter(env_filter).with_target(false).init();
        }
        LogFormat::Json => {
            fmt().json().with_env_filter(env_filter).init();
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
        Command::Crawl {
            sitemap,
            out,
            batch_size,
        } => {
            let mut config = load_config(config_path)?;
            apply_crawl_overrides(&mut config, sitemap, out, batch_size);
            cmd_crawl(&config).await
        }
        Command::Regen {
            base_url,
            lists_dir,
            output,
        } => {
            let mut config = load_config(config_path)?;
            apply_regen_overrides(&mut config, base_url, lists_dir, output);
            cmd_regen(&config)
        }
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(config_path),
        },
    }
}

fn apply_crawl_overrides(
    config: &mut AppConfig,
    sitemap: Option<String>,
    out: Option<String>,
    batch_size: Option<usize>,
) {
    if let Some(url) = sitemap {
        config.crawl.sitemap_url = url;
    }
    if let Some(dir) = out {
        config.crawl.output_dir = dir;
    }
    if let Some(size) = batch_size {
        config.crawl.batch_size = size;
    }
}

fn apply_regen_overrides(
    config: &mut AppConfig,
    base_url: Option<String>,
    lists_dir: Option<String>,
    output: Option<String>,
) {
    if let Some(url) = base_url {
        config.regen.base_url = url;
    }
    if let Some(dir) = lists_dir {
        config.regen.lists_dir = dir;
    }
    if let Some(path) = output {
        config.regen.output_path = path;
    }
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_crawl(config: &AppConfig) -> Result<()> {
    let crawl_config = CrawlConfig::from_app(config)?;

    println!(
        "Output directory structure will be created in: {}",
        display_abs(&crawl_config.output_dir)
    );
    info!(sitemap = %crawl_config.sitemap_url, "starting extraction");

    let reporter = CliProgress::new();
    let result = linkshowcase_core::crawl(&crawl_config, &reporter).await?;

    println!();
    println!("  Unique URLs found:  {}", result.url_count);
    println!("  Sitemaps processed: {}", result.sitemap_count);
    if !result.failures.is_empty() {
        println!("  Sitemaps skipped:   {}", result.failures.len());
        for failure in &result.failures {
            println!("    - {} ({:?}): {}", failure.sitemap_url, failure.kind, failure.message);
        }
    }

    let Some(index_path) = &result.index_path else {
        println!();
        println!("  No URLs were extracted. Nothing was written.");
        println!();
        return Ok(());
    };

    println!("  Batch files:        {}", result.batch_count);
    println!("  Index:              {}", index_path.display());
    println!("  Output:             {}", display_abs(&result.output_dir));
    println!("  Time:               {:.1}s", result.elapsed.as_secs_f64());
    println!();
    print_next_steps(&crawl_config);

    Ok(())
}

fn print_next_steps(config: &CrawlConfig) {
    let out = config.output_dir.display();
    let index = &config.index_filename;
    let lists = &config.lists_subdir;

    println!("Next steps for publishing:");
    println!("  1. Review the generated files in '{out}'.");
    println!("  2. Customize {index}, especially the 'Welcome!' section, with a description of the site.");
    println!("  3. Create a new public repository for the showcase.");
    println!("  4. Upload the contents of '{out}' (including {index} and '{lists}/') to it.");
    println!("  5. Enable static page hosting for the repository.");
    println!("  6. Run `linkshowcase regen` there and submit the published sitemap to search consoles.");
    println!();
}

fn cmd_regen(config: &AppConfig) -> Result<()> {
    let regen_config = RegenConfig::from_app(config)?;
    let result = linkshowcase_core::regenerate(&regen_config);

    if !result.written {
        // Already logged as an error; the run itself still succeeds.
        return Ok(());
    }

    println!(
        "{} has been successfully updated ({} entries).",
        result.output_path.display(),
        result.entry_count
    );
    if !result.preview.is_empty() {
        println!();
        println!("First {PREVIEW_LINES} lines of generated {}:", result.output_path.display());
        for line in &result.preview {
            println!("{line}");
        }
    }

    Ok(())
}

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show(explicit: Option<&Path>) -> Result<()> {
    let config = load_config(explicit)?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

fn display_abs(path: &Path) -> String {
    std::path::absolute(path)
        .unwrap_or_else(|_| path.to_path_buf())
        .display()
        .to_string()
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
        let style = ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]);
        spinner.set_style(style);
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn batch_written(&self, path: &str, current: usize, total: usize) {
        self.spinner
            .set_message(format!("Writing [{current}/{total}] {path}"));
    }

    fn done(&self, _result: &CrawlRunResult) {
        self.spinner.finish_and_clear();
    }
}
