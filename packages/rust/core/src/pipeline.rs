//! End-to-end `crawl` pipeline: sitemap tree → sorted URLs → batch files → index.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use chrono::Local;
use tracing::{info, instrument, warn};

use linkshowcase_discovery::{ResolveOptions, SitemapFailure, SitemapResolver};
use linkshowcase_markdown::{BatchLayout, IndexPage, write_batches, write_index};
use linkshowcase_shared::{CrawlConfig, Result};

/// Result of the `crawl` pipeline.
#[derive(Debug)]
pub struct CrawlRunResult {
    /// Unique leaf URLs found.
    pub url_count: usize,
    /// Distinct sitemaps fetched.
    pub sitemap_count: usize,
    /// Batch files written.
    pub batch_count: usize,
    /// Path of the index, `None` when there was nothing to index.
    pub index_path: Option<PathBuf>,
    /// Output root.
    pub output_dir: PathBuf,
    /// Sitemap branches that were abandoned.
    pub failures: Vec<SitemapFailure>,
    /// Total elapsed time.
    pub elapsed: Duration,
}

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called after each batch file is written.
    fn batch_written(&self, path: &str, current: usize, total: usize);
    /// Called when the crawl pipeline completes.
    fn done(&self, result: &CrawlRunResult);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn batch_written(&self, _path: &str, _current: usize, _total: usize) {}
    fn done(&self, _result: &CrawlRunResult) {}
}

/// Run the full `crawl` pipeline.
///
/// 1. Resolve the sitemap tree into a sorted set of leaf URLs
/// 2. Write one Markdown file per batch
/// 3. Write the index linking every batch
///
/// Network and XML problems only drop the affected branch. File-system errors
/// abort the run.
#[instrument(skip_all, fields(sitemap = %config.sitemap_url, out = %config.output_dir.display()))]
pub async fn crawl(config: &CrawlConfig, progress: &dyn ProgressReporter) -> Result<CrawlRunResult> {
    let start = Instant::now();

    // --- Phase 1: Resolve ---
    progress.phase("Resolving sitemap tree");
    let resolver = SitemapResolver::new(ResolveOptions {
        timeout: config.timeout,
        max_depth: config.max_depth,
    })?;
    let report = resolver.resolve(config.sitemap_url.as_str()).await;

    if !report.failures.is_empty() {
        warn!(failures = report.failures.len(), "some sitemap branches were skipped");
    }

    let sorted: Vec<String> = report.urls.into_iter().collect();
    info!(urls = sorted.len(), "extraction complete");

    let mut result = CrawlRunResult {
        url_count: sorted.len(),
        sitemap_count: report.processed.len(),
        batch_count: 0,
        index_path: None,
        output_dir: config.output_dir.clone(),
        failures: report.failures,
        elapsed: Duration::ZERO,
    };

    if sorted.is_empty() {
        warn!("no URLs were extracted, halting further processing");
        result.elapsed = start.elapsed();
        progress.done(&result);
        return Ok(result);
    }

    // --- Phase 2: Batches ---
    progress.phase("Writing batch files");
    let layout = BatchLayout {
        output_dir: &config.output_dir,
        lists_subdir: &config.lists_subdir,
        index_filename: &config.index_filename,
    };
    let links = write_batches(
        &sorted,
        config.batch_size,
        &layout,
        &config.site,
        |path, current, total| {
            progress.batch_written(&path.display().to_string(), current, total);
        },
    )?;
    result.batch_count = links.len();

    // --- Phase 3: Index ---
    progress.phase("Writing index");
    let index_path = write_index(
        &config.output_dir,
        &config.index_filename,
        &IndexPage {
            site: &config.site,
            source_sitemap: config.sitemap_url.as_str(),
            generated_at: Local::now().naive_local(),
            batches: &links,
        },
    )?;
    result.index_path = Some(index_path);
    result.elapsed = start.elapsed();

    info!(
        urls = result.url_count,
        sitemaps = result.sitemap_count,
        batches = result.batch_count,
        elapsed_ms = result.elapsed.as_millis(),
        "crawl pipeline complete"
    );

    progress.done(&result);
    Ok(result)
}
