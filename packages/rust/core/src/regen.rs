//! `regen` pipeline: lists directory → sitemap entries → `sitemap.xml`.

use std::path::PathBuf;

use chrono::Local;
use tracing::{error, info, instrument, warn};

use linkshowcase_shared::RegenConfig;
use linkshowcase_sitemap::{collect_entries, preview, render_xml, write_sitemap};

/// Lines of the written sitemap echoed back after a successful run.
pub const PREVIEW_LINES: usize = 15;

/// Result of the `regen` pipeline.
#[derive(Debug)]
pub struct RegenResult {
    /// Entries in the generated sitemap, root included.
    pub entry_count: usize,
    pub output_path: PathBuf,
    /// Whether the sitemap reached disk. Write failures are logged, not returned.
    pub written: bool,
    /// Leading lines of the written file; empty when nothing was written.
    pub preview: Vec<String>,
}

/// Regenerate the sitemap for the configured lists directory.
#[instrument(skip_all, fields(lists_dir = %config.lists_dir.display(), out = %config.output_path.display()))]
pub fn regenerate(config: &RegenConfig) -> RegenResult {
    let entries = collect_entries(config, Local::now().date_naive());
    let xml = render_xml(&entries);

    let written = match write_sitemap(&config.output_path, &xml) {
        Ok(()) => {
            info!(entries = entries.len(), "sitemap updated");
            true
        }
        Err(e) => {
            error!(error = %e, "error writing sitemap");
            false
        }
    };

    let preview = if written {
        preview(&config.output_path, PREVIEW_LINES).unwrap_or_else(|e| {
            warn!(error = %e, "could not read sitemap back for preview");
            Vec::new()
        })
    } else {
        Vec::new()
    };

    RegenResult {
        entry_count: entries.len(),
        output_path: config.output_path.clone(),
        written,
        preview,
    }
}
