//! Batch planning and batch file rendering.

use std::path::Path;

use tracing::{debug, info, instrument};

use linkshowcase_shared::{Batch, BatchLink, LinkShowcaseError, Result, SiteConfig, write_atomic};

use crate::display_label;

/// Where batch files go and how they link back to the index.
#[derive(Debug, Clone)]
pub struct BatchLayout<'a> {
    /// Output root; the index lives here.
    pub output_dir: &'a Path,
    /// Subdirectory of `output_dir` holding the batch files.
    pub lists_subdir: &'a str,
    /// File name of the index document.
    pub index_filename: &'a str,
}

impl BatchLayout<'_> {
    /// Relative link from a batch file back to the index.
    pub fn index_backlink(&self) -> String {
        let depth = self
            .lists_subdir
            .split(['/', '\\'])
            .filter(|part| !part.is_empty() && *part != ".")
            .count();
        format!("{}{}", "../".repeat(depth), self.index_filename)
    }

    /// `/`-separated path of a batch file relative to the output root.
    pub fn relative_path(&self, batch: &Batch) -> String {
        format!(
            "{}/{}",
            self.lists_subdir.replace('\\', "/").trim_end_matches('/'),
            batch.file_name()
        )
    }
}

/// Split sorted URLs into consecutive batches of at most `batch_size`, numbered from 1.
pub fn plan_batches(urls: &[String], batch_size: usize) -> Result<Vec<Batch>> {
    if batch_size == 0 {
        return Err(LinkShowcaseError::validation("batch size must be at least 1"));
    }

    Ok(urls
        .chunks(batch_size)
        .enumerate()
        .map(|(i, chunk)| Batch {
            number: i + 1,
            urls: chunk.to_vec(),
        })
        .collect())
}

/// Render one batch file.
pub fn render_batch(batch: &Batch, site: &SiteConfig, index_backlink: &str) -> String {
    let mut md = String::with_capacity(128 + batch.urls.len() * 96);

    md.push_str(&format!("# {} - {}\n\n", site.name, batch.label()));
    md.push_str(&format!(
        "This file contains a curated selection of pages from [{}]({}), part of a larger collection.\n\n",
        site.domain, site.homepage
    ));
    md.push_str(&format!(
        "See the [main index]({index_backlink}) for a full list of batches.\n\n"
    ));
    md.push_str("## Links in this Batch\n\n");

    for url in &batch.urls {
        md.push_str(&format!("- [{}]({url})\n", display_label(url)));
    }

    md
}

/// Plan and write every batch file, returning the index links in order.
///
/// Zero URLs short-circuits: no directory or file is created.
#[instrument(skip_all, fields(urls = urls.len(), batch_size = batch_size))]
pub fn write_batches(
    urls: &[String],
    batch_size: usize,
    layout: &BatchLayout<'_>,
    site: &SiteConfig,
    mut on_written: impl FnMut(&Path, usize, usize),
) -> Result<Vec<BatchLink>> {
    let batches = plan_batches(urls, batch_size)?;
    if batches.is_empty() {
        debug!("no URLs to batch");
        return Ok(Vec::new());
    }

    let lists_dir = layout.output_dir.join(layout.lists_subdir);
    std::fs::create_dir_all(&lists_dir).map_err(|e| LinkShowcaseError::io(&lists_dir, e))?;

    info!(batches = batches.len(), dir = %lists_dir.display(), "writing batch files");

    let backlink = layout.index_backlink();
    let total = batches.len();
    let mut links = Vec::with_capacity(total);

    for batch in &batches {
        let path = lists_dir.join(batch.file_name());
        write_atomic(&path, &render_batch(batch, site, &backlink))?;
        debug!(path = %path.display(), urls = batch.urls.len(), "wrote batch");
        on_written(&path, batch.number, total);

        links.push(BatchLink {
            label: batch.label(),
            path: layout.relative_path(batch),
        });
    }

    Ok(links)
}
