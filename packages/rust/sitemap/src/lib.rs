//! Sitemap regeneration from a directory of published batch files.
//!
//! # Output format
//!
//! ```xml
//! <?xml version="1.0" encoding="UTF-8"?>
//! <urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
//!   <url>
//!     <loc>https://example.github.io/link-showcase/</loc>
//!     <lastmod>2026-01-01</lastmod>
//!     <changefreq>weekly</changefreq>
//!     <priority>1.0</priority>
//!   </url>
//!   <url>
//!     <loc>https://example.github.io/link-showcase/lists/list-001.md</loc>
//!     ...
//!   </url>
//! </urlset>
//! ```

use std::borrow::Cow;
use std::io::{BufRead, BufReader};
use std::path::Path;

use chrono::{DateTime, Local, NaiveDate};
use tracing::{debug, instrument, warn};

use linkshowcase_shared::{
    ChangeFrequency, LinkShowcaseError, RegenConfig, Result, SITEMAP_NAMESPACE, SitemapEntry,
    write_atomic,
};

/// Extension of the files listed in the sitemap.
const DOCUMENT_EXTENSION: &str = ".md";

const ROOT_PRIORITY: f32 = 1.0;
const DOCUMENT_PRIORITY: f32 = 0.8;

/// Build the root entry plus one entry per Markdown file in `config.lists_dir`.
///
/// A missing directory is logged and yields only the root entry.
#[instrument(skip_all, fields(lists_dir = %config.lists_dir.display()))]
pub fn collect_entries(config: &RegenConfig, today: NaiveDate) -> Vec<SitemapEntry> {
    let mut entries = vec![SitemapEntry {
        loc: format!("{}/", config.base_url),
        lastmod: today,
        changefreq: ChangeFrequency::Weekly,
        priority: ROOT_PRIORITY,
    }];

    if !config.lists_dir.is_dir() {
        warn!(dir = %config.lists_dir.display(), "lists directory not found");
        return entries;
    }

    let files = match list_documents(&config.lists_dir) {
        Ok(files) => files,
        Err(e) => {
            warn!(error = %e, "could not read lists directory");
            return entries;
        }
    };

    for name in files {
        let path = config.lists_dir.join(&name);
        let lastmod = lastmod_for(&path, today);

        entries.push(SitemapEntry {
            loc: format!("{}/{}/{name}", config.base_url, config.url_segment).replace('\\', "/"),
            lastmod,
            changefreq: ChangeFrequency::Monthly,
            priority: DOCUMENT_PRIORITY,
        });
    }

    debug!(entries = entries.len(), "sitemap entries collected");
    entries
}

/// File names ending in `.md` directly inside `dir`, sorted.
fn list_documents(dir: &Path) -> Result<Vec<String>> {
    let read = std::fs::read_dir(dir).map_err(|e| LinkShowcaseError::io(dir, e))?;

    let mut names: Vec<String> = read
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().is_file())
        .filter_map(|entry| match entry.file_name().into_string() {
            Ok(name) => Some(name),
            Err(raw) => {
                debug!(name = ?raw, "skipping non-UTF-8 file name");
                None
            }
        })
        .filter(|name| name.ends_with(DOCUMENT_EXTENSION))
        .collect();
    names.sort();

    Ok(names)
}

/// `lastmod` for a file: its modification date, or `today` when that can't be read.
fn lastmod_for(path: &Path, today: NaiveDate) -> NaiveDate {
    modified_date(path).unwrap_or_else(|| {
        debug!(path = %path.display(), "mtime unavailable, using today");
        today
    })
}

/// Local calendar date of a file's last modification.
fn modified_date(path: &Path) -> Option<NaiveDate> {
    let modified = std::fs::metadata(path).and_then(|m| m.modified()).ok()?;
    Some(DateTime::<Local>::from(modified).date_naive())
}

/// Render entries as a sitemaps.org `<urlset>` document.
pub fn render_xml(entries: &[SitemapEntry]) -> String {
    let mut xml = String::with_capacity(256 + entries.len() * 160);

    xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    xml.push_str("<urlset xmlns=\"");
    xml.push_str(SITEMAP_NAMESPACE);
    xml.push_str("\">\n");

    for entry in entries {
        xml.push_str("  <url>\n    <loc>");
        xml.push_str(&escape_xml(&entry.loc));
        xml.push_str("</loc>\n    <lastmod>");
        xml.push_str(&entry.lastmod.format("%Y-%m-%d").to_string());
        xml.push_str("</lastmod>\n    <changefreq>");
        xml.push_str(entry.changefreq.as_str());
        xml.push_str("</changefreq>\n    <priority>");
        xml.push_str(&format!("{:.1}", entry.priority));
        xml.push_str("</priority>\n  </url>\n");
    }

    xml.push_str("</urlset>\n");
    xml
}

/// Write the sitemap atomically.
pub fn write_sitemap(path: &Path, xml: &str) -> Result<()> {
    write_atomic(path, xml)
}

/// First `limit` lines of a written file.
pub fn preview(path: &Path, limit: usize) -> Result<Vec<String>> {
    let file = std::fs::File::open(path).map_err(|e| LinkShowcaseError::io(path, e))?;
    BufReader::new(file)
        .lines()
        .take(limit)
        .collect::<std::io::Result<Vec<_>>>()
        .map_err(|e| LinkShowcaseError::io(path, e))
}

/// Escape special XML characters.
fn escape_xml(s: &str) -> Cow<'_, str> {
    if !s.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(s);
    }

    Cow::Owned(
        s.replace('&', "&amp;")
            .replace('<', "&lt;")
            .replace('>', "&gt;")
            .replace('"', "&quot;")
            .replace('\'', "&apos;"),
    )
}
