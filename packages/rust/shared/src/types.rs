//! Core domain types shared by the crawler and the regenerator.

use std::collections::{BTreeSet, HashSet};
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Unique leaf URLs discovered during traversal. Iterates in lexicographic order.
pub type UrlSet = BTreeSet<String>;

/// Sitemap locations already fetched during a single run.
pub type ProcessedSet = HashSet<String>;

// ---------------------------------------------------------------------------
// Batch
// ---------------------------------------------------------------------------

/// A contiguous, 1-based numbered slice of the sorted URL sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    /// Sequential identifier, starting at 1.
    pub number: usize,
    /// URLs in this batch, in sorted order.
    pub urls: Vec<String>,
}

impl Batch {
    /// File name for this batch, e.g. `list-007.md`.
    pub fn file_name(&self) -> String {
        format!("list-{:03}.md", self.number)
    }

    /// Human-readable label, e.g. `Link Batch 007`.
    pub fn label(&self) -> String {
        format!("Link Batch {:03}", self.number)
    }
}

/// A `(label, relative path)` pair linking the index to one batch file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchLink {
    pub label: String,
    /// Path relative to the output root, always `/`-separated.
    pub path: String,
}

// ---------------------------------------------------------------------------
// Sitemap entries
// ---------------------------------------------------------------------------

/// The `<changefreq>` values defined by the sitemaps.org protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeFrequency {
    Always,
    Hourly,
    Daily,
    Weekly,
    Monthly,
    Yearly,
    Never,
}

impl ChangeFrequency {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Always => "always",
            Self::Hourly => "hourly",
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
            Self::Never => "never",
        }
    }
}

impl fmt::Display for ChangeFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One `<url>` element of a generated sitemap.
#[derive(Debug, Clone, PartialEq)]
pub struct SitemapEntry {
    pub loc: String,
    pub lastmod: NaiveDate,
    pub changefreq: ChangeFrequency,
    pub priority: f32,
}
