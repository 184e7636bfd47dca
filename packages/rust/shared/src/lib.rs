//! Shared types, error model, and configuration for linkshowcase.
//!
//! This crate is the foundation depended on by all other linkshowcase crates.
//! It provides:
//! - [`LinkShowcaseError`]: the unified error type
//! - Domain types ([`Batch`], [`BatchLink`], [`SitemapEntry`], [`ChangeFrequency`])
//! - Configuration ([`AppConfig`], [`CrawlConfig`], [`RegenConfig`], config loading)
//! - [`write_atomic`] for temp-then-rename file output

pub mod config;
pub mod error;
pub mod fs;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, CrawlConfig, CrawlSection, RegenConfig, RegenSection, SITEMAP_NAMESPACE,
    SiteConfig, config_dir, config_file_path, init_config, load_config, load_config_from,
};
pub use error::{LinkShowcaseError, Result};
pub use fs::write_atomic;
pub use types::{Batch, BatchLink, ChangeFrequency, ProcessedSet, SitemapEntry, UrlSet};
