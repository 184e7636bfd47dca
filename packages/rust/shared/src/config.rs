//! Application configuration for linkshowcase.
//!
//! The config file is looked up at `--config`, then `./linkshowcase.toml`,
//! then `~/.linkshowcase/linkshowcase.toml`. CLI flags override config file
//! values, which override defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{LinkShowcaseError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "linkshowcase.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".linkshowcase";

/// Namespace of `<urlset>` / `<sitemapindex>` documents.
pub const SITEMAP_NAMESPACE: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

// ---------------------------------------------------------------------------
// Config structs (matching linkshowcase.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Crawler settings.
    #[serde(default)]
    pub crawl: CrawlSection,

    /// Branding used in the generated Markdown.
    #[serde(default)]
    pub site: SiteConfig,

    /// Sitemap regenerator settings.
    #[serde(default)]
    pub regen: RegenSection,
}

/// `[crawl]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlSection {
    /// Root sitemap to start from.
    #[serde(default = "default_sitemap_url")]
    pub sitemap_url: String,

    /// Directory receiving the index and the lists subdirectory.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// Subdirectory (under `output_dir`) for batch files.
    #[serde(default = "default_lists_subdir")]
    pub lists_subdir: String,

    /// File name of the index document.
    #[serde(default = "default_index_filename")]
    pub index_filename: String,

    /// URLs per batch file.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Per-request timeout.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Deepest sitemap nesting level that is still fetched.
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

impl Default for CrawlSection {
    fn default() -> Self {
        Self {
            sitemap_url: default_sitemap_url(),
            output_dir: default_output_dir(),
            lists_subdir: default_lists_subdir(),
            index_filename: default_index_filename(),
            batch_size: default_batch_size(),
            timeout_secs: default_timeout_secs(),
            max_depth: default_max_depth(),
        }
    }
}

fn default_sitemap_url() -> String {
    "https://www.example.com/sitemap.xml".into()
}
fn default_output_dir() -> String {
    "link-showcase".into()
}
fn default_lists_subdir() -> String {
    "lists".into()
}
fn default_index_filename() -> String {
    "README.md".into()
}
fn default_batch_size() -> usize {
    75
}
fn default_timeout_secs() -> u64 {
    10
}
fn default_max_depth() -> usize {
    16
}

/// `[site]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Display name used in titles.
    #[serde(default = "default_site_name")]
    pub name: String,

    /// Bare domain used as link text.
    #[serde(default = "default_site_domain")]
    pub domain: String,

    /// Homepage URL.
    #[serde(default = "default_site_homepage")]
    pub homepage: String,

    /// Welcome paragraph for the index. A placeholder is emitted when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            name: default_site_name(),
            domain: default_site_domain(),
            homepage: default_site_homepage(),
            description: None,
        }
    }
}

fn default_site_name() -> String {
    "Example Site".into()
}
fn default_site_domain() -> String {
    "example.com".into()
}
fn default_site_homepage() -> String {
    "https://www.example.com/".into()
}

/// `[regen]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegenSection {
    /// Public URL the batch files are served under.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Directory of batch files, also used as the URL path segment.
    #[serde(default = "default_lists_dir")]
    pub lists_dir: String,

    /// Where the sitemap is written.
    #[serde(default = "default_output_path")]
    pub output_path: String,
}

impl Default for RegenSection {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            lists_dir: default_lists_dir(),
            output_path: default_output_path(),
        }
    }
}

fn default_base_url() -> String {
    "https://example.github.io/link-showcase".into()
}
fn default_lists_dir() -> String {
    "lists".into()
}
fn default_output_path() -> String {
    "sitemap.xml".into()
}

// ---------------------------------------------------------------------------
// Runtime configs (merged from config + CLI flags, validated)
// ---------------------------------------------------------------------------

/// Runtime crawl configuration.
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    pub sitemap_url: Url,
    pub output_dir: PathBuf,
    pub lists_subdir: String,
    pub index_filename: String,
    pub batch_size: usize,
    pub timeout: Duration,
    pub max_depth: usize,
    pub site: SiteConfig,
}

impl CrawlConfig {
    /// Build and validate from the file config.
    pub fn from_app(config: &AppConfig) -> Result<Self> {
        let crawl = &config.crawl;

        let sitemap_url = Url::parse(&crawl.sitemap_url).map_err(|e| {
            LinkShowcaseError::config(format!("invalid sitemap_url '{}': {e}", crawl.sitemap_url))
        })?;

        if crawl.batch_size == 0 {
            return Err(LinkShowcaseError::config("batch_size must be at least 1"));
        }
        if crawl.timeout_secs == 0 {
            return Err(LinkShowcaseError::config("timeout_secs must be at least 1"));
        }
        if crawl.lists_subdir.trim().is_empty() || crawl.index_filename.trim().is_empty() {
            return Err(LinkShowcaseError::config(
                "lists_subdir and index_filename must not be empty",
            ));
        }
        // Batch files link back to the index by climbing one level per segment.
        if crawl.lists_subdir.split(['/', '\\']).any(|part| part == "..")
            || Path::new(&crawl.lists_subdir).is_absolute()
        {
            return Err(LinkShowcaseError::config(format!(
                "lists_subdir '{}' must be a relative path inside output_dir",
                crawl.lists_subdir
            )));
        }

        Ok(Self {
            sitemap_url,
            output_dir: PathBuf::from(&crawl.output_dir),
            lists_subdir: crawl.lists_subdir.clone(),
            index_filename: crawl.index_filename.clone(),
            batch_size: crawl.batch_size,
            timeout: Duration::from_secs(crawl.timeout_secs),
            max_depth: crawl.max_depth,
            site: config.site.clone(),
        })
    }
}

/// Runtime regenerator configuration.
#[derive(Debug, Clone)]
pub struct RegenConfig {
    /// Base URL without trailing slash.
    pub base_url: String,
    pub lists_dir: PathBuf,
    /// `lists_dir` as a `/`-separated URL path segment.
    pub url_segment: String,
    pub output_path: PathBuf,
}

impl RegenConfig {
    /// Build and validate from the file config.
    pub fn from_app(config: &AppConfig) -> Result<Self> {
        let regen = &config.regen;

        Url::parse(&regen.base_url).map_err(|e| {
            LinkShowcaseError::config(format!("invalid base_url '{}': {e}", regen.base_url))
        })?;

        Ok(Self {
            base_url: regen.base_url.trim_end_matches('/').to_string(),
            lists_dir: PathBuf::from(&regen.lists_dir),
            url_segment: regen.lists_dir.replace('\\', "/").trim_matches('/').to_string(),
            output_path: PathBuf::from(&regen.output_path),
        })
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.linkshowcase/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| LinkShowcaseError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the user config file (`~/.linkshowcase/linkshowcase.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config.
///
/// An explicit path must exist. Otherwise the working directory is checked
/// first, then the user config; defaults are returned if neither exists.
pub fn load_config(explicit: Option<&Path>) -> Result<AppConfig> {
    if let Some(path) = explicit {
        return load_config_from(path);
    }

    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.exists() {
        return load_config_from(&local);
    }

    let path = config_file_path()?;
    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| LinkShowcaseError::io(path, e))?;

    toml::from_str(&content).map_err(|e| {
        LinkShowcaseError::config(format!("failed to parse {}: {e}", path.display()))
    })
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| LinkShowcaseError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| LinkShowcaseError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| LinkShowcaseError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("sitemap_url"));
        assert!(toml_str.contains("batch_size = 75"));
        assert!(!toml_str.contains("description"));
    }

    #[test]
    fn config_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.crawl.batch_size, 75);
        assert_eq!(parsed.crawl.timeout_secs, 10);
        assert_eq!(parsed.regen.lists_dir, "lists");
    }

    #[test]
    fn partial_config_fills_defaults() {
        let toml_str = r#"
[crawl]
sitemap_url = "https://shop.example.org/sitemap_index.xml"
batch_size = 50

[site]
name = "Shop"
description = "Everything we sell."
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.crawl.batch_size, 50);
        assert_eq!(config.crawl.lists_subdir, "lists");
        assert_eq!(config.site.name, "Shop");
        assert_eq!(config.site.domain, "example.com");
        assert_eq!(config.site.description.as_deref(), Some("Everything we sell."));
        assert_eq!(config.regen.output_path, "sitemap.xml");
    }

    #[test]
    fn crawl_config_from_app_config() {
        let app = AppConfig::default();
        let crawl = CrawlConfig::from_app(&app).unwrap();
        assert_eq!(crawl.batch_size, 75);
        assert_eq!(crawl.timeout, Duration::from_secs(10));
        assert_eq!(crawl.sitemap_url.as_str(), "https://www.example.com/sitemap.xml");
        assert_eq!(crawl.output_dir, PathBuf::from("link-showcase"));
    }

    #[test]
    fn crawl_config_rejects_zero_batch_size() {
        let mut app = AppConfig::default();
        app.crawl.batch_size = 0;
        let err = CrawlConfig::from_app(&app).unwrap_err();
        assert!(err.to_string().contains("batch_size"));
    }

    #[test]
    fn crawl_config_rejects_lists_outside_output() {
        for subdir in ["../lists", "pages/../../lists", "..\\lists"] {
            let mut app = AppConfig::default();
            app.crawl.lists_subdir = subdir.into();
            let err = CrawlConfig::from_app(&app).unwrap_err();
            assert!(err.to_string().contains("lists_subdir"), "{subdir}: {err}");
        }

        let mut app = AppConfig::default();
        app.crawl.lists_subdir = "./pages/lists".into();
        assert!(CrawlConfig::from_app(&app).is_ok());
    }

    #[test]
    fn crawl_config_rejects_bad_url() {
        let mut app = AppConfig::default();
        app.crawl.sitemap_url = "not a url".into();
        assert!(CrawlConfig::from_app(&app).is_err());
    }

    #[test]
    fn regen_config_strips_trailing_slash() {
        let mut app = AppConfig::default();
        app.regen.base_url = "https://example.github.io/links/".into();
        let regen = RegenConfig::from_app(&app).unwrap();
        assert_eq!(regen.base_url, "https://example.github.io/links");
        assert_eq!(regen.output_path, PathBuf::from("sitemap.xml"));
        assert_eq!(regen.url_segment, "lists");
    }

    #[test]
    fn regen_segment_uses_forward_slashes() {
        let mut app = AppConfig::default();
        app.regen.lists_dir = "site\\lists\\".into();
        let regen = RegenConfig::from_app(&app).unwrap();
        assert_eq!(regen.url_segment, "site/lists");
    }

    #[test]
    fn load_missing_explicit_path_fails() {
        let path = std::env::temp_dir().join(format!("ls-missing-{}.toml", uuid::Uuid::now_v7()));
        let err = load_config(Some(&path)).unwrap_err();
        assert!(matches!(err, LinkShowcaseError::Io { .. }));
    }

    #[test]
    fn load_invalid_toml_is_config_error() {
        let path = std::env::temp_dir().join(format!("ls-bad-{}.toml", uuid::Uuid::now_v7()));
        std::fs::write(&path, "[crawl\nbatch_size = ").unwrap();
        let err = load_config_from(&path).unwrap_err();
        assert!(err.to_string().starts_with("config error"));
        std::fs::remove_file(&path).ok();
    }
}
