//! Error types for linkshowcase.
//!
//! Every library crate returns [`Result`]; only the CLI converts into
//! `color_eyre::Report`.

use std::path::PathBuf;

/// Errors raised by the crawl and regen pipelines.
#[derive(Debug, thiserror::Error)]
pub enum LinkShowcaseError {
    /// Bad or unreadable configuration.
    #[error("config error: {message}")]
    Config { message: String },

    /// Network/HTTP error while fetching a sitemap.
    #[error("network error: {0}")]
    Network(String),

    /// XML parsing error.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// A file or directory under the output tree could not be written or read.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Invalid input (zero batch size, malformed URL, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, LinkShowcaseError>;

impl LinkShowcaseError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
            message: msg.into(),
        }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Network failure for one URL, rendered as `<url>: <detail>`.
    pub fn network(url: &str, detail: impl std::fmt::Display) -> Self {
        Self::Network(format!("{url}: {detail}"))
    }

    /// Attach the offending path to an I/O error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
