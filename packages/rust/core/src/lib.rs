//! Pipelines behind the `crawl` and `regen` commands.

pub mod pipeline;
pub mod regen;

pub use pipeline::{CrawlRunResult, ProgressReporter, SilentProgress, crawl};
pub use regen::{PREVIEW_LINES, RegenResult, regenerate};
