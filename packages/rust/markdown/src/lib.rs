//! Markdown output for the crawler: numbered batch files and the index page.
//!
//! Batch files live in `<output>/<lists-subdir>/list-NNN.md`; the index sits
//! in `<output>/` and links to every batch by a `/`-separated relative path.

mod batches;
mod index;

pub use batches::{BatchLayout, plan_batches, render_batch, write_batches};
pub use index::{IndexPage, render_index, write_index};

/// Link text for a URL: everything after the last `//`.
///
/// `https://www.example.com/a` becomes `www.example.com/a`. A URL without
/// `//` is returned unchanged.
pub fn display_label(url: &str) -> &str {
    url.rsplit("//").next().unwrap_or(url)
}
