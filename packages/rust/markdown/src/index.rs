//! The top-level index page linking every batch.

use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use tracing::{info, instrument};

use linkshowcase_shared::{BatchLink, Result, SiteConfig, write_atomic};

/// Everything the index page is rendered from.
#[derive(Debug, Clone)]
pub struct IndexPage<'a> {
    pub site: &'a SiteConfig,
    /// The root sitemap the links were collected from.
    pub source_sitemap: &'a str,
    pub generated_at: NaiveDateTime,
    pub batches: &'a [BatchLink],
}

/// Render the index page as Markdown.
pub fn render_index(page: &IndexPage<'_>) -> String {
    let site = page.site;
    let mut md = String::with_capacity(2048 + page.batches.len() * 48);

    md.push_str(&format!("# {} - Curated Link Showcase\n\n", site.name));
    md.push_str(&format!(
        "**Last Updated:** {}\n",
        page.generated_at.format("%Y-%m-%d %H:%M:%S")
    ));
    md.push_str(&format!(
        "**Source Sitemap:** [{src}]({src})\n\n",
        src = page.source_sitemap
    ));

    md.push_str("## Welcome!\n\n");
    match site.description.as_deref() {
        Some(description) => {
            md.push_str(&format!("{}\n\n", description.trim()));
        }
        None => {
            md.push_str(&format!(
                "This repository organizes key pages and resources from [{}]({}), presented in \
                 manageable batches to aid in discovery and navigation. Our platform, {}, is \
                 dedicated to [Your Site's Main Purpose]. We offer [Briefly describe services] \
                 to help you connect.\n\n",
                site.domain, site.homepage, site.name
            ));
            md.push_str("Please replace the placeholder text above with your detailed website description!\n\n");
        }
    }

    md.push_str("## Explore Our Link Collections\n\n");
    md.push_str("Below is a directory of Markdown files, each containing a batch of URLs from our website:\n\n");
    if page.batches.is_empty() {
        md.push_str("No link batches were generated.\n");
    } else {
        for link in page.batches {
            md.push_str(&format!("- [{}]({})\n", link.label, link.path));
        }
    }

    md.push_str("\n## About This Repository\n\n");
    md.push_str(&format!(
        "This collection is provided to enhance the visibility and accessibility of content from \
         {}. It can be useful for archival purposes and for search engines to better understand \
         our site structure.\n\n",
        site.domain
    ));

    md.push_str("---\n\n");
    md.push_str(&format!(
        "For the complete and most up-to-date experience, please visit our main website: **[{}]({})**\n",
        site.domain, site.homepage
    ));

    md
}

/// Render and write the index into `output_dir`, returning its path.
#[instrument(skip_all, fields(batches = page.batches.len()))]
pub fn write_index(output_dir: &Path, filename: &str, page: &IndexPage<'_>) -> Result<PathBuf> {
    let path = output_dir.join(filename);
    write_atomic(&path, &render_index(page))?;
    info!(path = %path.display(), "index written");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn generated_at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, 14)
            .unwrap()
            .and_hms_opt(9, 26, 53)
            .unwrap()
    }

    fn links() -> Vec<BatchLink> {
        vec![
            BatchLink {
                label: "Link Batch 001".into(),
                path: "lists/list-001.md".into(),
            },
            BatchLink {
                label: "Link Batch 002".into(),
                path: "lists/list-002.md".into(),
            },
        ]
    }

    #[test]
    fn index_has_header_links_and_footer() {
        let site = SiteConfig::default();
        let batches = links();
        let md = render_index(&IndexPage {
            site: &site,
            source_sitemap: "https://www.example.com/sitemap.xml",
            generated_at: generated_at(),
            batches: &batches,
        });

        assert!(md.starts_with("# Example Site - Curated Link Showcase\n\n"));
        assert!(md.contains("**Last Updated:** 2026-03-14 09:26:53\n"));
        assert!(md.contains(
            "**Source Sitemap:** [https://www.example.com/sitemap.xml](https://www.example.com/sitemap.xml)"
        ));
        assert!(md.contains("Please replace the placeholder text"));

        let first = md.find("- [Link Batch 001](lists/list-001.md)").unwrap();
        let second = md.find("- [Link Batch 002](lists/list-002.md)").unwrap();
        assert!(first < second);

        assert!(md.contains("\n---\n\n"));
        assert!(md.trim_end().ends_with("**[example.com](https://www.example.com/)**"));
    }

    #[test]
    fn configured_description_replaces_placeholder() {
        let site = SiteConfig {
            description: Some("Hand-picked recipes from our kitchen.".into()),
            ..SiteConfig::default()
        };
        let md = render_index(&IndexPage {
            site: &site,
            source_sitemap: "https://www.example.com/sitemap.xml",
            generated_at: generated_at(),
            batches: &[],
        });

        assert!(md.contains("## Welcome!\n\nHand-picked recipes from our kitchen.\n"));
        assert!(!md.contains("placeholder"));
        assert!(md.contains("No link batches were generated."));
    }

    #[test]
    fn write_index_to_missing_dir_fails() {
        let dir = std::env::temp_dir().join(format!("ls-index-missing-{}", uuid::Uuid::now_v7()));
        let site = SiteConfig::default();
        let result = write_index(
            &dir,
            "README.md",
            &IndexPage {
                site: &site,
                source_sitemap: "https://www.example.com/sitemap.xml",
                generated_at: generated_at(),
                batches: &[],
            },
        );
        assert!(result.is_err());
    }
}
