//! Sitemap XML `<loc>` extraction.
//!
//! Handles both `<urlset>` and `<sitemapindex>` documents:
//! - `<loc>` elements bound to the sitemaps.org namespace are preferred
//! - if none exist, un-namespaced `<loc>` elements are used instead
//! - the text of each `<loc>` is unescaped and trimmed; empty ones are dropped

use linkshowcase_shared::{LinkShowcaseError, Result, SITEMAP_NAMESPACE};
use quick_xml::NsReader;
use quick_xml::events::Event;
use quick_xml::name::{Namespace, ResolveResult};

/// Which namespace a `<loc>` element was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LocScope {
    Sitemap,
    Bare,
}

/// A location extracted from a sitemap, classified by its suffix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    /// Ends in `.xml`: another sitemap to descend into.
    Sitemap(String),
    /// Any other target: a content URL.
    Leaf(String),
}

impl Location {
    /// Classify an already-trimmed location string.
    pub fn classify(loc: String) -> Self {
        if loc.ends_with(".xml") {
            Self::Sitemap(loc)
        } else {
            Self::Leaf(loc)
        }
    }
}

/// Extract the trimmed text of every `<loc>` in `xml`, in document order.
///
/// Fails on malformed XML: mismatched or unclosed tags, text outside the root
/// element, more than one root, or no root at all.
pub fn extract_locations(xml: &str) -> Result<Vec<String>> {
    let mut reader = NsReader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut namespaced = Vec::new();
    let mut bare = Vec::new();

    let mut depth: usize = 0;
    let mut seen_root = false;
    let mut current: Option<(LocScope, String)> = None;

    loop {
        let (resolved, event) = match reader.read_resolved_event() {
            Ok(pair) => pair,
            Err(e) => return Err(malformed(reader.error_position(), e)),
        };
        let scope = loc_scope(&resolved);

        match event {
            Event::Start(ref e) => {
                if depth == 0 {
                    if seen_root {
                        return Err(LinkShowcaseError::parse(format!(
                            "junk after document element at byte {}",
                            reader.buffer_position()
                        )));
                    }
                    seen_root = true;
                }
                depth += 1;
                if e.local_name().as_ref() == b"loc" {
                    if let Some(scope) = scope {
                        current = Some((scope, String::new()));
                    }
                }
            }
            Event::Empty(_) => {
                if depth == 0 {
                    if seen_root {
                        return Err(LinkShowcaseError::parse("junk after document element"));
                    }
                    seen_root = true;
                }
            }
            Event::Text(ref e) => {
                let text = e
                    .unescape()
                    .map_err(|err| malformed(reader.buffer_position(), err))?;
                if depth == 0 {
                    return Err(LinkShowcaseError::parse(format!(
                        "text outside of the document element at byte {}",
                        reader.buffer_position()
                    )));
                }
                if let Some((_, buf)) = current.as_mut() {
                    buf.push_str(&text);
                }
            }
            Event::CData(e) => {
                if let Some((_, buf)) = current.as_mut() {
                    buf.push_str(&String::from_utf8_lossy(&e.into_inner()));
                }
            }
            Event::End(ref e) => {
                depth = depth.saturating_sub(1);
                if e.local_name().as_ref() == b"loc" {
                    if let Some((scope, text)) = current.take() {
                        let trimmed = text.trim();
                        if !trimmed.is_empty() {
                            let target = match scope {
                                LocScope::Sitemap => &mut namespaced,
                                LocScope::Bare => &mut bare,
                            };
                            target.push(trimmed.to_string());
                        }
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if depth > 0 {
        return Err(LinkShowcaseError::parse(
            "unexpected end of document: unclosed element",
        ));
    }
    if !seen_root {
        return Err(LinkShowcaseError::parse("no element found"));
    }

    Ok(if namespaced.is_empty() { bare } else { namespaced })
}

/// Decide whether an element's resolved namespace makes it a `<loc>` we collect.
fn loc_scope(resolved: &ResolveResult<'_>) -> Option<LocScope> {
    match resolved {
        ResolveResult::Bound(Namespace(ns)) if *ns == SITEMAP_NAMESPACE.as_bytes() => {
            Some(LocScope::Sitemap)
        }
        ResolveResult::Unbound => Some(LocScope::Bare),
        _ => None,
    }
}

fn malformed(position: u64, err: impl std::fmt::Display) -> LinkShowcaseError {
    LinkShowcaseError::parse(format!("{err} (near byte {position})"))
}
