//! HTML parser for extracting links
//!
//! This module handles parsing fetched HTML to extract:
//! - Every `<a href>` target, as an absolute, fragment-free URL
//! - The page title, for log lines

use crate::url::normalize_link;
use scraper::{Html, Selector};
use std::collections::HashSet;
use url::Url;

/// Extracted information from an HTML page
#[derive(Debug, Clone)]
pub struct ParsedPage {
    /// The page title (from <title> tag)
    pub title: Option<String>,

    /// Deduplicated candidate URLs; iteration order carries no meaning
    pub links: HashSet<Url>,
}

/// Parses HTML content and extracts links and metadata
///
/// # Link Extraction Rules
///
/// **Include:**
/// - Every `<a href="...">`, including ones marked `download` or `rel="nofollow"`
///
/// **Exclude:**
/// - `javascript:`, `mailto:`, `tel:` links
/// - Data URIs and any other non-http(s) scheme
///
/// Relative references resolve against `page_url`; fragments are dropped
/// before deduplication.
///
/// # Example
///
/// ```
/// use doc_harvest::crawler::parse_html;
/// use url::Url;
///
/// let html = r#"<html><head><title>Test</title></head><body><a href="/a.pdf#p2">A</a><a href="/a.pdf">A</a></body></html>"#;
/// let page_url = Url::parse("https://example.com/").unwrap();
/// let parsed = parse_html(html, &page_url);
/// assert_eq!(parsed.title, Some("Test".to_string()));
/// assert_eq!(parsed.links.len(), 1);
/// ```
pub fn parse_html(html: &str, page_url: &Url) -> ParsedPage {
    let document = Html::parse_document(html);

    ParsedPage {
        title: extract_title(&document),
        links: extract_anchor_links(&document, page_url),
    }
}

/// Extracts the page title from the HTML document
fn extract_title(document: &Html) -> Option<String> {
    let title_selector = Selector::parse("title").ok()?;

    document
        .select(&title_selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Extracts all valid links from `<a href>` elements
fn extract_anchor_links(document: &Html, page_url: &Url) -> HashSet<Url> {
    let mut links = HashSet::new();

    if let Ok(a_selector) = Selector::parse("a[href]") {
        for element in document.select(&a_selector) {
            if let Some(url) = element
                .value()
                .attr("href")
                .and_then(|href| normalize_link(href, page_url))
            {
                links.insert(url);
            }
        }
    }

    links
}

/// Convenience function for extracting just the links from HTML
pub fn extract_links(html: &str, page_url: &Url) -> HashSet<Url> {
    parse_html(html, page_url).links
}
