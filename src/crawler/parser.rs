//! HTML parser for extracting image candidates and links
//!
//! This module handles parsing HTML content to extract:
//! - Image candidates (from `<img>` and `<source>` elements, in document order)
//! - Links to follow (from `<a>` tags), classified as pagination or not
//!
//! Element access goes through the [`PageElement`] capability trait so the
//! extraction rules do not depend on the HTML library.

use crate::images::{is_single_source, last_srcset_url};
use crate::url::{normalize_page_link, resolve_reference};
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// The two things the extraction rules need from a parsed element
pub trait PageElement {
    /// Returns the value of an attribute, if present
    fn attribute(&self, name: &str) -> Option<&str>;

    /// Returns the element's text content
    fn text_content(&self) -> String;
}

impl PageElement for ElementRef<'_> {
    fn attribute(&self, name: &str) -> Option<&str> {
        self.value().attr(name)
    }

    fn text_content(&self) -> String {
        self.text().collect()
    }
}

/// A link found on a page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLink {
    /// Absolute URL with the fragment removed
    pub url: Url,

    /// Whether the link looks like "next page" navigation
    pub is_pagination: bool,
}

/// Extracted information from an HTML page
#[derive(Debug, Clone, Default)]
pub struct ParsedPage {
    /// Raw image references, in document order
    pub image_candidates: Vec<String>,

    /// Resolved links, in document order
    pub links: Vec<PageLink>,
}

/// Parses HTML content and extracts image candidates and links
///
/// The returned value owns all its data, so the parsed document is dropped
/// before the caller awaits anything.
///
/// # Link Extraction Rules
///
/// **Include:** `<a href="...">` resolved against `base_url`
///
/// **Exclude:**
/// - `<a href="..." download>`
/// - `javascript:`, `mailto:`, `tel:` links
/// - Data URIs and fragment-only anchors
///
/// # Example
///
/// ```
/// use sumi_gather::crawler::parse_page;
/// use url::Url;
///
/// let html = r#"<img src="/a.png"><a href="/page2" class="pagination-next">Next</a>"#;
/// let base_url = Url::parse("https://example.com/").unwrap();
/// let parsed = parse_page(html, &base_url);
/// assert_eq!(parsed.image_candidates, vec!["/a.png"]);
/// assert!(parsed.links[0].is_pagination);
/// ```
pub fn parse_page(html: &str, base_url: &Url) -> ParsedPage {
    let document = Html::parse_document(html);

    ParsedPage {
        image_candidates: extract_image_candidates(&document),
        links: extract_links(&document, base_url),
    }
}

/// Returns the image reference an element contributes, if any
///
/// - `<img>`: the first non-empty of `src`, `data-src`, `data-lazy-src`;
///   otherwise the last URL of `srcset` or `data-srcset`
/// - `<source>`: `srcset` when it names exactly one URL
///
/// Inline `data:` values never count as a reference.
pub fn image_candidate<E: PageElement>(tag: &str, element: &E) -> Option<String> {
    let usable = |name: &str| {
        element
            .attribute(name)
            .map(str::trim)
            .filter(|v| !v.is_empty() && !v.to_ascii_lowercase().starts_with("data:"))
            .map(str::to_string)
    };

    match tag {
        "img" => usable("src")
            .or_else(|| usable("data-src"))
            .or_else(|| usable("data-lazy-src"))
            .or_else(|| {
                usable("srcset")
                    .or_else(|| usable("data-srcset"))
                    .and_then(|srcset| last_srcset_url(&srcset))
            }),
        "source" => usable("srcset").filter(|srcset| is_single_source(srcset)),
        _ => None,
    }
}

/// Returns true if a link looks like pagination
///
/// Matches when the visible text contains `next` or `>`, when `rel` lists
/// `next`, or when any class token contains `page`, `pagin` or `next`
/// (all case-insensitive).
pub fn is_pagination_link<E: PageElement>(element: &E) -> bool {
    let text = element.text_content().trim().to_lowercase();
    if text.contains("next") || text.contains('>') {
        return true;
    }

    let rel_next = element
        .attribute("rel")
        .is_some_and(|rel| rel.split_whitespace().any(|t| t.eq_ignore_ascii_case("next")));
    if rel_next {
        return true;
    }

    element.attribute("class").is_some_and(|class| {
        class.split_whitespace().any(|token| {
            let token = token.to_lowercase();
            token.contains("page") || token.contains("pagin") || token.contains("next")
        })
    })
}

fn extract_image_candidates(document: &Html) -> Vec<String> {
    let Ok(selector) = Selector::parse("img, source") else {
        return Vec::new();
    };

    document
        .select(&selector)
        .filter_map(|element| image_candidate(element.value().name(), &element))
        .collect()
}

fn extract_links(document: &Html, base_url: &Url) -> Vec<PageLink> {
    let Ok(selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    let mut links = Vec::new();
    for element in document.select(&selector) {
        // Skip if it has the download attribute
        if element.attribute("download").is_some() {
            continue;
        }

        let Some(url) = element
            .attribute("href")
            .and_then(|href| resolve_reference(href, base_url))
        else {
            continue;
        };

        links.push(PageLink {
            url: normalize_page_link(&url),
            is_pagination: is_pagination_link(&element),
        });
    }
    links
}
