// src/extract/page.rs
// =============================================================================
// This module extracts image locators from a web page.
//
// We use the `scraper` crate which:
// - Parses HTML into a DOM (Document Object Model)
// - Supports CSS selectors for finding elements
// - Is built on html5ever (Mozilla's HTML parser), so malformed markup is
//   tolerated instead of causing a parse error
//
// Candidates come from three independent places on the page:
// - <img src="...">        images loaded directly
// - <img data-src="...">   lazily loaded images (JS swaps data-src into src)
// - <a href="...">         hyperlinks, kept only when the target looks like
//                          an image file by extension
//
// Every candidate goes through the locator normalizer and the results are
// collected into a de-duplicated LocatorSet.
// =============================================================================

use reqwest::{Client, StatusCode};
use scraper::{Html, Selector};
use thiserror::Error;
use url::Url;

use crate::config::ScrapeConfig;
use crate::extract::locator::{normalize_reference, LocatorSet};

/// Why page extraction failed.
///
/// Extraction distinguishes "the page had no images" (Ok with an empty set)
/// from "we never got a parseable page at all" (one of these variants), so
/// the caller is never left guessing which one happened.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The page URL itself could not be parsed into scheme + host.
    #[error("invalid page URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        source: url::ParseError,
    },

    /// Network-level failure: DNS, TLS, connection, timeout, or an
    /// unsupported scheme rejected by the HTTP client.
    #[error("failed to fetch {url}: {source}")]
    Fetch {
        url: String,
        source: reqwest::Error,
    },

    /// The server answered, but not with a 2xx.
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: StatusCode },
}

/// Fetches a page and returns the de-duplicated set of image locators it
/// references.
///
/// Parameters:
///   client: shared HTTP client (connection pooling, timeout policy)
///   page_url: the page to scan, assumed syntactically well-formed by the
///             caller - we only re-parse it to get scheme/host for
///             resolving relative references
///   config: extension list + inline-data policy
///
/// A page with zero candidates yields Ok(empty set), not an error.
pub async fn extract_image_locators(
    client: &Client,
    page_url: &str,
    config: &ScrapeConfig,
) -> Result<LocatorSet, ExtractError> {
    let base = Url::parse(page_url).map_err(|source| ExtractError::InvalidUrl {
        url: page_url.to_string(),
        source,
    })?;

    let response = client
        .get(page_url)
        .send()
        .await
        .map_err(|source| ExtractError::Fetch {
            url: page_url.to_string(),
            source,
        })?;

    if !response.status().is_success() {
        return Err(ExtractError::Status {
            url: page_url.to_string(),
            status: response.status(),
        });
    }

    let html = response
        .text()
        .await
        .map_err(|source| ExtractError::Fetch {
            url: page_url.to_string(),
            source,
        })?;

    Ok(locators_from_html(&html, &base, config))
}

/// Collects and normalizes image references from already-fetched HTML.
///
/// Split out from the fetching so it can be tested on synthetic pages
/// without any network.
pub fn locators_from_html(html: &str, page_url: &Url, config: &ScrapeConfig) -> LocatorSet {
    let document = Html::parse_document(html);

    // Selector::parse returns Result, so we use .unwrap() which panics on
    // error. This is OK here because our selectors are constants and known
    // to be valid.
    let img_src = Selector::parse("img[src]").unwrap();
    let img_data_src = Selector::parse("img[data-src]").unwrap();
    let anchors = Selector::parse("a[href]").unwrap();

    let mut candidates: Vec<&str> = Vec::new();

    // Images loaded directly
    for element in document.select(&img_src) {
        if let Some(src) = element.value().attr("src") {
            candidates.push(src);
        }
    }

    // Lazily loaded image sources
    for element in document.select(&img_data_src) {
        if let Some(src) = element.value().attr("data-src") {
            candidates.push(src);
        }
    }

    // Hyperlinks whose raw target ends in an image extension
    for element in document.select(&anchors) {
        if let Some(href) = element.value().attr("href") {
            if config.matches_image_extension(href) {
                candidates.push(href);
            }
        }
    }

    let mut set = LocatorSet::new();
    for raw in candidates {
        if let Some(locator) = normalize_reference(raw, page_url, config) {
            set.insert(locator);
        }
    }

    set
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why three separate selectors instead of one?
//    - The three sources have different semantics (an <a> href needs the
//      extension filter, img attributes do not)
//    - Keeping them separate makes each loop trivially readable and keeps
//      the filter where it belongs
//
// 2. Why does locators_from_html take an already-parsed Url?
//    - The page URL is parsed exactly once, in extract_image_locators
//    - Passing &Url instead of &str means the parse can't silently fail
//      halfway through normalization
//
// 3. What is Vec<&str> doing here?
//    - The attribute values are borrowed from the parsed document
//    - We only copy strings when a candidate actually survives
//      normalization, which keeps the common discard path allocation-free
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::locator::CanonicalLocator;

    fn extract(html: &str, page: &str) -> LocatorSet {
        let base = Url::parse(page).unwrap();
        locators_from_html(html, &base, &ScrapeConfig::default())
    }

    #[test]
    fn test_end_to_end_synthetic_page() {
        let html = r#"
            <img src="/logo.png">
            <img data-src="https://cdn.x.com/a.jpg">
            <a href="photo.jpeg">full size</a>
            <img src="data:image/png;base64,iVBORw0KGgo=">
        "#;
        let set = extract(html, "https://site.com/p");
        assert_eq!(set.len(), 4);
        let strings = set.canonical_strings();
        assert!(strings.contains(&"https://site.com/logo.png".to_string()));
        assert!(strings.contains(&"https://cdn.x.com/a.jpg".to_string()));
        assert!(strings.contains(&"https://site.com/photo.jpeg".to_string()));
        assert!(strings.contains(&"data:image/png;base64,iVBORw0KGgo=".to_string()));
    }

    #[test]
    fn test_page_without_images_yields_empty_set() {
        let html = "<p>Nothing to see here</p><a href='/about.html'>about</a>";
        let set = extract(html, "https://site.com/p");
        assert!(set.is_empty());
    }

    #[test]
    fn test_hyperlinks_filtered_by_extension() {
        let html = r#"
            <a href="/gallery/one.jpg">one</a>
            <a href="/pages/two.html">two</a>
            <a href="/gallery/three.PNG">three</a>
        "#;
        let set = extract(html, "https://site.com/p");
        // Only one.jpg survives: .html is not an image, .PNG is the wrong case
        assert_eq!(set.len(), 1);
        assert_eq!(
            set.canonical_strings(),
            vec!["https://site.com/gallery/one.jpg".to_string()]
        );
    }

    #[test]
    fn test_duplicate_references_collapse() {
        let html = r#"
            <img src="/logo.png">
            <img src="/logo.png">
            <a href="/logo.png">logo</a>
        "#;
        let set = extract(html, "https://site.com/p");
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_inline_policy_filters_data_uris() {
        let html = r#"<img src="data:image/gif;base64,R0lGODlh">"#;
        let base = Url::parse("https://site.com/p").unwrap();
        let mut config = ScrapeConfig::default();
        config.include_inline = false;
        let set = locators_from_html(html, &base, &config);
        assert!(set.is_empty());
    }

    #[test]
    fn test_malformed_markup_still_parses() {
        // Unclosed tags, stray brackets, unquoted attributes: all tolerated
        let html = "<div><img src='/a.jpg'><p>oops<< <img data-src=/b.png></div>";
        let set = extract(html, "https://site.com/p");
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_img_without_src_is_ignored() {
        let html = r#"<img alt="decorative"><img src="/real.jpg">"#;
        let set = extract(html, "https://site.com/p");
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_absolute_img_src_with_query() {
        let html = r#"<img src="https://cdn.x.com/a.jpg?w=64">"#;
        let set = extract(html, "https://site.com/p");
        assert_eq!(
            set.canonical_strings(),
            vec!["https://cdn.x.com/a.jpg".to_string()]
        );
    }

    #[test]
    fn test_set_contains_expected_variants() {
        let html = r#"<img src="data:image/png;base64,AAAA"><img src="/x.png">"#;
        let set = extract(html, "https://site.com/p");
        let inline_count = set
            .iter()
            .filter(|l| matches!(l, CanonicalLocator::Inline { .. }))
            .count();
        assert_eq!(inline_count, 1);
        assert_eq!(set.len(), 2);
    }
}
