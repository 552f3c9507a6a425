// src/extract/locator.rs
// =============================================================================
// This module normalizes raw image references into canonical locators.
//
// A web page refers to images in several ambiguous ways:
// - Absolute URLs:         https://cdn.example.com/a.jpg
// - Root-relative paths:   /static/logo.png
// - Document-relative:     photo.jpeg  (relative to the page's directory)
// - Inline data URIs:      data:image/png;base64,iVBOR...
//
// The normalizer turns each raw string into exactly one unambiguous form
// (or discards it). The classification runs in a fixed priority order and
// the first matching rule wins, so the result never depends on which HTML
// attribute the string came from.
//
// Rust concepts:
// - Enums with data: CanonicalLocator carries different fields per variant
// - Option<T>: "zero or one" result, instead of exceptions for discards
// - String slicing and pattern methods (starts_with, split_once, trim)
// =============================================================================

use std::collections::hash_set;
use std::collections::HashSet;

use url::{Position, Url};

use crate::config::ScrapeConfig;

/// Prefix that marks an inline base64-encoded image reference.
pub const INLINE_PREFIX: &str = "data:image/";

/// Schemes we consider fetchable without any rewriting.
const HTTP_PREFIXES: [&str; 2] = ["http://", "https://"];

/// One normalized, unambiguous reference to image content.
///
/// Either something we can fetch over HTTP(S), or an image embedded
/// directly in the page markup that only needs decoding.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CanonicalLocator {
    /// A fetchable http/https URL.
    Remote { url: String },
    /// A base64 payload embedded in the page, e.g. `data:image/png;base64,...`
    ///
    /// `subtype` is the MIME subtype ("png", "jpeg", ...), used later to
    /// pick a file extension. The payload is stored verbatim; it is only
    /// decoded (and validated) when the image is materialized to disk.
    Inline { subtype: String, payload: String },
}

impl CanonicalLocator {
    /// The canonical string form of this locator.
    ///
    /// This is what gets written to the listing file, shown to the user,
    /// and used for de-duplication.
    pub fn canonical_string(&self) -> String {
        match self {
            Self::Remote { url } => url.clone(),
            Self::Inline { subtype, payload } => {
                format!("{}{};base64,{}", INLINE_PREFIX, subtype, payload)
            }
        }
    }
}

/// Normalizes one raw reference string pulled out of an HTML attribute.
///
/// Parameters:
///   raw: the attribute value, verbatim (may be padded, malformed, empty)
///   page_url: the parsed URL of the page the reference came from
///   config: the inline-data policy
///
/// Returns Some(locator) or None to discard the reference.
///
/// Classification rules, first match wins:
///   1. Trim surrounding whitespace
///   2. Starts with '/' (but not '//'): root-relative, anchored at the
///      page's scheme + host
///   3. Starts with 'data:image/': inline, kept only if the policy allows
///   4. Starts with 'http://' or 'https://': already absolute; any ?query
///      is cut off (query strings are usually resize/tracking parameters,
///      not part of the image identity)
///   5. Anything else: joined onto the directory portion of the page URL.
///      This is deliberately permissive - a weird href ends up as a
///      best-effort remote locator rather than an error, and simply fails
///      later at download time if it was junk.
pub fn normalize_reference(
    raw: &str,
    page_url: &Url,
    config: &ScrapeConfig,
) -> Option<CanonicalLocator> {
    let reference = raw.trim();
    if reference.is_empty() {
        return None;
    }

    // Rule 2: root-relative. "//host/path" is protocol-relative, not
    // root-relative, so it is excluded here and falls through to rule 5.
    if reference.starts_with('/') && !reference.starts_with("//") {
        // &page_url[..Position::BeforePath] is "scheme://host[:port]"
        page_url.host_str()?;
        return Some(CanonicalLocator::Remote {
            url: format!("{}{}", &page_url[..Position::BeforePath], reference),
        });
    }

    // Rule 3: inline data URI
    if let Some(rest) = reference.strip_prefix(INLINE_PREFIX) {
        if !config.include_inline {
            return None;
        }
        // "png;base64,iVBOR..." -> subtype before ';', payload after ','
        let (subtype, encoded) = rest.split_once(';')?;
        let (_, payload) = encoded.split_once(',')?;
        return Some(CanonicalLocator::Inline {
            subtype: subtype.to_string(),
            payload: payload.to_string(),
        });
    }

    // Rule 4: already absolute, strip the query string
    if HTTP_PREFIXES.iter().any(|p| reference.starts_with(p)) {
        let without_query = reference.split('?').next().unwrap_or(reference);
        return Some(CanonicalLocator::Remote {
            url: without_query.to_string(),
        });
    }

    // Rule 5: document-relative (or anything unrecognized). Join onto the
    // directory portion of the page URL with plain path-join semantics.
    if page_url.cannot_be_a_base() {
        return None;
    }
    let page = page_url.as_str();
    let directory = match page.rfind('/') {
        Some(idx) => &page[..idx],
        None => page,
    };
    Some(CanonicalLocator::Remote {
        url: format!("{}/{}", directory, reference),
    })
}

/// A de-duplicated set of canonical locators for one page.
///
/// Uniqueness is by canonical form; insertion order is irrelevant.
#[derive(Debug, Clone, Default)]
pub struct LocatorSet {
    inner: HashSet<CanonicalLocator>,
}

impl LocatorSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a locator; duplicates are silently collapsed.
    pub fn insert(&mut self, locator: CanonicalLocator) {
        self.inner.insert(locator);
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn iter(&self) -> hash_set::Iter<'_, CanonicalLocator> {
        self.inner.iter()
    }

    /// Canonical string forms, sorted so output is stable across runs.
    pub fn canonical_strings(&self) -> Vec<String> {
        let mut strings: Vec<String> =
            self.inner.iter().map(CanonicalLocator::canonical_string).collect();
        strings.sort();
        strings
    }
}

impl<'a> IntoIterator for &'a LocatorSet {
    type Item = &'a CanonicalLocator;
    type IntoIter = hash_set::Iter<'a, CanonicalLocator>;

    fn into_iter(self) -> Self::IntoIter {
        self.inner.iter()
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why Option<CanonicalLocator> instead of a Result?
//    - "Discard this reference" is a normal outcome, not a failure
//    - None means "nothing usable here", which callers just skip
//    - Reserving Result for actual errors keeps the signal clean
//
// 2. What is split_once?
//    - Splits a string at the FIRST occurrence of a pattern
//    - Returns Option<(&str, &str)> - None if the pattern isn't there
//    - The ? operator on it doubles as our "malformed data URI" discard
//
// 3. What does &page_url[..Position::BeforePath] do?
//    - The url crate lets you slice a parsed URL by named positions
//    - BeforePath is right after the host (and port, if any)
//    - So for https://a.com:8080/x/y it yields "https://a.com:8080"
//
// 4. Why derive Hash and Eq on CanonicalLocator?
//    - LocatorSet de-duplicates by storing locators in a HashSet
//    - HashSet needs Hash + Eq to know when two values are "the same"
//    - Two locators are equal exactly when their canonical strings are
// -----------------------------------------------------------------------------
