// src/extract/mod.rs
// =============================================================================
// This module contains the discovery stage of the pipeline: turning a web
// page into a de-duplicated set of canonical image locators.
//
// Submodules:
// - locator: classifies one raw reference string into a canonical locator
// - page: fetches a page, runs the selector queries, feeds the normalizer
//
// This file (mod.rs) is the module root - it re-exports the public API so
// callers can write `extract::extract_image_locators()` without knowing
// about our internal file layout.
// =============================================================================

mod locator;
mod page;

// Re-export public items from submodules
pub use locator::{normalize_reference, CanonicalLocator, LocatorSet};
pub use page::{extract_image_locators, locators_from_html, ExtractError};
