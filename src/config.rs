// src/config.rs
// =============================================================================
// This file defines the scraping configuration value object.
//
// Instead of global mutable settings, every component that needs a policy
// decision (which file extensions count as images, whether inline data URIs
// are kept) receives a ScrapeConfig by reference. That keeps the extraction
// functions pure and easy to test with custom policies.
//
// Rust concepts:
// - Structs: Custom data types that group related data
// - The Default trait: A conventional way to get a "standard" value
// =============================================================================

/// Policy knobs for image extraction.
///
/// Built once by the CLI layer and passed down by reference. The defaults
/// match what you want for a typical page scrape.
#[derive(Debug, Clone)]
pub struct ScrapeConfig {
    /// File extensions that mark a hyperlink target as an image resource.
    ///
    /// Matched as a case-sensitive suffix of the raw href string, so
    /// "photo.PNG" is NOT matched by ".png". This mirrors how galleries
    /// usually link to their full-size assets.
    pub image_extensions: Vec<String>,

    /// Whether `data:image/...;base64,...` references are kept as locators.
    ///
    /// When false, inline images are silently discarded during extraction.
    pub include_inline: bool,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            image_extensions: [".jpg", ".jpeg", ".png", ".gif", ".svg"]
                .iter()
                .map(|e| e.to_string())
                .collect(),
            include_inline: true,
        }
    }
}

impl ScrapeConfig {
    /// Returns true if the raw link text ends in one of the configured
    /// image extensions.
    pub fn matches_image_extension(&self, link: &str) -> bool {
        self.image_extensions.iter().any(|ext| link.ends_with(ext))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_extensions_match() {
        let config = ScrapeConfig::default();
        assert!(config.matches_image_extension("gallery/photo.jpeg"));
        assert!(config.matches_image_extension("/a/b/c.svg"));
        assert!(!config.matches_image_extension("page.html"));
    }

    #[test]
    fn test_extension_match_is_case_sensitive() {
        let config = ScrapeConfig::default();
        // Suffix matching is on the raw string, uppercase does not count
        assert!(!config.matches_image_extension("photo.PNG"));
    }
}
