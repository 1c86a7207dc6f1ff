//! Image selection policies
//!
//! - [`IconFilter`] discards site chrome (icons, logos, spinners) by URL
//! - [`ResolutionLadder`] lists the URLs tried, in order, to download an image

use crate::config::ImagesConfig;
use crate::ConfigError;
use regex::{Regex, RegexBuilder};
use std::sync::OnceLock;
use url::Url;

/// Matches an embedded `_WxH` size suffix right before the extension
fn size_suffix_regex() -> &'static Regex {
    static SIZE_SUFFIX: OnceLock<Regex> = OnceLock::new();
    SIZE_SUFFIX.get_or_init(|| Regex::new(r"_\d+x\d+(\.[A-Za-z]+)$").expect("static regex is valid"))
}

/// URL pattern filter for icons and other page chrome
#[derive(Debug, Clone)]
pub struct IconFilter {
    pattern: Regex,
}

impl IconFilter {
    /// Compiles a case-insensitive filter
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: RegexBuilder::new(pattern).case_insensitive(true).build()?,
        })
    }

    pub fn from_config(config: &ImagesConfig) -> Result<Self, ConfigError> {
        Self::new(&config.icon_pattern).map_err(|e| ConfigError::InvalidPattern(e.to_string()))
    }

    /// Returns true if the URL looks like an icon and should be skipped
    pub fn is_icon(&self, url: &str) -> bool {
        self.pattern.is_match(url)
    }
}

impl Default for IconFilter {
    fn default() -> Self {
        Self::from_config(&ImagesConfig::default()).expect("default icon pattern is valid")
    }
}

/// Ordered list of download attempts for one image
///
/// 1. the canonical URL
/// 2. the canonical URL with a `_WxH` suffix removed from the path
/// 3. the canonical URL's base with each high-resolution query
/// 4. the original URL
///
/// Repeated URLs are tried once.
#[derive(Debug, Clone)]
pub struct ResolutionLadder {
    strip_size_suffix: bool,
    high_res_queries: Vec<String>,
}

impl ResolutionLadder {
    pub fn new(strip_size_suffix: bool, high_res_queries: Vec<String>) -> Self {
        Self {
            strip_size_suffix,
            high_res_queries,
        }
    }

    pub fn from_config(config: &ImagesConfig) -> Self {
        Self::new(config.strip_size_suffix, config.high_res_queries.clone())
    }

    /// Returns the URLs to try, best first
    ///
    /// # Examples
    ///
    /// ```
    /// use sumi_gather::images::ResolutionLadder;
    ///
    /// let ladder = ResolutionLadder::new(true, vec!["w=2048".to_string()]);
    /// let variants = ladder.variants(
    ///     "https://example.com/a_300x200.jpg",
    ///     "https://example.com/a_300x200.jpg?w=300",
    /// );
    /// assert_eq!(variants, vec![
    ///     "https://example.com/a_300x200.jpg",
    ///     "https://example.com/a.jpg",
    ///     "https://example.com/a_300x200.jpg?w=2048",
    ///     "https://example.com/a_300x200.jpg?w=300",
    /// ]);
    /// ```
    pub fn variants(&self, canonical: &str, original: &str) -> Vec<String> {
        let mut variants: Vec<String> = vec![canonical.to_string()];
        let parsed = Url::parse(canonical).ok();

        if self.strip_size_suffix {
            if let Some(stripped) = parsed.as_ref().and_then(strip_size_suffix) {
                variants.push(stripped);
            }
        }

        if let Some(base) = parsed.as_ref() {
            let mut base = base.clone();
            base.set_query(None);
            base.set_fragment(None);
            for query in &self.high_res_queries {
                variants.push(format!("{}?{}", base, query));
            }
        }

        variants.push(original.to_string());

        let mut seen = std::collections::HashSet::new();
        variants.retain(|v| seen.insert(v.clone()));
        variants
    }
}

impl Default for ResolutionLadder {
    fn default() -> Self {
        Self::from_config(&ImagesConfig::default())
    }
}

/// Removes a `_WxH` suffix from the last path segment, keeping the query
fn strip_size_suffix(url: &Url) -> Option<String> {
    let path = url.path();
    let regex = size_suffix_regex();
    if !regex.is_match(path) {
        return None;
    }
    let stripped = regex.replace(path, "$1").into_owned();
    let mut url = url.clone();
    url.set_path(&stripped);
    Some(url.to_string())
}
