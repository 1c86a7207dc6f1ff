//! URL handling module for Sumi-Gather
//!
//! This module provides image URL canonicalization (the reference dedup key),
//! seed and link normalization, and domain/origin extraction.

mod canonical;
mod domain;
mod normalize;

// Re-export main functions
pub use canonical::{canonicalize, is_svg};
pub use domain::{extract_domain, extract_netloc, extract_origin};
pub use normalize::{is_file_download, normalize_page_link, normalize_seed, resolve_reference};

use ::url::Url;

/// Returns true if `url` lives on the given network location
///
/// The crawl never leaves the seed's `host[:port]`.
pub fn is_same_site(url: &Url, netloc: &str) -> bool {
    extract_netloc(url).is_some_and(|n| n == netloc)
}
