//! Image discovery, filtering and download
//!
//! This module turns candidate image references found on a page into saved,
//! deduplicated files:
//! - Icon filtering and the high-resolution download ladder (`policy`)
//! - Filename derivation (`naming`)
//! - `srcset` parsing (`srcset`)
//! - The per-run pipeline with reference and content dedup (`pipeline`)
//! - The optional gallery expansion provider interface (`provider`)

mod naming;
mod pipeline;
mod policy;
mod provider;
mod srcset;

pub use naming::{extension_for, image_filename, sanitize_filename};
pub use pipeline::{ImageCounters, ImagePipeline, ImageRecord, ImageSkip};
pub use policy::{IconFilter, ResolutionLadder};
pub use provider::{GalleryProvider, ProviderError, StaticGalleryProvider};
pub use srcset::{is_single_source, last_srcset_url, srcset_urls};
