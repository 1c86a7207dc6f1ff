//! Image discovery and download pipeline
//!
//! Every candidate reference found on a page goes through:
//!
//! 1. inline `data:` rejection and resolution against the page URL
//! 2. the icon filter
//! 3. canonicalization and reference dedup
//! 4. the resolution ladder (first 2xx with a body wins)
//! 5. SHA-256 content dedup
//! 6. filename derivation and a collision-free save
//! 7. emission of the servable path to the event sink

use super::naming::image_filename;
use super::policy::{IconFilter, ResolutionLadder};
use crate::crawler::{FetchResponse, Fetcher};
use crate::output::EventSink;
use crate::state::CrawlControl;
use crate::storage::ImageStore;
use crate::url::{canonicalize, resolve_reference};
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::fmt;
use std::time::Duration;
use url::Url;

/// A saved image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRecord {
    /// Absolute URL as referenced by the page
    pub source_url: String,
    /// Dedup key derived from `source_url`
    pub canonical_url: String,
    /// Hex SHA-256 of the saved bytes
    pub content_hash: String,
    pub saved_filename: String,
    /// `host[:port]` of the crawled site
    pub domain: String,
}

impl ImageRecord {
    /// Path under which a server exposes the file: `domain/url-encoded-filename`
    pub fn servable_path(&self) -> String {
        format!(
            "{}/{}",
            self.domain,
            urlencoding::encode(&self.saved_filename)
        )
    }
}

/// Why a candidate did not produce a saved image
///
/// None of these abort a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSkip {
    /// Empty, inline `data:` or otherwise unresolvable reference
    Unresolvable,
    /// Matched the icon/chrome filter
    Icon,
    /// Canonical URL already processed this run
    DuplicateReference,
    /// Every ladder variant failed
    DownloadFailed,
    /// Identical bytes already saved this run
    DuplicateContent,
    /// Writing the file failed
    SaveFailed(String),
}

impl fmt::Display for ImageSkip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unresolvable => f.write_str("unresolvable reference"),
            Self::Icon => f.write_str("looks like an icon"),
            Self::DuplicateReference => f.write_str("already processed"),
            Self::DownloadFailed => f.write_str("download failed"),
            Self::DuplicateContent => f.write_str("duplicate content"),
            Self::SaveFailed(message) => write!(f, "save failed: {}", message),
        }
    }
}

/// Per-run image counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImageCounters {
    pub saved: u64,
    pub duplicates_by_reference: u64,
    pub duplicates_by_content: u64,
    pub icons_filtered: u64,
    pub failures: u64,
}

/// Discovers, downloads and deduplicates images for one run
pub struct ImagePipeline {
    icon_filter: IconFilter,
    ladder: ResolutionLadder,
    timeout: Duration,
    domain: String,
    store: Box<dyn ImageStore>,
    seen_canonical: HashSet<String>,
    seen_hashes: HashSet<String>,
    counters: ImageCounters,
}

impl ImagePipeline {
    pub fn new(
        icon_filter: IconFilter,
        ladder: ResolutionLadder,
        timeout: Duration,
        domain: &str,
        store: Box<dyn ImageStore>,
    ) -> Self {
        Self {
            icon_filter,
            ladder,
            timeout,
            domain: domain.to_string(),
            store,
            seen_canonical: HashSet::new(),
            seen_hashes: HashSet::new(),
            counters: ImageCounters::default(),
        }
    }

    pub fn counters(&self) -> ImageCounters {
        self.counters
    }

    pub fn store(&self) -> &dyn ImageStore {
        self.store.as_ref()
    }

    /// Number of distinct canonical URLs processed so far
    pub fn processed(&self) -> usize {
        self.seen_canonical.len()
    }

    /// Runs every candidate of a page through the pipeline
    ///
    /// Stops early (keeping what was already saved) once the crawl is
    /// stopped. Pause is not checked here; it takes effect at the next page.
    pub async fn discover_images(
        &mut self,
        fetcher: &dyn Fetcher,
        sink: &dyn EventSink,
        control: &CrawlControl,
        candidates: &[String],
        page_url: &Url,
    ) -> Vec<ImageRecord> {
        let mut records = Vec::new();
        for candidate in candidates {
            if control.is_stopped() {
                tracing::debug!("Stop requested; abandoning remaining images on {}", page_url);
                break;
            }
            match self.process(fetcher, sink, candidate, page_url).await {
                Ok(record) => records.push(record),
                Err(ImageSkip::SaveFailed(message)) => {
                    tracing::error!("Failed to save image {}: {}", candidate, message);
                }
                Err(ImageSkip::DownloadFailed) => {
                    tracing::warn!("Failed to download image {}", candidate);
                }
                Err(skip) => tracing::debug!("Skipping image {}: {}", candidate, skip),
            }
        }
        records
    }

    /// Runs a single candidate reference through the pipeline
    pub async fn process(
        &mut self,
        fetcher: &dyn Fetcher,
        sink: &dyn EventSink,
        raw_src: &str,
        page_url: &Url,
    ) -> Result<ImageRecord, ImageSkip> {
        let absolute = resolve_reference(raw_src, page_url).ok_or(ImageSkip::Unresolvable)?;
        let source_url = absolute.to_string();

        if self.icon_filter.is_icon(&source_url) {
            self.counters.icons_filtered += 1;
            return Err(ImageSkip::Icon);
        }

        let canonical_url = canonicalize(&source_url);
        if !self.seen_canonical.insert(canonical_url.clone()) {
            self.counters.duplicates_by_reference += 1;
            return Err(ImageSkip::DuplicateReference);
        }
        let ordinal = self.seen_canonical.len();

        let response = match self.download(fetcher, &canonical_url, &source_url).await {
            Some(response) => response,
            None => {
                self.counters.failures += 1;
                return Err(ImageSkip::DownloadFailed);
            }
        };

        let content_hash = hex::encode(Sha256::digest(&response.body));
        if self.seen_hashes.contains(&content_hash) {
            tracing::info!("Skipping duplicate image (hash matched): {}", canonical_url);
            self.counters.duplicates_by_content += 1;
            return Err(ImageSkip::DuplicateContent);
        }

        let filename = image_filename(&canonical_url, ordinal, response.content_type.as_deref());
        let saved_filename = self
            .store
            .save(&filename, &response.body)
            .map_err(|e| ImageSkip::SaveFailed(e.to_string()))?;
        self.seen_hashes.insert(content_hash.clone());
        self.counters.saved += 1;

        let record = ImageRecord {
            source_url,
            canonical_url,
            content_hash,
            saved_filename,
            domain: self.domain.clone(),
        };
        tracing::info!(
            "Saved {} -> {}",
            record.canonical_url,
            self.store.path_of(&record.saved_filename).display()
        );
        sink.push(&record.servable_path());

        Ok(record)
    }

    /// Walks the resolution ladder until a variant yields a 2xx body
    async fn download(
        &self,
        fetcher: &dyn Fetcher,
        canonical_url: &str,
        source_url: &str,
    ) -> Option<FetchResponse> {
        for variant in self.ladder.variants(canonical_url, source_url) {
            tracing::debug!("Attempting to download: {}", variant);
            match fetcher.fetch(&variant, self.timeout).await {
                Ok(response) if response.is_success() && !response.body.is_empty() => {
                    return Some(response);
                }
                Ok(response) => {
                    tracing::debug!("Variant {} returned {}", variant, response.status);
                }
                Err(e) => tracing::debug!("Variant {} failed: {}", variant, e),
            }
        }
        None
    }
}
