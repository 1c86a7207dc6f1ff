//! Gallery expansion provider interface
//!
//! A provider renders a page (typically in a browser) and returns the image
//! URLs it reveals: carousels, lazy galleries and the like. No provider ships
//! with this crate; embedders plug their own in.

use async_trait::async_trait;
use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Gallery provider unavailable: {0}")]
    Unavailable(String),

    #[error("Gallery expansion failed for {url}: {message}")]
    Failed { url: String, message: String },
}

/// Supplies extra image URLs for a page
#[async_trait]
pub trait GalleryProvider: Send + Sync {
    /// Returns raw image URLs (absolute or relative to `page_url`)
    async fn discover_interactive_images(&self, page_url: &Url)
        -> Result<Vec<String>, ProviderError>;
}

/// Provider that returns a fixed list, useful for replaying a prior render
#[derive(Debug, Clone, Default)]
pub struct StaticGalleryProvider {
    urls: Vec<String>,
}

impl StaticGalleryProvider {
    pub fn new(urls: Vec<String>) -> Self {
        Self { urls }
    }

    /// Builds a provider from raw `srcset` values, keeping every listed URL
    pub fn from_srcsets<'a>(srcsets: impl IntoIterator<Item = &'a str>) -> Self {
        Self::new(
            srcsets
                .into_iter()
                .flat_map(super::srcset_urls)
                .collect(),
        )
    }
}

#[async_trait]
impl GalleryProvider for StaticGalleryProvider {
    async fn discover_interactive_images(
        &self,
        _page_url: &Url,
    ) -> Result<Vec<String>, ProviderError> {
        Ok(self.urls.clone())
    }
}
