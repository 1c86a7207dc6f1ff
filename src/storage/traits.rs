//! Storage traits and error types
//!
//! This module defines the trait interface for image storage backends and
//! associated error types.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid filename: {0:?}")]
    InvalidFilename(String),

    #[error("Could not find a free filename for {0}")]
    Exhausted(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Where accepted images are written
///
/// One store covers one crawled domain. Implementations never overwrite an
/// existing file; a taken name gets a `_<counter>` suffix instead.
pub trait ImageStore: Send + Sync {
    /// Directory (or logical location) holding this domain's images
    fn location(&self) -> &Path;

    /// Returns true if `filename` is already taken
    fn exists(&self, filename: &str) -> bool;

    /// Writes `bytes` under `filename` or the first free suffixed variant
    ///
    /// # Returns
    ///
    /// The filename actually used
    fn save(&self, filename: &str, bytes: &[u8]) -> StorageResult<String>;

    /// Full path of a stored file
    fn path_of(&self, filename: &str) -> PathBuf {
        self.location().join(filename)
    }
}
