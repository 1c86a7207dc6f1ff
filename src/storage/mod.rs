//! Storage module for persisting gathered images
//!
//! Each crawled domain gets its own directory under the output root. There is
//! no index or database; the files themselves are the result.

mod local;
mod traits;

pub use local::{with_counter, LocalImageStore};
pub use traits::{ImageStore, StorageError, StorageResult};
