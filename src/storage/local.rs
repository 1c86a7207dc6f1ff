//! Filesystem image store
//!
//! Images for one crawled domain land in `<output_root>/<host[:port]>/`.

use super::traits::{ImageStore, StorageError, StorageResult};
use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

/// Upper bound on `_<counter>` suffixes tried for one name
const MAX_COLLISIONS: u32 = 10_000;

/// Image store backed by a per-domain directory
#[derive(Debug, Clone)]
pub struct LocalImageStore {
    dir: PathBuf,
}

impl LocalImageStore {
    /// Opens (creating if needed) the directory for `domain` under `output_root`
    ///
    /// # Example
    ///
    /// ```no_run
    /// use std::path::Path;
    /// use sumi_gather::storage::{ImageStore, LocalImageStore};
    ///
    /// let store = LocalImageStore::open(Path::new("data"), "example.com").unwrap();
    /// assert!(store.location().ends_with("example.com"));
    /// ```
    pub fn open(output_root: &Path, domain: &str) -> StorageResult<Self> {
        if domain.is_empty() || domain.contains(['/', '\\']) || domain == ".." {
            return Err(StorageError::InvalidFilename(domain.to_string()));
        }
        let dir = output_root.join(domain);
        std::fs::create_dir_all(&dir)?;
        tracing::debug!("Image directory: {}", dir.display());
        Ok(Self { dir })
    }
}

impl ImageStore for LocalImageStore {
    fn location(&self) -> &Path {
        &self.dir
    }

    fn exists(&self, filename: &str) -> bool {
        self.dir.join(filename).exists()
    }

    fn save(&self, filename: &str, bytes: &[u8]) -> StorageResult<String> {
        if filename.is_empty() || filename.contains(['/', '\\']) {
            return Err(StorageError::InvalidFilename(filename.to_string()));
        }

        for counter in 0..MAX_COLLISIONS {
            let candidate = if counter == 0 {
                filename.to_string()
            } else {
                with_counter(filename, counter)
            };

            // create_new keeps an existing file untouched even if it
            // appeared after the last check
            let file = OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(self.dir.join(&candidate));
            match file {
                Ok(mut file) => {
                    file.write_all(bytes)?;
                    return Ok(candidate);
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(e.into()),
            }
        }

        Err(StorageError::Exhausted(filename.to_string()))
    }
}

/// Inserts `_<counter>` before the extension (`a.png` → `a_1.png`)
pub fn with_counter(filename: &str, counter: u32) -> String {
    match filename.rfind('.') {
        Some(dot) if dot > 0 => format!("{}_{}{}", &filename[..dot], counter, &filename[dot..]),
        _ => format!("{}_{}", filename, counter),
    }
}
