use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use crate::error::Result;

const APP_DIR: &str = "cff-calendar";

/// On-disk page cache: one file per URL, named by the SHA-256 of the URL.
/// Entries never expire; delete the directory to force a refetch.
#[derive(Debug, Clone)]
pub struct CacheStore {
    dir: PathBuf,
}

impl CacheStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        CacheStore { dir: dir.into() }
    }

    /// Platform cache directory for this app (e.g. ~/.cache/cff-calendar).
    pub fn default_dir() -> Option<PathBuf> {
        dirs::cache_dir().map(|d| d.join(APP_DIR))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, url: &str) -> PathBuf {
        self.dir.join(key(url))
    }

    pub fn get(&self, url: &str) -> Result<Option<Vec<u8>>> {
        match std::fs::read(self.path_for(url)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn put(&self, url: &str, bytes: &[u8]) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        std::fs::write(self.path_for(url), bytes)?;
        Ok(())
    }
}

fn key(url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(url.as_bytes());
    format!("{:x}", hasher.finalize())
}
