//! Directory-backed storage of recorded command results

pub mod entry;

pub use entry::{CacheEntry, EntryState};

use crate::fingerprint::CacheKey;
use std::path::{Path, PathBuf};

/// Suffix of the artifact holding captured standard output.
pub const STDOUT_SUFFIX: &str = "_out";
/// Suffix of the artifact holding captured standard error.
pub const STDERR_SUFFIX: &str = "_err";

/// A cache root directory holding one artifact triple per key.
///
/// Entries are never evicted or locked. Two invocations racing on the same
/// key may interleave their writes.
#[derive(Debug, Clone)]
pub struct CacheStore {
    root: PathBuf,
}

impl CacheStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn entry(&self, key: &CacheKey) -> CacheEntry {
        let key = key.as_str();
        CacheEntry::new(
            self.root.join(key),
            self.root.join(format!("{key}{STDOUT_SUFFIX}")),
            self.root.join(format!("{key}{STDERR_SUFFIX}")),
        )
    }
}
