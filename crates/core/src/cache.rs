//! Lookup, replay and record orchestration

use crate::error::Result;
use crate::fingerprint::{CacheKey, CommandDescriptor, HashAlgorithm};
use crate::store::{CacheEntry, CacheStore, EntryState};
use serde::Serialize;
use std::io::Write;
use std::path::PathBuf;
use tracing::debug;

/// Result of a single cached invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Outcome {
    pub key: CacheKey,
    pub exit_status: i32,
    /// True when the result came from the cache rather than a fresh run.
    pub replayed: bool,
}

/// What a lookup would find, without running or replaying anything.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Inspection {
    pub key: CacheKey,
    pub state: EntryState,
    #[serde(flatten)]
    pub entry: CacheEntry,
}

/// Replays a recorded result when one exists and records a fresh run otherwise.
#[derive(Debug, Clone)]
pub struct CommandCache {
    store: CacheStore,
    algorithm: HashAlgorithm,
}

impl CommandCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            store: CacheStore::new(root),
            algorithm: HashAlgorithm::default(),
        }
    }

    /// Use `algorithm` for cache keys instead of the default SHA-1.
    pub fn with_algorithm(mut self, algorithm: HashAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    pub fn store(&self) -> &CacheStore {
        &self.store
    }

    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    pub fn execute<O, E>(&self, descriptor: &CommandDescriptor, mut out: O, mut err: E) -> Result<Outcome>
    where
        O: Write + Send,
        E: Write + Send,
    {
        let key = descriptor.fingerprint(self.algorithm)?;
        let entry = self.store.entry(&key);

        if let Some(exit_status) = entry.try_replay(&mut out, &mut err)? {
            debug!("Cache hit for {}", key);
            return Ok(Outcome {
                key,
                exit_status,
                replayed: true,
            });
        }

        debug!("Cache miss for {}", key);
        let exit_status = entry.run_and_cache(&descriptor.command, out, err)?;
        Ok(Outcome {
            key,
            exit_status,
            replayed: false,
        })
    }

    pub fn inspect(&self, descriptor: &CommandDescriptor) -> Result<Inspection> {
        let key = descriptor.fingerprint(self.algorithm)?;
        let entry = self.store.entry(&key);
        Ok(Inspection {
            state: entry.state(),
            key,
            entry,
        })
    }
}
