//! cmd-cache - Cache the results of shell commands
//!
//! This crate provides functionality to:
//! - Fingerprint a command line together with declared files, environment
//!   variables and literal texts
//! - Replay a recorded stdout, stderr and exit status for a known fingerprint
//! - Run the command otherwise, forwarding its output live while recording it
pub mod cache;
pub mod config;
pub mod error;
pub mod fingerprint;
pub mod store;
pub mod tee;

// Re-export commonly used types
pub use error::{Error, Result};

// Re-export main API components
pub use cache::{CommandCache, Inspection, Outcome};
pub use config::Settings;
pub use fingerprint::{CacheKey, CommandDescriptor, HashAlgorithm};
pub use store::{CacheEntry, CacheStore, EntryState};
pub use tee::Tee;
