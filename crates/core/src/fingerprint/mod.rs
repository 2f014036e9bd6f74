//! Fingerprinting of a command line and its declared inputs

pub mod algorithm;
pub mod descriptor;
pub mod key;

// Re-export the main fingerprint types
pub use algorithm::{HashAlgorithm, KeyHasher};
pub use descriptor::{CommandDescriptor, command_line};
pub use key::CacheKey;
