use serde::{Deserialize, Serialize};
use sha1::Sha1;
use sha2::{Digest, Sha256};
use std::fmt;
use std::io::{self, Write};
use std::str::FromStr;

/// Digest used to turn the fingerprint input into a cache key.
///
/// SHA-1 is the default so keys stay compatible with existing cache
/// directories.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    #[default]
    Sha1,
    Sha256,
}

impl HashAlgorithm {
    pub const ALL: [HashAlgorithm; 2] = [HashAlgorithm::Sha1, HashAlgorithm::Sha256];

    pub fn as_str(&self) -> &'static str {
        match self {
            HashAlgorithm::Sha1 => "sha1",
            HashAlgorithm::Sha256 => "sha256",
        }
    }

    pub fn hasher(self) -> KeyHasher {
        match self {
            HashAlgorithm::Sha1 => KeyHasher::Sha1(Sha1::new()),
            HashAlgorithm::Sha256 => KeyHasher::Sha256(Sha256::new()),
        }
    }

    /// Length of the hex-encoded key.
    pub fn hex_len(&self) -> usize {
        match self {
            HashAlgorithm::Sha1 => 40,
            HashAlgorithm::Sha256 => 64,
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HashAlgorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sha1" => Ok(HashAlgorithm::Sha1),
            "sha256" => Ok(HashAlgorithm::Sha256),
            other => Err(format!(
                "unknown hash algorithm '{other}' (expected one of: sha1, sha256)"
            )),
        }
    }
}

/// Incremental hasher for the selected algorithm.
#[derive(Debug, Clone)]
pub enum KeyHasher {
    Sha1(Sha1),
    Sha256(Sha256),
}

impl KeyHasher {
    pub fn algorithm(&self) -> HashAlgorithm {
        match self {
            KeyHasher::Sha1(_) => HashAlgorithm::Sha1,
            KeyHasher::Sha256(_) => HashAlgorithm::Sha256,
        }
    }

    pub fn finalize_hex(self) -> String {
        match self {
            KeyHasher::Sha1(hasher) => hex::encode(hasher.finalize()),
            KeyHasher::Sha256(hasher) => hex::encode(hasher.finalize()),
        }
    }
}

impl Write for KeyHasher {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            KeyHasher::Sha1(hasher) => Digest::update(hasher, buf),
            KeyHasher::Sha256(hasher) => Digest::update(hasher, buf),
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
