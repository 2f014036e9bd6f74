use std::io;
use std::path::PathBuf;

/// Errors that can occur during cmd-cache operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A declared dependency file could not be read while fingerprinting.
    #[error("Cannot read declared file {}", path.display())]
    Dependency {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A cache artifact could not be created or written.
    #[error("Cannot write cache artifact {}", path.display())]
    Artifact {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to spawn `{program}`")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("No command specified")]
    EmptyCommand,

    #[error("IO error: {0}")]
    IoError(#[from] io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn artifact(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Artifact {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias for cmd-cache operations
pub type Result<T> = std::result::Result<T, Error>;
