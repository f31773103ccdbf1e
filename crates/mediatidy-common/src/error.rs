//! Common error types used throughout mediatidy.
//!
//! Filesystem failures during a walk are normally reported per file and the
//! walk moves on. A small set of I/O conditions (disk full, read-only
//! filesystem, out of memory) make every later move or delete pointless, so
//! [`Error::is_fatal`] lets callers stop instead of silently continuing.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Common error type for mediatidy.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An I/O operation on a specific path failed.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The destination already exists and will not be overwritten.
    #[error("destination already exists: {}", path.display())]
    Collision { path: PathBuf },

    /// Invalid input was provided.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl Error {
    /// Wrap an I/O error together with the path it happened on.
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Create a collision error.
    pub fn collision(path: impl AsRef<Path>) -> Self {
        Self::Collision {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Create a new InvalidInput error.
    pub fn invalid_input<S: Into<String>>(msg: S) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Whether this error should stop the whole walk.
    pub fn is_fatal(&self) -> bool {
        match self {
            Self::Io { source, .. } => matches!(
                source.kind(),
                ErrorKind::StorageFull | ErrorKind::ReadOnlyFilesystem | ErrorKind::OutOfMemory
            ),
            _ => false,
        }
    }
}

/// Result type alias using the common Error type.
pub type Result<T> = std::result::Result<T, Error>;
