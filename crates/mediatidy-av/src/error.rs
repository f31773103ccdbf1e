//! Error type shared by the probe and transcode paths.

use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The binary could not be found on PATH or at its configured location.
    #[error("{tool} not found")]
    ToolNotFound { tool: String },

    /// The tool ran but exited non-zero.
    #[error("{tool} failed: {message}")]
    ToolFailed { tool: String, message: String },

    /// The tool's output was not what we expected.
    #[error("unreadable {tool} output: {message}")]
    ParseError { tool: String, message: String },

    #[error("no such file: {}", path.display())]
    FileNotFound { path: PathBuf },

    /// Transcodes never overwrite.
    #[error("output exists, refusing to overwrite: {}", path.display())]
    OutputExists { path: PathBuf },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl Error {
    pub fn tool_not_found(tool: impl Into<String>) -> Self {
        Self::ToolNotFound { tool: tool.into() }
    }

    pub fn tool_failed(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ToolFailed {
            tool: tool.into(),
            message: message.into(),
        }
    }

    pub fn parse_error(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ParseError {
            tool: tool.into(),
            message: message.into(),
        }
    }

    pub fn file_not_found(path: impl Into<PathBuf>) -> Self {
        Self::FileNotFound { path: path.into() }
    }

    /// A spawn that fails with `NotFound` means the binary is missing.
    pub(crate) fn from_spawn(tool: &str, err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::tool_not_found(tool),
            _ => Self::Io(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(Error::tool_not_found("ffprobe").to_string(), "ffprobe not found");
        assert_eq!(
            Error::tool_failed("ffmpeg", "exit 1").to_string(),
            "ffmpeg failed: exit 1"
        );
    }

    #[test]
    fn test_from_spawn_maps_missing_binary() {
        let err = Error::from_spawn(
            "ffmpeg",
            std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        );
        assert!(matches!(err, Error::ToolNotFound { ref tool } if tool == "ffmpeg"));

        let err = Error::from_spawn(
            "ffmpeg",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(matches!(err, Error::Io(_)));
    }
}
