//! Detection of the external programs mediatidy shells out to.

use crate::{Error, Result};
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;

/// A program mediatidy runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExternalTool {
    Ffmpeg,
    Ffprobe,
    Guessit,
}

impl ExternalTool {
    pub const ALL: [ExternalTool; 3] = [Self::Ffmpeg, Self::Ffprobe, Self::Guessit];

    /// Binary name looked up on PATH.
    pub fn binary_name(&self) -> &'static str {
        match self {
            Self::Ffmpeg => "ffmpeg",
            Self::Ffprobe => "ffprobe",
            Self::Guessit => "guessit",
        }
    }

    /// ffmpeg tools take a single dash.
    fn version_arg(&self) -> &'static str {
        match self {
            Self::Ffmpeg | Self::Ffprobe => "-version",
            Self::Guessit => "--version",
        }
    }

    /// What the tool is used for, shown by `check-tools`.
    pub fn purpose(&self) -> &'static str {
        match self {
            Self::Ffmpeg => "audio transcoding",
            Self::Ffprobe => "codec probing",
            Self::Guessit => "release name guessing (optional, see sort.guesser)",
        }
    }
}

impl fmt::Display for ExternalTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.binary_name())
    }
}

/// Result of looking for one tool.
#[derive(Debug, Clone)]
pub struct ToolInfo {
    pub tool: ExternalTool,
    pub available: bool,
    /// First line of the tool's version output.
    pub version: Option<String>,
    pub path: Option<PathBuf>,
}

/// Run the tool's version command and report what was found.
///
/// ```no_run
/// use mediatidy_av::tools::{check_tool, ExternalTool};
///
/// let info = check_tool(ExternalTool::Guessit);
/// if !info.available {
///     println!("falling back to the built-in guesser");
/// }
/// ```
pub fn check_tool(tool: ExternalTool) -> ToolInfo {
    let output = Command::new(tool.binary_name())
        .arg(tool.version_arg())
        .output();

    match output {
        Ok(output) if output.status.success() => ToolInfo {
            tool,
            available: true,
            version: String::from_utf8_lossy(&output.stdout)
                .lines()
                .map(str::trim)
                .find(|line| !line.is_empty())
                .map(str::to_string),
            path: which::which(tool.binary_name()).ok(),
        },
        _ => ToolInfo {
            tool,
            available: false,
            version: None,
            path: None,
        },
    }
}

/// Check every tool mediatidy knows about.
pub fn check_tools() -> Vec<ToolInfo> {
    ExternalTool::ALL.into_iter().map(check_tool).collect()
}

/// Find `name` on PATH.
pub fn require_tool(name: &str) -> Result<PathBuf> {
    which::which(name).map_err(|_| Error::tool_not_found(name))
}

/// A configured path wins when it exists; otherwise PATH is searched.
pub fn get_tool_path(name: &str, config_path: Option<&Path>) -> Result<PathBuf> {
    match config_path {
        Some(path) if path.exists() => Ok(path.to_path_buf()),
        _ => require_tool(name),
    }
}
