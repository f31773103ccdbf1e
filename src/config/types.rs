use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub sort: SortConfig,

    #[serde(default)]
    pub transcode: TranscodeConfig,

    #[serde(default)]
    pub tools: ToolsConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SortConfig {
    /// Download folder that gets classified and emptied
    #[serde(default = "default_source")]
    pub source: PathBuf,

    /// Library root holding the Movies/ and Shows/ folders
    #[serde(default = "default_library_root")]
    pub library_root: PathBuf,

    #[serde(default = "default_movies_dir")]
    pub movies_dir: String,

    #[serde(default = "default_shows_dir")]
    pub shows_dir: String,

    /// Extensions that survive the cleanup (without the dot)
    #[serde(default = "default_allowed_extensions")]
    pub allowed_extensions: Vec<String>,

    /// Whole filenames (lowercase) that are always deleted
    #[serde(default = "default_excluded_filenames")]
    pub excluded_filenames: Vec<String>,

    #[serde(default)]
    pub guesser: GuesserKind,

    /// How many levels below the source are inspected (default: 3)
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

/// Which metadata guesser the sorter uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GuesserKind {
    /// The `guessit` command-line tool
    #[default]
    Guessit,
    /// The built-in release-name heuristics
    Builtin,
}

fn default_source() -> PathBuf {
    PathBuf::from("/mnt/usb1/tmp")
}
fn default_library_root() -> PathBuf {
    PathBuf::from("/mnt/usb1")
}
fn default_movies_dir() -> String {
    "Movies".to_string()
}
fn default_shows_dir() -> String {
    "Shows".to_string()
}
fn default_allowed_extensions() -> Vec<String> {
    ["mkv", "mp4", "avi", "idx", "sub", "srt"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}
fn default_excluded_filenames() -> Vec<String> {
    [
        ".part",
        "sample",
        "sample.avi",
        "sample.mkv",
        "sample.mp4",
        "etrg.mp4",
        "rarbg.com.mp4",
        "rarbg.com.txt",
        "rarbg.txt",
        "index.txt",
        "txt",
        "nfo",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}
fn default_max_depth() -> usize {
    3
}

impl Default for SortConfig {
    fn default() -> Self {
        Self {
            source: default_source(),
            library_root: default_library_root(),
            movies_dir: default_movies_dir(),
            shows_dir: default_shows_dir(),
            allowed_extensions: default_allowed_extensions(),
            excluded_filenames: default_excluded_filenames(),
            guesser: GuesserKind::default(),
            max_depth: default_max_depth(),
        }
    }
}

impl SortConfig {
    pub fn movies_path(&self) -> PathBuf {
        self.library_root.join(&self.movies_dir)
    }

    pub fn shows_path(&self) -> PathBuf {
        self.library_root.join(&self.shows_dir)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TranscodeConfig {
    /// Audio codec every file should carry (default: eac3)
    #[serde(default = "default_target_codec")]
    pub target_codec: String,

    /// Appended to the output stem; derived from the codec when unset (`_EAC3`)
    #[serde(default)]
    pub output_suffix: Option<String>,

    /// Extensions considered during a folder walk
    #[serde(default = "default_video_extensions")]
    pub video_extensions: Vec<String>,

    /// Files whose lowercased name contains this are skipped
    #[serde(default = "default_skip_substring")]
    pub skip_substring: String,

    #[serde(default = "default_show_progress")]
    pub show_progress: bool,
}

fn default_target_codec() -> String {
    "eac3".to_string()
}
fn default_video_extensions() -> Vec<String> {
    ["mkv", "mp4", "avi", "m4v", "mov"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}
fn default_skip_substring() -> String {
    "sample".to_string()
}
fn default_show_progress() -> bool {
    true
}

impl Default for TranscodeConfig {
    fn default() -> Self {
        Self {
            target_codec: default_target_codec(),
            output_suffix: None,
            video_extensions: default_video_extensions(),
            skip_substring: default_skip_substring(),
            show_progress: default_show_progress(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ToolsConfig {
    #[serde(default)]
    pub ffmpeg_path: Option<PathBuf>,

    #[serde(default)]
    pub ffprobe_path: Option<PathBuf>,

    #[serde(default)]
    pub guessit_path: Option<PathBuf>,
}
