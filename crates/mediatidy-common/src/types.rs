//! Core type definitions for walk candidates and metadata guesses.
//!
//! Guesses come from an external, best-effort source. Every field is
//! optional and the media kind is an open set: anything the guesser reports
//! that is not a movie or an episode is carried through as
//! [`MediaKind::Other`] instead of being rejected.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::paths::extension_lowercase;

/// Kind of media reported by a guesser.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MediaKind {
    /// A feature film.
    Movie,
    /// A single episode of a show.
    Episode,
    /// The guesser could not tell.
    Unknown,
    /// Any other category the guesser emits.
    Other(String),
}

impl MediaKind {
    /// Parse a guesser tag, case-insensitively.
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim().to_lowercase().as_str() {
            "movie" => Self::Movie,
            "episode" => Self::Episode,
            "" | "unknown" => Self::Unknown,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Movie => "movie",
            Self::Episode => "episode",
            Self::Unknown => "unknown",
            Self::Other(tag) => tag,
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for MediaKind {
    fn from(tag: String) -> Self {
        Self::from_tag(&tag)
    }
}

impl From<MediaKind> for String {
    fn from(kind: MediaKind) -> Self {
        kind.as_str().to_string()
    }
}

/// Metadata inferred for one file.
///
/// `kind == None` and `kind == Some(MediaKind::Unknown)` are treated the same
/// way everywhere: the file is never moved.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaGuess {
    #[serde(rename = "type")]
    pub kind: Option<MediaKind>,
    pub title: Option<String>,
    pub year: Option<u16>,
    pub season: Option<u32>,
    pub episode: Option<u32>,
    pub subtitle_language: Option<String>,
}

impl MediaGuess {
    /// A guess with only the kind filled in.
    pub fn new(kind: MediaKind) -> Self {
        Self {
            kind: Some(kind),
            ..Self::default()
        }
    }

    /// The guess used when the guesser fails.
    pub fn unknown() -> Self {
        Self::new(MediaKind::Unknown)
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_year(mut self, year: u16) -> Self {
        self.year = Some(year);
        self
    }

    pub fn with_season(mut self, season: u32) -> Self {
        self.season = Some(season);
        self
    }

    pub fn with_episode(mut self, episode: u32) -> Self {
        self.episode = Some(episode);
        self
    }

    pub fn with_subtitle_language(mut self, language: impl Into<String>) -> Self {
        self.subtitle_language = Some(language.into());
        self
    }

    /// True unless the kind is absent or `unknown`.
    pub fn is_classified(&self) -> bool {
        !matches!(self.kind, None | Some(MediaKind::Unknown))
    }

    /// Whether a subtitle with this guess should be kept.
    ///
    /// Absent language counts as English.
    pub fn has_english_or_no_subtitle_language(&self) -> bool {
        self.subtitle_language
            .as_deref()
            .map(is_english_language)
            .unwrap_or(true)
    }
}

/// Check whether a language code or name denotes English.
///
/// # Examples
///
/// ```
/// use mediatidy_common::is_english_language;
///
/// assert!(is_english_language("en"));
/// assert!(is_english_language("ENG"));
/// assert!(is_english_language("en-US"));
/// assert!(!is_english_language("fr"));
/// ```
pub fn is_english_language(code: &str) -> bool {
    let code = code.trim().to_lowercase();
    matches!(code.as_str(), "en" | "eng" | "english") || code.starts_with("en-")
}

/// A filesystem entry encountered by a walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileCandidate {
    pub path: PathBuf,
    /// Lowercased extension without the dot.
    pub extension: Option<String>,
    /// Final component as it appears on disk.
    pub file_name: String,
}

impl FileCandidate {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let extension = extension_lowercase(&path);
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            path,
            extension,
            file_name,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the extension equals `ext` (case-insensitive).
    pub fn has_extension(&self, ext: &str) -> bool {
        self.extension
            .as_deref()
            .map(|own| own.eq_ignore_ascii_case(ext))
            .unwrap_or(false)
    }
}
