//! Destination folder and subtitle naming.
//!
//! Layout produced under the library root:
//!
//! ```text
//! Movies/<Title> (<Year>)/
//! Movies/<Title> (<Year>)/<Title> (<Year>).en.srt
//! Shows/<Title> (<Year>)/S<NN>/
//! Shows/<Title> (<Year>)/S<NN>/<Title> S<NN>E<NN>.en.srt
//! ```
//!
//! The year and season segments are dropped when the guess lacks them.
//! Computing a path never touches the filesystem.

use crate::config::SortConfig;
use mediatidy_common::{MediaGuess, MediaKind};
use std::path::{Path, PathBuf};

/// Language tag given to every kept subtitle.
pub const SUBTITLE_LANGUAGE_TAG: &str = "en";

/// Where sorted media ends up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryLayout {
    pub root: PathBuf,
    pub movies_dir: String,
    pub shows_dir: String,
}

impl LibraryLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            movies_dir: "Movies".to_string(),
            shows_dir: "Shows".to_string(),
        }
    }

    pub fn from_config(config: &SortConfig) -> Self {
        Self {
            root: config.library_root.clone(),
            movies_dir: config.movies_dir.clone(),
            shows_dir: config.shows_dir.clone(),
        }
    }

    /// Folder a movie or episode belongs in.
    ///
    /// `None` for other kinds and for guesses without a usable title.
    pub fn media_dir(&self, guess: &MediaGuess) -> Option<PathBuf> {
        let title = usable_title(guess)?;
        let folder = title_folder(&title, guess.year);

        match guess.kind.as_ref()? {
            MediaKind::Movie => Some(self.root.join(&self.movies_dir).join(folder)),
            MediaKind::Episode => {
                let show = self.root.join(&self.shows_dir).join(folder);
                Some(match guess.season {
                    Some(season) => show.join(format!("S{:02}", season)),
                    None => show,
                })
            }
            MediaKind::Unknown | MediaKind::Other(_) => None,
        }
    }

    /// Folder and player-recognised file name for a subtitle.
    pub fn subtitle_target(&self, guess: &MediaGuess) -> Option<(PathBuf, String)> {
        let dir = self.media_dir(guess)?;
        let name = subtitle_file_name(guess, &dir)?;
        Some((dir, name))
    }
}

/// `<Title> (<Year>)`, or just the title.
pub fn title_folder(title: &str, year: Option<u16>) -> String {
    match year {
        Some(year) => format!("{} ({})", title, year),
        None => title.to_string(),
    }
}

/// Subtitle file name for a guess whose media folder is `dir`.
///
/// Episodes: `<Title> S<NN>E<NN>.en.srt`. Movies: `<folder name>.en.srt`.
pub fn subtitle_file_name(guess: &MediaGuess, dir: &Path) -> Option<String> {
    match guess.kind.as_ref()? {
        MediaKind::Episode => {
            let title = usable_title(guess)?;
            let mut marker = String::new();
            if let Some(season) = guess.season {
                marker.push_str(&format!("S{:02}", season));
            }
            if let Some(episode) = guess.episode {
                marker.push_str(&format!("E{:02}", episode));
            }
            let base = if marker.is_empty() {
                title
            } else {
                format!("{} {}", title, marker)
            };
            Some(format!("{}.{}.srt", base, SUBTITLE_LANGUAGE_TAG))
        }
        MediaKind::Movie => {
            let folder = dir.file_name()?.to_str()?;
            Some(format!("{}.{}.srt", folder, SUBTITLE_LANGUAGE_TAG))
        }
        MediaKind::Unknown | MediaKind::Other(_) => None,
    }
}

/// Title made safe to use as a single path component.
fn usable_title(guess: &MediaGuess) -> Option<String> {
    let cleaned: String = guess
        .title
        .as_deref()?
        .chars()
        .map(|c| match c {
            '/' | '\\' | '\0' => '-',
            c => c,
        })
        .collect();
    let cleaned = cleaned.trim();
    if cleaned.is_empty() || cleaned == "." || cleaned == ".." {
        return None;
    }
    Some(cleaned.to_string())
}
