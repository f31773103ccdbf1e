//! The routing decision for one file.
//!
//! Pure function of the candidate, its guess and the configured lists; the
//! caller carries out the returned [`RouteAction`]. Precedence:
//!
//! 1. extension outside the allow-list: delete
//! 2. kind absent or `unknown`: leave in place
//! 3. excluded filename: delete
//! 4. `.srt`: delete unless English or unlabelled, else rename and move
//! 5. other files with a foreign subtitle language: no action
//! 6. episode or movie: move into its folder
//! 7. anything else: no action

use super::naming::LibraryLayout;
use crate::config::SortConfig;
use mediatidy_common::{FileCandidate, MediaGuess, MediaKind};
use std::fmt;
use std::path::PathBuf;

/// Why a file is deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteReason {
    Extension,
    ExcludedName,
    ForeignSubtitle,
}

impl fmt::Display for DeleteReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Extension => write!(f, "extension not allowed"),
            Self::ExcludedName => write!(f, "excluded filename"),
            Self::ForeignSubtitle => write!(f, "non-English subtitle"),
        }
    }
}

/// What to do with one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteAction {
    Delete(DeleteReason),
    /// Guess kind is unknown; the file stays where it is.
    LeaveUnknown,
    /// Rename a subtitle to `file_name` inside `dir`.
    MoveSubtitle { dir: PathBuf, file_name: String },
    /// Move the file, keeping its name, into `dir`.
    MoveMedia { dir: PathBuf },
    /// Nothing to do; the reason is logged.
    NoAction(String),
}

impl fmt::Display for RouteAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Delete(reason) => write!(f, "delete ({})", reason),
            Self::LeaveUnknown => write!(f, "leave in place (unknown)"),
            Self::MoveSubtitle { dir, file_name } => {
                write!(f, "move subtitle to {}", dir.join(file_name).display())
            }
            Self::MoveMedia { dir } => write!(f, "move to {}", dir.display()),
            Self::NoAction(reason) => write!(f, "no action ({})", reason),
        }
    }
}

/// Extension allow-list and excluded filenames.
#[derive(Debug, Clone)]
pub struct RoutingRules {
    pub allowed_extensions: Vec<String>,
    pub excluded_filenames: Vec<String>,
}

impl RoutingRules {
    pub fn from_config(config: &SortConfig) -> Self {
        Self {
            allowed_extensions: config.allowed_extensions.clone(),
            excluded_filenames: config.excluded_filenames.clone(),
        }
    }

    pub fn is_allowed_extension(&self, candidate: &FileCandidate) -> bool {
        candidate
            .extension
            .as_deref()
            .map(|ext| {
                self.allowed_extensions
                    .iter()
                    .any(|allowed| allowed.eq_ignore_ascii_case(ext))
            })
            .unwrap_or(false)
    }

    pub fn is_excluded_name(&self, candidate: &FileCandidate) -> bool {
        let name = candidate.file_name.to_lowercase();
        self.excluded_filenames
            .iter()
            .any(|excluded| excluded.to_lowercase() == name)
    }
}

impl Default for RoutingRules {
    fn default() -> Self {
        Self::from_config(&SortConfig::default())
    }
}

/// Decide what to do with `candidate`.
pub fn route(
    candidate: &FileCandidate,
    guess: &MediaGuess,
    rules: &RoutingRules,
    layout: &LibraryLayout,
) -> RouteAction {
    if !rules.is_allowed_extension(candidate) {
        return RouteAction::Delete(DeleteReason::Extension);
    }

    if !guess.is_classified() {
        return RouteAction::LeaveUnknown;
    }

    if rules.is_excluded_name(candidate) {
        return RouteAction::Delete(DeleteReason::ExcludedName);
    }

    let keeps_language = guess.has_english_or_no_subtitle_language();

    if candidate.has_extension("srt") {
        if !keeps_language {
            return RouteAction::Delete(DeleteReason::ForeignSubtitle);
        }
        return match layout.subtitle_target(guess) {
            Some((dir, file_name)) => RouteAction::MoveSubtitle { dir, file_name },
            None => RouteAction::NoAction(format!(
                "no subtitle destination for {} guess",
                kind_label(guess)
            )),
        };
    }

    if !keeps_language {
        return RouteAction::NoAction(format!(
            "subtitle language {:?} on a non-srt file",
            guess.subtitle_language.as_deref().unwrap_or_default()
        ));
    }

    match guess.kind {
        Some(MediaKind::Episode) | Some(MediaKind::Movie) => match layout.media_dir(guess) {
            Some(dir) => RouteAction::MoveMedia { dir },
            None => RouteAction::NoAction("guess has no usable title".to_string()),
        },
        _ => RouteAction::NoAction(format!("unable to sort {} media", kind_label(guess))),
    }
}

fn kind_label(guess: &MediaGuess) -> &str {
    guess.kind.as_ref().map(MediaKind::as_str).unwrap_or("unknown")
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn layout() -> LibraryLayout {
        LibraryLayout::new("/lib")
    }

    fn decide(path: &str, guess: &MediaGuess) -> RouteAction {
        route(
            &FileCandidate::new(path),
            guess,
            &RoutingRules::default(),
            &layout(),
        )
    }

    fn alien() -> MediaGuess {
        MediaGuess::new(MediaKind::Movie)
            .with_title("Alien")
            .with_year(1979)
    }

    fn lost() -> MediaGuess {
        MediaGuess::new(MediaKind::Episode)
            .with_title("Lost")
            .with_season(1)
            .with_episode(2)
    }

    #[test]
    fn test_movie_is_moved() {
        assert_eq!(
            decide("/dl/alien.mkv", &alien()),
            RouteAction::MoveMedia {
                dir: PathBuf::from("/lib/Movies/Alien (1979)")
            }
        );
    }

    #[test]
    fn test_episode_is_moved() {
        assert_eq!(
            decide("/dl/lost.s01e02.mkv", &lost()),
            RouteAction::MoveMedia {
                dir: PathBuf::from("/lib/Shows/Lost/S01")
            }
        );
    }

    #[test]
    fn test_disallowed_extension_deleted_regardless_of_guess() {
        for guess in [alien(), lost(), MediaGuess::unknown(), MediaGuess::default()] {
            assert_eq!(
                decide("/dl/alien.nfo", &guess),
                RouteAction::Delete(DeleteReason::Extension)
            );
        }
        assert_eq!(
            decide("/dl/README", &alien()),
            RouteAction::Delete(DeleteReason::Extension)
        );
    }

    #[test]
    fn test_unknown_never_moved_or_deleted() {
        for path in ["/dl/x.mkv", "/dl/sample.mkv", "/dl/x.fr.srt", "/dl/x.idx"] {
            let unknown = MediaGuess::unknown().with_subtitle_language("fr");
            assert_eq!(decide(path, &unknown), RouteAction::LeaveUnknown);
            assert_eq!(decide(path, &MediaGuess::default()), RouteAction::LeaveUnknown);
        }
    }

    #[test]
    fn test_excluded_name_deleted() {
        assert_eq!(
            decide("/dl/Sample.MKV", &alien()),
            RouteAction::Delete(DeleteReason::ExcludedName)
        );
        assert_eq!(
            decide("/dl/RARBG.com.mp4", &alien()),
            RouteAction::Delete(DeleteReason::ExcludedName)
        );
    }

    #[test]
    fn test_unlabelled_subtitle_renamed() {
        assert_eq!(
            decide("/dl/Lost.S01E02/subs.srt", &lost()),
            RouteAction::MoveSubtitle {
                dir: PathBuf::from("/lib/Shows/Lost/S01"),
                file_name: "Lost S01E02.en.srt".to_string(),
            }
        );
    }

    #[test]
    fn test_english_subtitle_renamed() {
        let guess = alien().with_subtitle_language("en");
        assert_eq!(
            decide("/dl/alien.eng.srt", &guess),
            RouteAction::MoveSubtitle {
                dir: PathBuf::from("/lib/Movies/Alien (1979)"),
                file_name: "Alien (1979).en.srt".to_string(),
            }
        );
    }

    #[test]
    fn test_foreign_subtitle_deleted() {
        let guess = alien().with_subtitle_language("fr");
        assert_eq!(
            decide("/dl/alien.fr.SRT", &guess),
            RouteAction::Delete(DeleteReason::ForeignSubtitle)
        );
    }

    #[test]
    fn test_foreign_language_on_idx_is_left() {
        let guess = alien().with_subtitle_language("de");
        assert_matches!(decide("/dl/alien.de.idx", &guess), RouteAction::NoAction(_));
    }

    #[test]
    fn test_other_kind_is_left() {
        let guess = MediaGuess::new(MediaKind::Other("extra".into())).with_title("Alien");
        assert_matches!(decide("/dl/alien.mkv", &guess), RouteAction::NoAction(_));
        assert_matches!(decide("/dl/alien.srt", &guess), RouteAction::NoAction(_));
    }

    #[test]
    fn test_untitled_movie_is_left() {
        let guess = MediaGuess::new(MediaKind::Movie).with_year(1979);
        assert_matches!(decide("/dl/1979.mkv", &guess), RouteAction::NoAction(_));
    }
}
