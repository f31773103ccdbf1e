//! Metadata guessing.
//!
//! A guesser turns a path into a [`MediaGuess`]. Guessers are best-effort
//! and may fail; the sorter treats any failure as an `unknown` guess.

use mediatidy_common::{is_english_language, MediaGuess, MediaKind};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Errors from a guesser.
#[derive(Debug, thiserror::Error)]
pub enum GuessError {
    /// The guesser binary is not installed.
    #[error("guesser not found: {0}")]
    ToolNotFound(String),

    /// The guesser could not be started.
    #[error("failed to run guesser: {0}")]
    Io(#[from] std::io::Error),

    /// The guesser exited non-zero.
    #[error("guesser failed: {0}")]
    ToolFailed(String),

    /// The guesser printed something other than a JSON object.
    #[error("unreadable guesser output: {0}")]
    Parse(String),
}

/// Infers media metadata from a path.
pub trait MediaGuesser {
    fn guess(&self, path: &Path) -> Result<MediaGuess, GuessError>;
}

impl<G: MediaGuesser + ?Sized> MediaGuesser for Box<G> {
    fn guess(&self, path: &Path) -> Result<MediaGuess, GuessError> {
        (**self).guess(path)
    }
}

/// Runs the `guessit` command-line tool with `--json`.
#[derive(Debug, Clone)]
pub struct GuessitGuesser {
    program: PathBuf,
}

impl GuessitGuesser {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl MediaGuesser for GuessitGuesser {
    fn guess(&self, path: &Path) -> Result<MediaGuess, GuessError> {
        let output = Command::new(&self.program)
            .arg("--json")
            .arg(path)
            .output()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    GuessError::ToolNotFound(self.program.display().to_string())
                } else {
                    GuessError::Io(e)
                }
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(GuessError::ToolFailed(stderr.trim().to_string()));
        }

        parse_guessit_output(&String::from_utf8_lossy(&output.stdout))
    }
}

/// Map guessit's JSON into a [`MediaGuess`].
///
/// Numbers may arrive as JSON numbers or numeric strings; multi-valued
/// fields (double episodes, several languages) arrive as lists and the
/// first usable entry is taken. Languages prefer an English entry.
pub fn parse_guessit_output(stdout: &str) -> Result<MediaGuess, GuessError> {
    let start = stdout
        .find('{')
        .ok_or_else(|| GuessError::Parse("no JSON object".to_string()))?;
    let value: Value =
        serde_json::from_str(stdout[start..].trim()).map_err(|e| GuessError::Parse(e.to_string()))?;
    let map = value
        .as_object()
        .ok_or_else(|| GuessError::Parse("expected a JSON object".to_string()))?;

    Ok(MediaGuess {
        kind: map.get("type").and_then(as_string).map(|t| MediaKind::from_tag(&t)),
        title: map.get("title").and_then(as_string),
        year: map
            .get("year")
            .and_then(as_number)
            .and_then(|n| u16::try_from(n).ok()),
        season: map
            .get("season")
            .and_then(as_number)
            .and_then(|n| u32::try_from(n).ok()),
        episode: map
            .get("episode")
            .and_then(as_number)
            .and_then(|n| u32::try_from(n).ok()),
        subtitle_language: map.get("subtitle_language").and_then(as_language),
    })
}

static NULL: Value = Value::Null;

fn first(value: &Value) -> &Value {
    match value {
        Value::Array(items) => items.first().unwrap_or(&NULL),
        other => other,
    }
}

fn as_string(value: &Value) -> Option<String> {
    match first(value) {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn as_number(value: &Value) -> Option<u64> {
    match first(value) {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn as_language(value: &Value) -> Option<String> {
    if let Value::Array(items) = value {
        let languages: Vec<String> = items.iter().filter_map(as_string).collect();
        return languages
            .iter()
            .find(|l| is_english_language(l))
            .or_else(|| languages.first())
            .cloned();
    }
    as_string(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_parse_movie() {
        let guess = parse_guessit_output(
            r#"{"title": "Alien", "year": 1979, "container": "mkv", "type": "movie"}"#,
        )
        .unwrap();
        assert_eq!(
            guess,
            MediaGuess::new(MediaKind::Movie)
                .with_title("Alien")
                .with_year(1979)
        );
    }

    #[test]
    fn test_parse_episode_with_string_numbers() {
        let guess = parse_guessit_output(
            r#"{"title": "Lost", "season": "1", "episode": "2", "type": "episode"}"#,
        )
        .unwrap();
        assert_eq!(guess.kind, Some(MediaKind::Episode));
        assert_eq!(guess.season, Some(1));
        assert_eq!(guess.episode, Some(2));
        assert_eq!(guess.year, None);
    }

    #[test]
    fn test_parse_multi_episode_and_languages() {
        let guess = parse_guessit_output(
            r#"{"title": "Lost", "season": 1, "episode": [3, 4], "type": "episode",
                "subtitle_language": ["fr", "en"]}"#,
        )
        .unwrap();
        assert_eq!(guess.episode, Some(3));
        assert_eq!(guess.subtitle_language.as_deref(), Some("en"));
    }

    #[test]
    fn test_parse_missing_and_garbled_fields() {
        let guess = parse_guessit_output(r#"{"type": null, "year": "soon", "title": ""}"#).unwrap();
        assert_eq!(guess, MediaGuess::default());
        assert!(!guess.is_classified());
    }

    #[test]
    fn test_parse_other_kind() {
        let guess = parse_guessit_output(r#"{"type": "extra", "title": "Alien"}"#).unwrap();
        assert_eq!(guess.kind, Some(MediaKind::Other("extra".to_string())));
    }

    #[test]
    fn test_parse_leading_noise() {
        let guess =
            parse_guessit_output("For: alien.mkv\n{\"type\": \"movie\", \"title\": \"Alien\"}\n")
                .unwrap();
        assert_eq!(guess.title.as_deref(), Some("Alien"));
    }

    #[test]
    fn test_parse_not_json() {
        assert_matches!(parse_guessit_output("Traceback ..."), Err(GuessError::Parse(_)));
        assert_matches!(parse_guessit_output("{broken"), Err(GuessError::Parse(_)));
    }

    #[test]
    fn test_missing_guessit_binary() {
        let guesser = GuessitGuesser::new("nonexistent_guessit_12345");
        assert_matches!(
            guesser.guess(Path::new("alien.mkv")),
            Err(GuessError::ToolNotFound(_))
        );
    }
}
