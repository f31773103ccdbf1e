//! Built-in release-name heuristics.
//!
//! A small stand-in for `guessit` when it is not installed. It recognises
//! `S01E02` / `1x02` episode markers and a release year, and a trailing
//! language token on subtitle names (`movie.fr.srt`). When the file name
//! alone carries no title (`subs.srt`, `English.srt`, `S01E02.mkv`), the
//! wrapper folders above it are tried.

use super::guess::{GuessError, MediaGuesser};
use mediatidy_common::paths::extension_lowercase;
use mediatidy_common::{MediaGuess, MediaKind};
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;

static EPISODE_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bS(\d{1,2}) ?E(\d{1,3})\b|\b(\d{1,2})x(\d{2,3})\b")
        .expect("episode marker regex")
});

static SEASON_WORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:season|series) ?(\d{1,2})\b").expect("season word regex")
});

static YEAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(19\d{2}|20\d{2})\b").expect("year regex"));

/// Language tokens recognised at the end of a subtitle name.
const LANGUAGE_TOKENS: &[&str] = &[
    "en", "eng", "english", "fr", "fre", "fra", "french", "de", "ger", "deu", "german", "es",
    "spa", "spanish", "it", "ita", "italian", "nl", "dut", "nld", "dutch", "pt", "por",
    "portuguese", "ru", "rus", "russian", "sv", "swe", "swedish", "da", "dan", "danish", "no",
    "nor", "norwegian", "fi", "fin", "finnish", "pl", "pol", "polish", "ja", "jpn", "japanese",
    "zh", "chi", "zho", "chinese", "ko", "kor", "korean", "ar", "ara", "arabic",
];

const SUBTITLE_EXTENSIONS: &[&str] = &["srt", "sub", "idx"];

/// How many wrapper folders above the file are consulted.
const MAX_PARENT_LOOKUPS: usize = 2;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct ParsedName {
    kind: Option<MediaKind>,
    title: Option<String>,
    year: Option<u16>,
    season: Option<u32>,
    episode: Option<u32>,
}

impl ParsedName {
    fn is_useful(&self) -> bool {
        self.title.is_some() && matches!(self.kind, Some(MediaKind::Movie | MediaKind::Episode))
    }
}

/// Regex-based guesser working on the path alone.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReleaseNameGuesser;

impl ReleaseNameGuesser {
    pub fn new() -> Self {
        Self
    }
}

impl MediaGuesser for ReleaseNameGuesser {
    fn guess(&self, path: &Path) -> Result<MediaGuess, GuessError> {
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| GuessError::Parse(format!("no usable file name in {:?}", path)))?;

        let is_subtitle = extension_lowercase(path)
            .map(|ext| SUBTITLE_EXTENSIONS.contains(&ext.as_str()))
            .unwrap_or(false);

        let (stem, subtitle_language) = if is_subtitle {
            split_language(stem)
        } else {
            (stem, None)
        };

        let mut parsed = parse_name(stem);

        if !parsed.is_useful() {
            let folders = path
                .ancestors()
                .skip(1)
                .take(MAX_PARENT_LOOKUPS)
                .filter_map(|dir| dir.file_name().and_then(|n| n.to_str()));
            for folder in folders {
                let from_folder = parse_name(folder);
                if from_folder.is_useful() {
                    parsed = merge(parsed, from_folder);
                    break;
                }
            }
        }

        Ok(MediaGuess {
            kind: parsed.kind.or(Some(MediaKind::Unknown)),
            title: parsed.title,
            year: parsed.year,
            season: parsed.season,
            episode: parsed.episode,
            subtitle_language,
        })
    }
}

/// Strip a trailing `.xx` language token from a subtitle stem.
fn split_language(stem: &str) -> (&str, Option<String>) {
    let (head, token) = match stem.rsplit_once(['.', '_', ' ']) {
        Some((head, token)) => (head, token),
        None => ("", stem),
    };
    let lower = token.to_lowercase();
    if LANGUAGE_TOKENS.contains(&lower.as_str()) {
        (head, Some(lower))
    } else {
        (stem, None)
    }
}

fn parse_name(name: &str) -> ParsedName {
    let normalized = name.replace(['.', '_'], " ");

    if let Some(caps) = EPISODE_MARKER.captures(&normalized) {
        let number = |a: usize, b: usize| {
            caps.get(a)
                .or_else(|| caps.get(b))
                .and_then(|m| m.as_str().parse::<u32>().ok())
        };
        let season = number(1, 3);
        let episode = number(2, 4);
        let marker_start = caps.get(0).map(|m| m.start()).unwrap_or(0);
        let (title, year) = split_trailing_year(&normalized[..marker_start]);
        return ParsedName {
            kind: Some(MediaKind::Episode),
            title,
            year,
            season,
            episode,
        };
    }

    if let Some(caps) = SEASON_WORD.captures(&normalized) {
        let marker_start = caps.get(0).map(|m| m.start()).unwrap_or(0);
        let (title, year) = split_trailing_year(&normalized[..marker_start]);
        return ParsedName {
            kind: Some(MediaKind::Episode),
            title,
            year,
            season: caps.get(1).and_then(|m| m.as_str().parse().ok()),
            episode: None,
        };
    }

    let year_match = YEAR
        .find_iter(&normalized)
        .find(|m| clean_title(&normalized[..m.start()]).is_some());
    if let Some(m) = year_match {
        return ParsedName {
            kind: Some(MediaKind::Movie),
            title: clean_title(&normalized[..m.start()]),
            year: m.as_str().parse().ok(),
            season: None,
            episode: None,
        };
    }

    ParsedName {
        kind: Some(MediaKind::Unknown),
        title: clean_title(&normalized),
        ..ParsedName::default()
    }
}

/// `Doctor Who 2005 ` -> (`Doctor Who`, 2005)
fn split_trailing_year(text: &str) -> (Option<String>, Option<u16>) {
    let trimmed = text.trim_end_matches(|c: char| c.is_whitespace() || "-([".contains(c));
    if let Some(m) = YEAR.find_iter(trimmed).last() {
        if m.end() == trimmed.len() {
            if let Some(title) = clean_title(&trimmed[..m.start()]) {
                return (Some(title), m.as_str().parse().ok());
            }
        }
    }
    (clean_title(text), None)
}

fn clean_title(text: &str) -> Option<String> {
    let words: Vec<&str> = text.split_whitespace().collect();
    let title = words
        .join(" ")
        .trim_matches(|c: char| c == '-' || c == '(' || c == '[' || c.is_whitespace())
        .to_string();
    if title.is_empty() {
        None
    } else {
        Some(title)
    }
}

/// Fill what the file name lacked from a folder name.
fn merge(file: ParsedName, folder: ParsedName) -> ParsedName {
    let kind = match file.kind {
        Some(MediaKind::Episode) => file.kind,
        _ => folder.kind,
    };
    ParsedName {
        kind,
        title: folder.title,
        year: file.year.or(folder.year),
        season: file.season.or(folder.season),
        episode: file.episode.or(folder.episode),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn guess(path: &str) -> MediaGuess {
        ReleaseNameGuesser::new().guess(Path::new(path)).unwrap()
    }

    #[test]
    fn test_movie_with_year() {
        let g = guess("/dl/Alien.1979.Directors.Cut.1080p.BluRay.x264-GRP.mkv");
        assert_eq!(g.kind, Some(MediaKind::Movie));
        assert_eq!(g.title.as_deref(), Some("Alien"));
        assert_eq!(g.year, Some(1979));
        assert_eq!(g.subtitle_language, None);
    }

    #[test]
    fn test_movie_title_that_is_a_year() {
        let g = guess("/dl/2001.A.Space.Odyssey.1968.mkv");
        assert_eq!(g.title.as_deref(), Some("2001 A Space Odyssey"));
        assert_eq!(g.year, Some(1968));
    }

    #[test]
    fn test_episode_marker() {
        let g = guess("/dl/lost.s01e02.720p.mkv");
        assert_eq!(g.kind, Some(MediaKind::Episode));
        assert_eq!(g.title.as_deref(), Some("lost"));
        assert_eq!(g.season, Some(1));
        assert_eq!(g.episode, Some(2));
    }

    #[test]
    fn test_episode_x_marker_with_year() {
        let g = guess("/dl/Doctor_Who_2005_3x07.mp4");
        assert_eq!(g.kind, Some(MediaKind::Episode));
        assert_eq!(g.title.as_deref(), Some("Doctor Who"));
        assert_eq!(g.year, Some(2005));
        assert_eq!(g.season, Some(3));
        assert_eq!(g.episode, Some(7));
    }

    #[test]
    fn test_subtitle_language_token() {
        let g = guess("/dl/Alien.1979.fr.srt");
        assert_eq!(g.title.as_deref(), Some("Alien"));
        assert_eq!(g.subtitle_language.as_deref(), Some("fr"));

        let g = guess("/dl/Alien.1979.srt");
        assert_eq!(g.subtitle_language, None);
    }

    #[test]
    fn test_title_from_wrapper_folder() {
        let g = guess("/dl/Alien.1979.1080p/Subs/English.srt");
        assert_eq!(g.kind, Some(MediaKind::Movie));
        assert_eq!(g.title.as_deref(), Some("Alien"));
        assert_eq!(g.year, Some(1979));
        assert_eq!(g.subtitle_language.as_deref(), Some("english"));
    }

    #[test]
    fn test_episode_numbers_from_file_title_from_folder() {
        let g = guess("/dl/Lost.Season.1/S01E05.mkv");
        assert_eq!(g.kind, Some(MediaKind::Episode));
        assert_eq!(g.title.as_deref(), Some("Lost"));
        assert_eq!(g.season, Some(1));
        assert_eq!(g.episode, Some(5));
    }

    #[test]
    fn test_unknown() {
        let g = guess("/dl/random_stuff.mkv");
        assert_eq!(g.kind, Some(MediaKind::Unknown));
        assert!(!g.is_classified());
    }
}
