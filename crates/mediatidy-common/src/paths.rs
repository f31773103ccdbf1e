//! Path utilities for extension checks and sibling-name construction.
//!
//! These are used by both the transcode walk (video allow-list, `sample`
//! skip, `_EAC3` sibling naming) and the sorter (extension allow-list,
//! excluded filenames, collision suffixes).

use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Lowercased extension of a path, without the leading dot.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use mediatidy_common::paths::extension_lowercase;
///
/// assert_eq!(extension_lowercase(Path::new("Movie.MKV")), Some("mkv".to_string()));
/// assert_eq!(extension_lowercase(Path::new("README")), None);
/// ```
pub fn extension_lowercase(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
}

/// Lowercased final path component.
pub fn file_name_lowercase(path: &Path) -> Option<String> {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(|name| name.to_lowercase())
}

/// Check if a path's extension is in `extensions` (case-insensitive).
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use mediatidy_common::paths::has_extension_in;
///
/// assert!(has_extension_in(Path::new("/dl/show.S01E01.MKV"), &["mkv", "mp4"]));
/// assert!(!has_extension_in(Path::new("/dl/info.nfo"), &["mkv", "mp4"]));
/// ```
pub fn has_extension_in<S: AsRef<str>>(path: &Path, extensions: &[S]) -> bool {
    extension_lowercase(path)
        .map(|ext| {
            extensions
                .iter()
                .any(|allowed| allowed.as_ref().eq_ignore_ascii_case(&ext))
        })
        .unwrap_or(false)
}

/// Check if the file name contains `needle`, ignoring case.
pub fn name_contains(path: &Path, needle: &str) -> bool {
    file_name_lowercase(path)
        .map(|name| name.contains(&needle.to_lowercase()))
        .unwrap_or(false)
}

/// Whether the final component starts with a dot.
pub fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

/// Build `<stem><suffix>.<ext>` next to `path`.
///
/// # Examples
///
/// ```
/// use std::path::{Path, PathBuf};
/// use mediatidy_common::paths::sibling_with_suffix;
///
/// assert_eq!(
///     sibling_with_suffix(Path::new("/tv/Lost/lost.s01e02.mkv"), "_EAC3"),
///     PathBuf::from("/tv/Lost/lost.s01e02_EAC3.mkv")
/// );
/// ```
pub fn sibling_with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::new();
    if let Some(stem) = path.file_stem() {
        name.push(stem);
    }
    name.push(suffix);
    if let Some(ext) = path.extension() {
        name.push(".");
        name.push(ext);
    }
    path.with_file_name(name)
}

/// Insert `.<n>` before the final extension.
///
/// `Alien (1979).en.srt` becomes `Alien (1979).en.1.srt`.
pub fn with_counter(path: &Path, n: u32) -> PathBuf {
    sibling_with_suffix(path, &format!(".{}", n))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_extension_in() {
        let allowed = ["mkv", "mp4", "avi", "idx", "sub", "srt"];
        assert!(has_extension_in(Path::new("movie.mkv"), &allowed));
        assert!(has_extension_in(Path::new("movie.Mp4"), &allowed));
        assert!(has_extension_in(Path::new("/a/b/subs.SRT"), &allowed));

        assert!(!has_extension_in(Path::new("movie.nfo"), &allowed));
        assert!(!has_extension_in(Path::new("no_extension"), &allowed));
        assert!(!has_extension_in(Path::new("archive.part"), &allowed));

        let owned: Vec<String> = vec!["mkv".into()];
        assert!(has_extension_in(Path::new("x.mkv"), &owned));
    }

    #[test]
    fn test_name_contains() {
        assert!(name_contains(Path::new("/dl/Movie.SAMPLE.mkv"), "sample"));
        assert!(name_contains(Path::new("sample.mkv"), "Sample"));
        assert!(!name_contains(Path::new("/sample/movie.mkv"), "sample"));
    }

    #[test]
    fn test_is_hidden() {
        assert!(is_hidden(Path::new("/dl/.DS_Store")));
        assert!(!is_hidden(Path::new("/dl/.hidden/movie.mkv")));
    }

    #[test]
    fn test_sibling_with_suffix() {
        assert_eq!(
            sibling_with_suffix(Path::new("/m/alien.mkv"), "_EAC3"),
            PathBuf::from("/m/alien_EAC3.mkv")
        );
        assert_eq!(
            sibling_with_suffix(Path::new("noext"), "_EAC3"),
            PathBuf::from("noext_EAC3")
        );
    }

    #[test]
    fn test_with_counter() {
        assert_eq!(
            with_counter(Path::new("/m/Alien (1979)/Alien (1979).en.srt"), 2),
            PathBuf::from("/m/Alien (1979)/Alien (1979).en.2.srt")
        );
    }
}
