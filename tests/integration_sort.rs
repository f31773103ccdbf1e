//! Sort integration tests
//!
//! Runs the sorter with the built-in guesser over scratch download trees.

use mediatidy::config::SortConfig;
use mediatidy::sorter::{ReleaseNameGuesser, SortReport, SortSettings, Sorter};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

struct Tree {
    _dir: TempDir,
    source: PathBuf,
    library: PathBuf,
}

impl Tree {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("tmp");
        let library = dir.path().join("usb1");
        fs::create_dir_all(&source).unwrap();
        Self {
            _dir: dir,
            source,
            library,
        }
    }

    fn add(&self, relative: &str) {
        let path = self.source.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"payload").unwrap();
    }

    fn sort(&self, dry_run: bool) -> SortReport {
        let config = SortConfig {
            source: self.source.clone(),
            library_root: self.library.clone(),
            ..SortConfig::default()
        };
        let sorter = Sorter::new(
            ReleaseNameGuesser::new(),
            SortSettings::from_config(&config, dry_run),
        );
        sorter.run(&self.source).unwrap()
    }

    fn in_library(&self, relative: &str) -> bool {
        self.library.join(relative).is_file()
    }

    fn source_entries(&self) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(&self.source)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }
}

fn exists(path: &Path) -> bool {
    path.exists()
}

#[test]
fn test_typical_download_folder() {
    let tree = Tree::new();
    tree.add("Alien.1979.1080p.BluRay.x264-GRP/Alien.1979.1080p.BluRay.x264-GRP.mkv");
    tree.add("Alien.1979.1080p.BluRay.x264-GRP/Alien.1979.1080p.BluRay.x264-GRP.nfo");
    tree.add("Alien.1979.1080p.BluRay.x264-GRP/Subs/English.srt");
    tree.add("Alien.1979.1080p.BluRay.x264-GRP/Subs/French.srt");
    tree.add("Lost.S01E02.720p.HDTV/Lost.S01E02.720p.HDTV.mkv");
    tree.add("Lost.S01E02.720p.HDTV/sample.mkv");
    tree.add("Lost.S01E02.720p.HDTV/RARBG.txt");

    let report = tree.sort(false);

    assert!(tree.in_library("Movies/Alien (1979)/Alien.1979.1080p.BluRay.x264-GRP.mkv"));
    assert!(tree.in_library("Movies/Alien (1979)/Alien (1979).en.srt"));
    assert!(tree.in_library("Shows/Lost/S01/Lost.S01E02.720p.HDTV.mkv"));
    assert_eq!(report.moved, 3);
    // nfo, French subtitle, sample, RARBG.txt
    assert_eq!(report.deleted, 4);
    assert_eq!(report.failed, 0);
    assert!(tree.source_entries().is_empty());
}

#[test]
fn test_unrecognised_files_stay() {
    let tree = Tree::new();
    tree.add("holiday_video.mp4");
    tree.add("stuff/more_stuff.avi");

    let report = tree.sort(false);

    assert_eq!(report.left_unknown, 2);
    assert_eq!(report.kept_dirs, 1);
    assert!(exists(&tree.source.join("holiday_video.mp4")));
    assert!(exists(&tree.source.join("stuff/more_stuff.avi")));
    assert!(!exists(&tree.library));
}

#[test]
fn test_second_pass_is_a_no_op() {
    let tree = Tree::new();
    tree.add("The.Matrix.1999.mkv");

    let first = tree.sort(false);
    let second = tree.sort(false);

    assert_eq!(first.moved, 1);
    assert_eq!(second, SortReport::default());
    assert!(tree.in_library("Movies/The Matrix (1999)/The.Matrix.1999.mkv"));
}

#[test]
fn test_existing_library_folders_reused() {
    let tree = Tree::new();
    fs::create_dir_all(tree.library.join("Shows/Lost/S01")).unwrap();
    tree.add("Lost.S01E03.mkv");
    tree.add("Lost.S01E03.srt");

    let report = tree.sort(false);

    assert_eq!(report.moved, 2);
    assert!(tree.in_library("Shows/Lost/S01/Lost.S01E03.mkv"));
    assert!(tree.in_library("Shows/Lost/S01/Lost S01E03.en.srt"));
}

#[test]
fn test_dry_run_reports_without_changes() {
    let tree = Tree::new();
    tree.add("Alien.1979/Alien.1979.mkv");
    tree.add("Alien.1979/Alien.1979.nfo");

    let report = tree.sort(true);

    assert_eq!(report.would_move, 1);
    assert_eq!(report.would_delete, 1);
    assert_eq!(report.moved + report.deleted + report.removed_dirs, 0);
    assert_eq!(tree.source_entries(), vec!["Alien.1979".to_string()]);
    assert!(!exists(&tree.library));
}
