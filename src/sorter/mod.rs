//! Media classifier and relocator.
//!
//! Walks a download folder, asks a [`MediaGuesser`] what each file is and
//! moves it into the library layout, deleting what does not belong. Entries
//! are handled deepest level first so that wrapper folders emptied by the
//! moves can be removed when their own level is reached.

pub mod fsops;
pub mod guess;
pub mod naming;
pub mod release_name;
pub mod route;

pub use guess::{GuessError, GuessitGuesser, MediaGuesser};
pub use naming::LibraryLayout;
pub use release_name::ReleaseNameGuesser;
pub use route::{route, DeleteReason, RouteAction, RoutingRules};

use crate::config::{Config, GuesserKind, SortConfig};
use anyhow::{Context, Result};
use fsops::Removal;
use mediatidy_common::paths::is_hidden;
use mediatidy_common::{FileCandidate, MediaGuess};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};
use walkdir::WalkDir;

/// Settings for one sort run, resolved from [`SortConfig`].
#[derive(Debug, Clone)]
pub struct SortSettings {
    pub layout: LibraryLayout,
    pub rules: RoutingRules,
    pub max_depth: usize,
    pub dry_run: bool,
}

impl SortSettings {
    pub fn from_config(config: &SortConfig, dry_run: bool) -> Self {
        Self {
            layout: LibraryLayout::from_config(config),
            rules: RoutingRules::from_config(config),
            max_depth: config.max_depth.max(1),
            dry_run,
        }
    }
}

/// What happened to one walked entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    Moved(PathBuf),
    Deleted(DeleteReason),
    RemovedEmptyDir,
    /// Directory still had entries and was left alone.
    KeptDir,
    /// Guess was `unknown`; the file stays put.
    LeftUnknown,
    NoAction(String),
    WouldMove(PathBuf),
    WouldDelete(DeleteReason),
    WouldRemoveDir,
    /// The entry vanished before it was handled.
    Missing,
    Failed(String),
}

/// Counters for a finished sort.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortReport {
    pub moved: usize,
    pub deleted: usize,
    pub removed_dirs: usize,
    pub kept_dirs: usize,
    pub left_unknown: usize,
    pub no_action: usize,
    pub would_move: usize,
    pub would_delete: usize,
    pub failed: usize,
}

impl SortReport {
    pub fn record(&mut self, outcome: &ActionOutcome) {
        match outcome {
            ActionOutcome::Moved(_) => self.moved += 1,
            ActionOutcome::Deleted(_) => self.deleted += 1,
            ActionOutcome::RemovedEmptyDir => self.removed_dirs += 1,
            ActionOutcome::KeptDir => self.kept_dirs += 1,
            ActionOutcome::LeftUnknown => self.left_unknown += 1,
            ActionOutcome::NoAction(_) | ActionOutcome::Missing => self.no_action += 1,
            ActionOutcome::WouldMove(_) => self.would_move += 1,
            ActionOutcome::WouldDelete(_) | ActionOutcome::WouldRemoveDir => {
                self.would_delete += 1
            }
            ActionOutcome::Failed(_) => self.failed += 1,
        }
    }
}

impl fmt::Display for SortReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Moved:           {}", self.moved)?;
        writeln!(f, "Deleted:         {}", self.deleted)?;
        writeln!(f, "Removed dirs:    {}", self.removed_dirs)?;
        if self.would_move > 0 || self.would_delete > 0 {
            writeln!(f, "Would move:      {}", self.would_move)?;
            writeln!(f, "Would delete:    {}", self.would_delete)?;
        }
        writeln!(f, "Kept dirs:       {}", self.kept_dirs)?;
        writeln!(f, "Left (unknown):  {}", self.left_unknown)?;
        writeln!(f, "No action:       {}", self.no_action)?;
        write!(f, "Failed:          {}", self.failed)
    }
}

/// Pick the guesser named in the configuration.
pub fn build_guesser(config: &Config) -> Result<Box<dyn MediaGuesser>> {
    match config.sort.guesser {
        GuesserKind::Guessit => {
            let program =
                mediatidy_av::get_tool_path("guessit", config.tools.guessit_path.as_deref())
                    .context("guessit is not installed (set sort.guesser = \"builtin\" to use the built-in heuristics)")?;
            Ok(Box::new(GuessitGuesser::new(program)))
        }
        GuesserKind::Builtin => Ok(Box::new(ReleaseNameGuesser::new())),
    }
}

/// The sort procedure, generic over its guesser.
pub struct Sorter<G> {
    guesser: G,
    settings: SortSettings,
}

impl<G: MediaGuesser> Sorter<G> {
    pub fn new(guesser: G, settings: SortSettings) -> Self {
        Self { guesser, settings }
    }

    pub fn settings(&self) -> &SortSettings {
        &self.settings
    }

    /// Ask the guesser about `path`. A failing guesser yields `unknown`.
    pub fn classify(&self, path: &Path) -> MediaGuess {
        match self.guesser.guess(path) {
            Ok(guess) => guess,
            Err(e) => {
                warn!("Guess failed for {:?}: {}", path, e);
                MediaGuess::unknown()
            }
        }
    }

    /// Classify and route a file without acting on it.
    ///
    /// Files with a disallowed extension are deleted whatever they are, so
    /// the guesser is not consulted for them.
    pub fn decide(&self, candidate: &FileCandidate) -> (MediaGuess, RouteAction) {
        if !self.settings.rules.is_allowed_extension(candidate) {
            return (
                MediaGuess::unknown(),
                RouteAction::Delete(DeleteReason::Extension),
            );
        }
        let guess = self.classify(&candidate.path);
        let action = route(
            candidate,
            &guess,
            &self.settings.rules,
            &self.settings.layout,
        );
        (guess, action)
    }

    /// Handle one walked entry.
    ///
    /// Per-entry failures come back as [`ActionOutcome::Failed`]; only
    /// failures that make continuing pointless (disk full, read-only
    /// filesystem) are returned as errors.
    pub fn process_entry(
        &self,
        path: &Path,
        is_dir: bool,
    ) -> mediatidy_common::Result<ActionOutcome> {
        let result = if is_dir {
            self.remove_dir(path)
        } else {
            self.process_file(path)
        };

        match result {
            Ok(outcome) => Ok(outcome),
            Err(e) if e.is_fatal() => Err(e),
            Err(e) => {
                warn!("Failed to handle {:?}: {}", path, e);
                Ok(ActionOutcome::Failed(e.to_string()))
            }
        }
    }

    fn process_file(&self, path: &Path) -> mediatidy_common::Result<ActionOutcome> {
        let candidate = FileCandidate::new(path);
        let (guess, action) = self.decide(&candidate);
        debug!("{:?}: {:?} -> {:?}", path, guess, action);

        match action {
            RouteAction::Delete(reason) => self.remove_file(path, reason),
            RouteAction::LeaveUnknown => {
                info!("Unknown media, leaving in place: {:?}", path);
                Ok(ActionOutcome::LeftUnknown)
            }
            RouteAction::NoAction(reason) => {
                info!("No action for {:?}: {}", path, reason);
                Ok(ActionOutcome::NoAction(reason))
            }
            RouteAction::MoveSubtitle { dir, file_name } => {
                let dest = dir.join(&file_name);
                if self.settings.dry_run {
                    info!("[DRY RUN] Would move subtitle {:?} -> {:?}", path, dest);
                    return Ok(ActionOutcome::WouldMove(dest));
                }
                fsops::ensure_dir(&dir)?;
                let moved = fsops::move_with_counter(path, &dest)?;
                info!("Moved subtitle {:?} -> {:?}", path, moved);
                Ok(ActionOutcome::Moved(moved))
            }
            RouteAction::MoveMedia { dir } => {
                if self.settings.dry_run {
                    let dest = dir.join(&candidate.file_name);
                    info!("[DRY RUN] Would move {:?} -> {:?}", path, dest);
                    return Ok(ActionOutcome::WouldMove(dest));
                }
                fsops::ensure_dir(&dir)?;
                let moved = fsops::move_into_dir(path, &dir)?;
                info!("Moved {:?} -> {:?}", path, moved);
                Ok(ActionOutcome::Moved(moved))
            }
        }
    }

    fn remove_file(
        &self,
        path: &Path,
        reason: DeleteReason,
    ) -> mediatidy_common::Result<ActionOutcome> {
        if self.settings.dry_run {
            info!("[DRY RUN] Would delete {:?} ({})", path, reason);
            return Ok(ActionOutcome::WouldDelete(reason));
        }
        match fsops::remove_entry(path)? {
            Removal::Missing => Ok(ActionOutcome::Missing),
            _ => {
                info!("Deleted {:?} ({})", path, reason);
                Ok(ActionOutcome::Deleted(reason))
            }
        }
    }

    fn remove_dir(&self, path: &Path) -> mediatidy_common::Result<ActionOutcome> {
        if self.settings.dry_run {
            let empty = fs::read_dir(path)
                .map(|mut entries| entries.next().is_none())
                .unwrap_or(false);
            if empty {
                info!("[DRY RUN] Would remove empty folder {:?}", path);
                return Ok(ActionOutcome::WouldRemoveDir);
            }
            return Ok(ActionOutcome::KeptDir);
        }

        match fsops::remove_entry(path)? {
            Removal::EmptyDir => {
                info!("Removed empty folder {:?}", path);
                Ok(ActionOutcome::RemovedEmptyDir)
            }
            Removal::KeptNonEmptyDir => {
                debug!("Folder not empty, keeping {:?}", path);
                Ok(ActionOutcome::KeptDir)
            }
            Removal::Missing => Ok(ActionOutcome::Missing),
            Removal::File => Ok(ActionOutcome::Deleted(DeleteReason::Extension)),
        }
    }

    /// Visible entries exactly `depth` levels below `source`, sorted by name.
    pub fn candidates_at_depth(&self, source: &Path, depth: usize) -> Vec<(PathBuf, bool)> {
        WalkDir::new(source)
            .min_depth(depth)
            .max_depth(depth)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!("Failed to read directory entry: {}", e);
                    None
                }
            })
            .filter(|entry| !under_hidden(source, entry.path()))
            .map(|entry| (entry.path().to_path_buf(), entry.file_type().is_dir()))
            .collect()
    }

    /// Refuse a source that contains, or lives inside, a library folder.
    fn check_overlap(&self, source: &Path) -> Result<()> {
        let layout = &self.settings.layout;
        let source = resolve(source);
        for dir in [&layout.movies_dir, &layout.shows_dir] {
            let library = resolve(&layout.root.join(dir));
            if source.starts_with(&library) || library.starts_with(&source) {
                anyhow::bail!(
                    "Source {:?} overlaps the library folder {:?}",
                    source,
                    library
                );
            }
        }
        Ok(())
    }

    /// Sort everything up to `max_depth` levels below `source`.
    pub fn run(&self, source: &Path) -> Result<SortReport> {
        if !source.exists() {
            anyhow::bail!("Source folder does not exist: {:?}", source);
        }
        if !source.is_dir() {
            anyhow::bail!("Source is not a folder: {:?}", source);
        }
        self.check_overlap(source)?;

        info!(
            "Sorting {:?} into {:?}",
            source, self.settings.layout.root
        );
        let mut report = SortReport::default();

        for depth in (1..=self.settings.max_depth).rev() {
            for (path, is_dir) in self.candidates_at_depth(source, depth) {
                match self.process_entry(&path, is_dir) {
                    Ok(outcome) => report.record(&outcome),
                    Err(e) => {
                        error!("Stopping: {}", e);
                        return Err(e).with_context(|| format!("Sort aborted at {:?}", path));
                    }
                }
            }
        }

        Ok(report)
    }
}

/// Canonical form of `path`. A missing tail is re-attached to its nearest
/// existing ancestor, so folders not created yet still compare correctly.
fn resolve(path: &Path) -> PathBuf {
    for ancestor in path.ancestors() {
        let existing = if ancestor.as_os_str().is_empty() {
            Path::new(".")
        } else {
            ancestor
        };
        if let Ok(base) = fs::canonicalize(existing) {
            let rest = path.strip_prefix(ancestor).unwrap_or(Path::new(""));
            return base.join(rest);
        }
    }
    path.to_path_buf()
}

/// True when `path` or any folder between it and `root` is hidden.
fn under_hidden(root: &Path, path: &Path) -> bool {
    path.ancestors()
        .take_while(|p| *p != root)
        .any(is_hidden)
}
