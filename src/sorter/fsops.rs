//! Filesystem actions used by the sorter.
//!
//! Moves never overwrite. Directory removal is deliberately non-recursive:
//! a folder is only removed once it is empty.

use mediatidy_common::paths::with_counter;
use mediatidy_common::{Error, Result};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Highest counter tried when disambiguating a subtitle name.
const MAX_COUNTER: u32 = 99;

/// What [`remove_entry`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Removal {
    File,
    EmptyDir,
    /// Directory still has entries; left for a later pass.
    KeptNonEmptyDir,
    /// Nothing there any more.
    Missing,
}

/// Create `dir` and its parents. Succeeds if it already exists.
pub fn ensure_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).map_err(|e| Error::io(dir, e))
}

/// Move `src` to exactly `dest`, refusing to overwrite.
pub fn move_file(src: &Path, dest: &Path) -> Result<PathBuf> {
    if dest.exists() {
        return Err(Error::collision(dest));
    }

    match fs::rename(src, dest) {
        Ok(()) => Ok(dest.to_path_buf()),
        Err(e) if is_cross_device(&e) => {
            fs::copy(src, dest).map_err(|e| Error::io(dest, e))?;
            fs::remove_file(src).map_err(|e| Error::io(src, e))?;
            Ok(dest.to_path_buf())
        }
        Err(e) => Err(Error::io(src, e)),
    }
}

/// Move `src` into `dir`, keeping its file name.
pub fn move_into_dir(src: &Path, dir: &Path) -> Result<PathBuf> {
    let name = src
        .file_name()
        .ok_or_else(|| Error::invalid_input(format!("no file name in {:?}", src)))?;
    move_file(src, &dir.join(name))
}

/// Move `src` to `dest`, or to `dest` with `.1`, `.2`, ... inserted before
/// the extension when that name is taken.
pub fn move_with_counter(src: &Path, dest: &Path) -> Result<PathBuf> {
    if !dest.exists() {
        return move_file(src, dest);
    }
    for n in 1..=MAX_COUNTER {
        let candidate = with_counter(dest, n);
        if !candidate.exists() {
            return move_file(src, &candidate);
        }
    }
    Err(Error::collision(dest))
}

/// Delete a file, or a directory only if it is empty.
pub fn remove_entry(path: &Path) -> Result<Removal> {
    let meta = match fs::symlink_metadata(path) {
        Ok(meta) => meta,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Removal::Missing),
        Err(e) => return Err(Error::io(path, e)),
    };

    if meta.is_dir() {
        let mut entries = fs::read_dir(path).map_err(|e| Error::io(path, e))?;
        if entries.next().is_some() {
            return Ok(Removal::KeptNonEmptyDir);
        }
        fs::remove_dir(path).map_err(|e| Error::io(path, e))?;
        return Ok(Removal::EmptyDir);
    }

    fs::remove_file(path).map_err(|e| Error::io(path, e))?;
    Ok(Removal::File)
}

fn is_cross_device(err: &io::Error) -> bool {
    err.kind() == io::ErrorKind::CrossesDevices
}
