//! Interactive path input.

use anyhow::{Context, Result};
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

pub const PATH_PROMPT: &str = "Enter a file or folder path: ";

/// Print `message` and read one path from `input`.
///
/// Surrounding whitespace and quotes (left by drag-and-drop into a terminal)
/// are stripped and `~` is expanded. An empty answer falls back to
/// `default`, or is an error when there is none.
pub fn read_path<R: BufRead, W: Write>(
    mut input: R,
    mut output: W,
    message: &str,
    default: Option<&Path>,
) -> Result<PathBuf> {
    match default {
        Some(default) => write!(output, "{}[{}] ", message, default.display())?,
        None => write!(output, "{}", message)?,
    }
    output.flush()?;

    let mut line = String::new();
    input
        .read_line(&mut line)
        .context("Failed to read path from stdin")?;

    let answer = line.trim().trim_matches(|c| c == '"' || c == '\'');
    if answer.is_empty() {
        return default
            .map(Path::to_path_buf)
            .context("No path given");
    }

    Ok(PathBuf::from(shellexpand::tilde(answer).as_ref()))
}

/// [`read_path`] on the process's stdin and stdout.
pub fn ask_path(default: Option<&Path>) -> Result<PathBuf> {
    let stdin = std::io::stdin();
    read_path(stdin.lock(), std::io::stdout(), PATH_PROMPT, default)
}
