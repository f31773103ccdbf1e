//! Mediatidy-Common: Shared types, path helpers, and errors.
//!
//! This crate provides common functionality used across mediatidy:
//!
//! - **Core Types**: [`MediaKind`], [`MediaGuess`] and [`FileCandidate`]
//! - **Path Utilities**: Extension and filename checks used by both walks
//! - **Error Handling**: Filesystem errors with a fatal/per-file classification
//!
//! # Examples
//!
//! ```
//! use mediatidy_common::{FileCandidate, MediaGuess, MediaKind};
//! use mediatidy_common::paths::has_extension_in;
//! use std::path::Path;
//!
//! let candidate = FileCandidate::new("/downloads/Alien.1979.mkv");
//! assert_eq!(candidate.extension.as_deref(), Some("mkv"));
//!
//! let guess = MediaGuess::new(MediaKind::Movie).with_title("Alien").with_year(1979);
//! assert!(guess.is_classified());
//!
//! assert!(has_extension_in(Path::new("movie.MKV"), &["mkv", "mp4"]));
//! ```

pub mod error;
pub mod paths;
pub mod types;

pub use error::{Error, Result};
pub use types::*;
