//! # mediatidy-av
//!
//! ffprobe/ffmpeg plumbing for audio codec audits.
//!
//! This crate provides functionality for:
//! - Probing a file's stream codecs with ffprobe and deciding whether its
//!   audio already uses the target codec
//! - Re-encoding the audio of a file to a sibling output while copying video
//! - Reading ffmpeg's `-progress` stream for a coarse percentage readout
//! - Detecting the external tools on the host
//!
//! ## Features
//!
//! - `tracing` - Enable tracing support
//!
//! ## Example
//!
//! ```no_run
//! use mediatidy_av::{probe_codecs, AudioCodec, ConversionDecision};
//! use std::path::Path;
//!
//! let probe = probe_codecs(Path::new("ffprobe"), Path::new("/path/to/video.mkv"))?;
//! if probe.decision(AudioCodec::Eac3) == ConversionDecision::NeedsConversion {
//!     println!("needs conversion");
//! }
//! # Ok::<(), mediatidy_av::Error>(())
//! ```

pub mod actions;
mod error;
pub mod probe;
pub mod tools;

// Re-exports
pub use actions::audio::{transcode_audio, AudioCodec, ConversionOutcome, TranscodeRequest};
pub use actions::progress::{ProgressEvent, ProgressTracker, TranscodeProgress};
pub use error::{Error, Result};
pub use probe::{probe_codecs, CodecProbe, ConversionDecision, StreamCodec};
pub use tools::{check_tool, check_tools, get_tool_path, require_tool, ExternalTool, ToolInfo};
