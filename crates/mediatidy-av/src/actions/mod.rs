//! Media processing actions.
//!
//! - [`audio`]: re-encode the audio of a file while copying the video
//! - [`progress`]: ffmpeg `-progress` stream parsing

pub mod audio;
pub mod progress;
