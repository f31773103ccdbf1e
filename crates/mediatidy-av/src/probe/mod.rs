//! Audio codec probing.
//!
//! Only the fields needed to decide whether a file must be transcoded are
//! requested from ffprobe: stream index, codec name, codec type, and the
//! container duration (used for the progress percentage).

mod ffprobe;

pub use ffprobe::{parse_ffprobe_output, probe_codecs};

use crate::actions::audio::AudioCodec;
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;

/// One stream reported by the probe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StreamCodec {
    /// Stream index within the container.
    pub index: u32,
    /// Codec name as ffprobe reports it (e.g. "aac", "eac3").
    pub codec: String,
    /// "audio", "video", ... when ffprobe reported it.
    pub codec_type: Option<String>,
}

impl StreamCodec {
    /// Streams without a reported type are treated as possibly audio.
    pub fn may_be_audio(&self) -> bool {
        self.codec_type
            .as_deref()
            .map(|t| t.eq_ignore_ascii_case("audio"))
            .unwrap_or(true)
    }
}

/// Outcome of probing one file.
#[derive(Debug, Clone, Serialize)]
pub struct CodecProbe {
    pub file_path: PathBuf,
    /// Streams in the order ffprobe listed them.
    pub streams: Vec<StreamCodec>,
    pub duration: Option<Duration>,
}

impl CodecProbe {
    /// Codec names of streams that may carry audio.
    pub fn audio_codecs(&self) -> impl Iterator<Item = &str> {
        self.streams
            .iter()
            .filter(|s| s.may_be_audio())
            .map(|s| s.codec.as_str())
    }

    /// Decide whether the file needs converting to `target`.
    pub fn decision(&self, target: AudioCodec) -> ConversionDecision {
        if self
            .audio_codecs()
            .any(|codec| codec.eq_ignore_ascii_case(target.probe_name()))
        {
            ConversionDecision::AlreadyTarget
        } else {
            ConversionDecision::NeedsConversion
        }
    }
}

/// What the audit decided for a single file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversionDecision {
    /// An audio stream already uses the target codec.
    AlreadyTarget,
    /// No audio stream uses the target codec.
    NeedsConversion,
    /// The probe could not run or its output could not be read.
    ProbeFailed(String),
}
