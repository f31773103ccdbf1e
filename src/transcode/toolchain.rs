//! ffprobe/ffmpeg implementations of the audit traits.

use super::{CodecProber, Transcoder};
use crate::config::ToolsConfig;
use anyhow::{Context, Result};
use mediatidy_av::{probe_codecs, transcode_audio, CodecProbe, TranscodeRequest};
use std::path::{Path, PathBuf};

/// The host's ffprobe and ffmpeg binaries.
#[derive(Debug, Clone)]
pub struct FfmpegToolchain {
    ffprobe: PathBuf,
    ffmpeg: PathBuf,
}

impl FfmpegToolchain {
    pub fn new(ffprobe: impl Into<PathBuf>, ffmpeg: impl Into<PathBuf>) -> Self {
        Self {
            ffprobe: ffprobe.into(),
            ffmpeg: ffmpeg.into(),
        }
    }

    /// Resolve both tools, preferring configured paths over PATH lookup.
    pub fn from_config(tools: &ToolsConfig) -> Result<Self> {
        let ffprobe = mediatidy_av::get_tool_path("ffprobe", tools.ffprobe_path.as_deref())
            .context("ffprobe is required for the codec audit")?;
        let ffmpeg = mediatidy_av::get_tool_path("ffmpeg", tools.ffmpeg_path.as_deref())
            .context("ffmpeg is required for the codec audit")?;
        Ok(Self::new(ffprobe, ffmpeg))
    }
}

impl CodecProber for FfmpegToolchain {
    fn probe(&self, path: &Path) -> mediatidy_av::Result<CodecProbe> {
        probe_codecs(&self.ffprobe, path)
    }
}

impl Transcoder for FfmpegToolchain {
    fn transcode(&self, request: &TranscodeRequest) -> mediatidy_av::Result<PathBuf> {
        let name = request
            .input
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        transcode_audio(&self.ffmpeg, request, |progress| {
            if progress.finished {
                tracing::info!("{}: done ({}s written)", name, progress.out_time.as_secs());
            } else if let Some(percent) = progress.percent {
                tracing::info!("{}: {}%", name, percent);
            }
        })
    }
}
