//! Audio re-encoding.
//!
//! The video stream is copied untouched and the audio is re-encoded to the
//! target codec, written to a new file next to the input. The input file is
//! never modified.

use super::progress::{parse_progress_line, ProgressTracker, TranscodeProgress};
use crate::{Error, Result};
use std::collections::VecDeque;
use std::ffi::OsString;
use std::fmt;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::str::FromStr;
use std::time::Duration;

/// Number of trailing ffmpeg diagnostic lines kept for error messages.
const STDERR_TAIL: usize = 20;

/// Progress updates are emitted in steps of this many percent.
const PROGRESS_STEP: u8 = 10;

/// Target audio codecs for compatibility transcoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AudioCodec {
    /// AAC (Advanced Audio Coding) - widely compatible
    Aac,
    /// AC-3 (Dolby Digital) - good for 5.1 surround
    Ac3,
    /// E-AC-3 (Dolby Digital Plus) - what Roku-class players pass through
    #[default]
    Eac3,
    /// FLAC (Free Lossless Audio Codec)
    Flac,
    /// Opus - modern, efficient codec
    Opus,
}

impl AudioCodec {
    /// Get the ffmpeg encoder name.
    pub fn ffmpeg_name(&self) -> &'static str {
        match self {
            AudioCodec::Aac => "aac",
            AudioCodec::Ac3 => "ac3",
            AudioCodec::Eac3 => "eac3",
            AudioCodec::Flac => "flac",
            AudioCodec::Opus => "libopus",
        }
    }

    /// Codec name as ffprobe reports it.
    pub fn probe_name(&self) -> &'static str {
        match self {
            AudioCodec::Opus => "opus",
            other => other.ffmpeg_name(),
        }
    }

    /// Get recommended bitrate for this codec.
    pub fn default_bitrate(&self) -> &'static str {
        match self {
            AudioCodec::Aac => "256k",
            AudioCodec::Ac3 => "640k",
            AudioCodec::Eac3 => "768k",
            AudioCodec::Flac => "", // Lossless, no bitrate
            AudioCodec::Opus => "128k",
        }
    }

    /// Suffix appended to the output file stem, e.g. `_EAC3`.
    pub fn default_output_suffix(&self) -> String {
        format!("_{}", self.probe_name().to_uppercase())
    }
}

impl fmt::Display for AudioCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.probe_name())
    }
}

impl FromStr for AudioCodec {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "aac" => Ok(AudioCodec::Aac),
            "ac3" => Ok(AudioCodec::Ac3),
            "eac3" | "e-ac3" | "e-ac-3" => Ok(AudioCodec::Eac3),
            "flac" => Ok(AudioCodec::Flac),
            "opus" | "libopus" => Ok(AudioCodec::Opus),
            other => Err(Error::InvalidInput(format!(
                "unsupported audio codec: {}",
                other
            ))),
        }
    }
}

/// Parameters of one transcode.
#[derive(Debug, Clone)]
pub struct TranscodeRequest {
    pub input: PathBuf,
    pub output: PathBuf,
    pub target: AudioCodec,
    /// Probed duration, used for the progress percentage.
    pub duration: Option<Duration>,
    /// Ask ffmpeg for `-progress` output.
    pub report_progress: bool,
}

impl TranscodeRequest {
    pub fn new(input: impl Into<PathBuf>, output: impl Into<PathBuf>, target: AudioCodec) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            target,
            duration: None,
            report_progress: false,
        }
    }

    pub fn with_progress(mut self, duration: Option<Duration>) -> Self {
        self.report_progress = true;
        self.duration = duration;
        self
    }

    /// Arguments passed to ffmpeg, without the program name.
    pub fn ffmpeg_args(&self) -> Vec<OsString> {
        let mut args: Vec<OsString> = ["-hide_banner", "-nostdin", "-v", "error", "-n"]
            .iter()
            .map(OsString::from)
            .collect();

        if self.report_progress {
            args.extend(["-progress", "pipe:2", "-nostats"].map(OsString::from));
        }

        args.push("-i".into());
        args.push(self.input.clone().into_os_string());
        args.extend(["-c:v", "copy", "-c:a", self.target.ffmpeg_name()].map(OsString::from));

        let bitrate = self.target.default_bitrate();
        if !bitrate.is_empty() {
            args.extend(["-b:a", bitrate].map(OsString::from));
        }

        args.push(self.output.clone().into_os_string());
        args
    }
}

/// Result of a conversion attempt, as reported by the audit walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversionOutcome {
    /// The new file was written.
    Converted(PathBuf),
    /// The transcoder failed or could not be started.
    Failed(String),
}

impl From<Result<PathBuf>> for ConversionOutcome {
    fn from(result: Result<PathBuf>) -> Self {
        match result {
            Ok(path) => ConversionOutcome::Converted(path),
            Err(e) => ConversionOutcome::Failed(e.to_string()),
        }
    }
}

/// Re-encode the audio of `request.input` into `request.output`.
///
/// Blocks until ffmpeg exits. When progress was requested, stderr is read
/// line by line and `on_progress` is called at every 10% step and once at
/// the end.
///
/// # Errors
///
/// Returns an error if the input is missing, the output already exists,
/// ffmpeg cannot be started, or ffmpeg exits non-zero.
pub fn transcode_audio(
    ffmpeg: &Path,
    request: &TranscodeRequest,
    mut on_progress: impl FnMut(TranscodeProgress),
) -> Result<PathBuf> {
    if !request.input.exists() {
        return Err(Error::file_not_found(&request.input));
    }
    if request.output.exists() {
        return Err(Error::OutputExists {
            path: request.output.clone(),
        });
    }

    #[cfg(feature = "tracing")]
    tracing::info!(
        "Transcoding audio to {}: {:?} -> {:?}",
        request.target,
        request.input,
        request.output
    );

    let mut child = Command::new(ffmpeg)
        .args(request.ffmpeg_args())
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| Error::from_spawn("ffmpeg", e))?;

    let mut tracker = ProgressTracker::new(request.duration, PROGRESS_STEP);
    let mut tail: VecDeque<String> = VecDeque::with_capacity(STDERR_TAIL);

    if let Some(stderr) = child.stderr.take() {
        let mut reader = BufReader::new(stderr);
        let mut raw = Vec::new();
        loop {
            raw.clear();
            match reader.read_until(b'\n', &mut raw) {
                Ok(0) => break,
                Ok(_) => {}
                Err(e) => {
                    // Reap ffmpeg before bailing out.
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(Error::Io(e));
                }
            }
            // ffmpeg echoes file names verbatim; they need not be UTF-8.
            let line = String::from_utf8_lossy(&raw);
            let line = line.trim_end_matches(['\n', '\r']).to_string();
            match parse_progress_line(&line) {
                Some(event) => {
                    if let Some(update) = tracker.observe(event) {
                        on_progress(update);
                    }
                }
                None if is_progress_noise(&line) => {}
                None => {
                    if tail.len() == STDERR_TAIL {
                        tail.pop_front();
                    }
                    tail.push_back(line);
                }
            }
        }
    }

    let status = child.wait()?;
    if !status.success() {
        let message = if tail.is_empty() {
            format!("exited with {}", status)
        } else {
            tail.into_iter().collect::<Vec<_>>().join("\n")
        };
        return Err(Error::tool_failed("ffmpeg", message));
    }

    #[cfg(feature = "tracing")]
    tracing::info!("Audio transcode completed: {:?}", request.output);

    Ok(request.output.clone())
}

/// Other `key=value` lines of a progress block.
fn is_progress_noise(line: &str) -> bool {
    line.split_once('=')
        .map(|(key, _)| !key.is_empty() && key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_'))
        .unwrap_or(false)
}
