//! ffprobe-based codec probing.

use super::{CodecProbe, StreamCodec};
use crate::{Error, Result};
use serde::Deserialize;
use std::path::Path;
use std::process::Command;
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    #[serde(default)]
    streams: Vec<FfprobeStream>,
    #[serde(default)]
    format: Option<FfprobeFormat>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    #[serde(default)]
    index: Option<u32>,
    #[serde(default)]
    codec_name: Option<String>,
    #[serde(default)]
    codec_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    #[serde(default)]
    duration: Option<String>,
}

/// Probe the stream codecs of a file using ffprobe.
///
/// # Errors
///
/// Returns an error if the file does not exist, ffprobe cannot be spawned,
/// exits non-zero, or prints output that is not the expected JSON.
pub fn probe_codecs(ffprobe: &Path, path: &Path) -> Result<CodecProbe> {
    if !path.exists() {
        return Err(Error::file_not_found(path));
    }

    #[cfg(feature = "tracing")]
    tracing::debug!("Probing codecs of {:?}", path);

    let output = Command::new(ffprobe)
        .args([
            "-v",
            "error",
            "-show_entries",
            "stream=index,codec_name,codec_type:format=duration",
            "-of",
            "json",
        ])
        .arg(path)
        .output()
        .map_err(|e| Error::from_spawn("ffprobe", e))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(Error::tool_failed("ffprobe", stderr.trim().to_string()));
    }

    let json_str = String::from_utf8(output.stdout)
        .map_err(|e| Error::parse_error("ffprobe", format!("Invalid UTF-8: {}", e)))?;

    parse_ffprobe_output(path, &json_str)
}

/// Parse ffprobe JSON into a [`CodecProbe`].
///
/// Missing fields are tolerated: a stream without a codec name is dropped,
/// a stream without an index takes its position in the list.
pub fn parse_ffprobe_output(path: &Path, json: &str) -> Result<CodecProbe> {
    let output: FfprobeOutput = serde_json::from_str(json)
        .map_err(|e| Error::parse_error("ffprobe", e.to_string()))?;

    let duration = output
        .format
        .and_then(|f| f.duration)
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|secs| secs.is_finite() && *secs >= 0.0)
        .map(Duration::from_secs_f64);

    let streams = output
        .streams
        .into_iter()
        .enumerate()
        .filter_map(|(position, stream)| {
            let codec = stream.codec_name.filter(|name| !name.is_empty())?;
            Some(StreamCodec {
                index: stream.index.unwrap_or(position as u32),
                codec,
                codec_type: stream.codec_type,
            })
        })
        .collect();

    Ok(CodecProbe {
        file_path: path.to_path_buf(),
        streams,
        duration,
    })
}
