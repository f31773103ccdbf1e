//! Codec audit and transcode.
//!
//! Walks a file or folder, probes each candidate's audio codecs and
//! re-encodes the audio of files that do not already carry the target codec.
//! Every per-file problem is reported in the [`TranscodeReport`] and the walk
//! continues with the next file.

mod toolchain;

pub use toolchain::FfmpegToolchain;

use crate::config::TranscodeConfig;
use anyhow::{Context, Result};
use mediatidy_av::{
    AudioCodec, CodecProbe, ConversionDecision, ConversionOutcome, TranscodeRequest,
};
use mediatidy_common::paths::{has_extension_in, name_contains, sibling_with_suffix};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Something that can report the stream codecs of a file.
pub trait CodecProber {
    fn probe(&self, path: &Path) -> mediatidy_av::Result<CodecProbe>;
}

/// Something that can write a re-encoded copy of a file.
pub trait Transcoder {
    fn transcode(&self, request: &TranscodeRequest) -> mediatidy_av::Result<PathBuf>;
}

/// Settings for one audit run, resolved from [`TranscodeConfig`].
#[derive(Debug, Clone)]
pub struct TranscodeSettings {
    pub target: AudioCodec,
    pub output_suffix: String,
    pub video_extensions: Vec<String>,
    pub skip_substring: String,
    pub show_progress: bool,
    pub dry_run: bool,
}

impl TranscodeSettings {
    pub fn from_config(config: &TranscodeConfig, dry_run: bool) -> Result<Self> {
        let target: AudioCodec = config
            .target_codec
            .parse()
            .context("Invalid transcode.target_codec")?;
        let output_suffix = config
            .output_suffix
            .clone()
            .unwrap_or_else(|| target.default_output_suffix());

        Ok(Self {
            target,
            output_suffix,
            video_extensions: config.video_extensions.clone(),
            skip_substring: config.skip_substring.clone(),
            show_progress: config.show_progress,
            dry_run,
        })
    }
}

impl Default for TranscodeSettings {
    fn default() -> Self {
        let config = TranscodeConfig::default();
        let target = AudioCodec::default();
        Self {
            target,
            output_suffix: target.default_output_suffix(),
            video_extensions: config.video_extensions,
            skip_substring: config.skip_substring,
            show_progress: config.show_progress,
            dry_run: false,
        }
    }
}

/// Why a walked file was not probed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The name contains the skip substring ("sample").
    Sample,
    /// The extension is not in the video allow-list.
    Extension,
    /// The file is an output of an earlier conversion.
    OwnOutput,
}

/// What happened to one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileResult {
    Skipped(SkipReason),
    AlreadyTarget,
    Converted(PathBuf),
    /// Dry run: the file would have been converted to this path.
    WouldConvert(PathBuf),
    ProbeFailed(String),
    Failed(String),
}

/// Counters for a finished walk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranscodeReport {
    pub converted: usize,
    pub would_convert: usize,
    pub already_target: usize,
    pub skipped: usize,
    pub probe_failed: usize,
    pub failed: usize,
}

impl TranscodeReport {
    pub fn record(&mut self, result: &FileResult) {
        match result {
            FileResult::Skipped(_) => self.skipped += 1,
            FileResult::AlreadyTarget => self.already_target += 1,
            FileResult::Converted(_) => self.converted += 1,
            FileResult::WouldConvert(_) => self.would_convert += 1,
            FileResult::ProbeFailed(_) => self.probe_failed += 1,
            FileResult::Failed(_) => self.failed += 1,
        }
    }
}

impl fmt::Display for TranscodeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Converted:       {}", self.converted)?;
        if self.would_convert > 0 {
            writeln!(f, "Would convert:   {}", self.would_convert)?;
        }
        writeln!(f, "Already target:  {}", self.already_target)?;
        writeln!(f, "Skipped:         {}", self.skipped)?;
        writeln!(f, "Probe failures:  {}", self.probe_failed)?;
        write!(f, "Failed:          {}", self.failed)
    }
}

/// The audit procedure, generic over its external tools.
pub struct CodecAudit<P, T> {
    prober: P,
    transcoder: T,
    settings: TranscodeSettings,
}

impl<P: CodecProber, T: Transcoder> CodecAudit<P, T> {
    pub fn new(prober: P, transcoder: T, settings: TranscodeSettings) -> Self {
        Self {
            prober,
            transcoder,
            settings,
        }
    }

    pub fn settings(&self) -> &TranscodeSettings {
        &self.settings
    }

    /// Probe a file and decide whether it needs converting.
    pub fn probe(&self, path: &Path) -> ConversionDecision {
        match self.prober.probe(path) {
            Ok(probe) => probe.decision(self.settings.target),
            Err(e) => ConversionDecision::ProbeFailed(e.to_string()),
        }
    }

    /// Path the converted copy of `path` is written to.
    pub fn output_path(&self, path: &Path) -> PathBuf {
        sibling_with_suffix(path, &self.settings.output_suffix)
    }

    /// Write `<stem><suffix><ext>` next to `path`. The input is left alone.
    pub fn convert(&self, path: &Path, probe: Option<&CodecProbe>) -> ConversionOutcome {
        let mut request =
            TranscodeRequest::new(path, self.output_path(path), self.settings.target);
        if self.settings.show_progress {
            request = request.with_progress(probe.and_then(|p| p.duration));
        }
        self.transcoder.transcode(&request).into()
    }

    /// Walk-filter for folder runs.
    pub fn skip_reason(&self, path: &Path) -> Option<SkipReason> {
        if !self.settings.skip_substring.is_empty()
            && name_contains(path, &self.settings.skip_substring)
        {
            return Some(SkipReason::Sample);
        }
        if !has_extension_in(path, &self.settings.video_extensions) {
            return Some(SkipReason::Extension);
        }
        let suffix = self.settings.output_suffix.to_lowercase();
        let is_output = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().to_lowercase().ends_with(&suffix))
            .unwrap_or(false);
        if is_output {
            return Some(SkipReason::OwnOutput);
        }
        None
    }

    /// Probe one file and convert it when needed.
    pub fn process_file(&self, path: &Path) -> FileResult {
        let probe = match self.prober.probe(path) {
            Ok(probe) => probe,
            Err(e) => {
                warn!("Probe failed for {:?}: {}", path, e);
                return FileResult::ProbeFailed(e.to_string());
            }
        };

        match probe.decision(self.settings.target) {
            ConversionDecision::AlreadyTarget => {
                info!(
                    "{:?} already has {} audio, nothing to do",
                    path, self.settings.target
                );
                FileResult::AlreadyTarget
            }
            ConversionDecision::ProbeFailed(reason) => FileResult::ProbeFailed(reason),
            ConversionDecision::NeedsConversion => {
                let output = self.output_path(path);
                if self.settings.dry_run {
                    info!("[DRY RUN] Would convert {:?} -> {:?}", path, output);
                    return FileResult::WouldConvert(output);
                }
                info!(
                    "{:?} needs {} audio, converting",
                    path, self.settings.target
                );
                match self.convert(path, Some(&probe)) {
                    ConversionOutcome::Converted(out) => {
                        info!("Conversion successful: {:?}", out);
                        FileResult::Converted(out)
                    }
                    ConversionOutcome::Failed(reason) => {
                        warn!("Conversion failed for {:?}: {}", path, reason);
                        FileResult::Failed(reason)
                    }
                }
            }
        }
    }

    /// Run over a single file or a whole folder.
    pub fn run(&self, root: &Path) -> Result<TranscodeReport> {
        let mut report = TranscodeReport::default();

        if root.is_file() {
            let result = self.process_file(root);
            report.record(&result);
            return Ok(report);
        }

        if !root.is_dir() {
            anyhow::bail!("Path does not exist: {:?}", root);
        }

        info!("Checking every file under {:?}", root);
        for entry in WalkDir::new(root)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
        {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Failed to read directory entry: {}", e);
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            let result = match self.skip_reason(path) {
                Some(reason) => {
                    debug!("Skipping {:?}: {:?}", path, reason);
                    FileResult::Skipped(reason)
                }
                None => self.process_file(path),
            };
            report.record(&result);
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::fs;

    /// Reports codecs from a filename -> JSON table.
    struct FakeProber {
        outputs: HashMap<String, String>,
        calls: RefCell<Vec<PathBuf>>,
    }

    impl FakeProber {
        fn new(outputs: &[(&str, &str)]) -> Self {
            Self {
                outputs: outputs
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
                calls: RefCell::new(Vec::new()),
            }
        }
    }

    impl CodecProber for &FakeProber {
        fn probe(&self, path: &Path) -> mediatidy_av::Result<CodecProbe> {
            self.calls.borrow_mut().push(path.to_path_buf());
            let name = path.file_name().unwrap().to_string_lossy().to_string();
            match self.outputs.get(&name) {
                Some(json) => mediatidy_av::probe::parse_ffprobe_output(path, json),
                None => Err(mediatidy_av::Error::tool_failed("ffprobe", "exit 1")),
            }
        }
    }

    /// Copies the input to the output, or fails when told to.
    struct FakeTranscoder {
        fail: bool,
        calls: RefCell<Vec<TranscodeRequest>>,
    }

    impl FakeTranscoder {
        fn new(fail: bool) -> Self {
            Self {
                fail,
                calls: RefCell::new(Vec::new()),
            }
        }
    }

    impl Transcoder for &FakeTranscoder {
        fn transcode(&self, request: &TranscodeRequest) -> mediatidy_av::Result<PathBuf> {
            self.calls.borrow_mut().push(request.clone());
            if self.fail {
                return Err(mediatidy_av::Error::tool_failed("ffmpeg", "exit 1"));
            }
            fs::copy(&request.input, &request.output)?;
            Ok(request.output.clone())
        }
    }

    const AAC: &str = r#"{"streams":[{"codec_name":"h264","codec_type":"video"},{"codec_name":"aac","codec_type":"audio"}]}"#;
    const EAC3: &str = r#"{"streams":[{"codec_name":"eac3"}]}"#;

    #[test]
    fn test_already_target_never_converts() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("movie.mkv");
        fs::write(&file, b"movie").unwrap();

        let prober = FakeProber::new(&[("movie.mkv", EAC3)]);
        let transcoder = FakeTranscoder::new(false);
        let audit = CodecAudit::new(&prober, &transcoder, TranscodeSettings::default());

        assert_eq!(audit.probe(&file), ConversionDecision::AlreadyTarget);
        assert_eq!(audit.process_file(&file), FileResult::AlreadyTarget);
        assert!(transcoder.calls.borrow().is_empty());
    }

    #[test]
    fn test_needs_conversion_writes_sibling() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("lost.s01e02.mkv");
        fs::write(&file, b"original bytes").unwrap();

        let prober = FakeProber::new(&[("lost.s01e02.mkv", AAC)]);
        let transcoder = FakeTranscoder::new(false);
        let audit = CodecAudit::new(&prober, &transcoder, TranscodeSettings::default());

        let expected = dir.path().join("lost.s01e02_EAC3.mkv");
        assert_eq!(audit.process_file(&file), FileResult::Converted(expected.clone()));
        assert!(expected.exists());
        assert_eq!(fs::read(&file).unwrap(), b"original bytes");

        let calls = transcoder.calls.borrow();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].target, AudioCodec::Eac3);
        assert!(calls[0].report_progress);
    }

    #[test]
    fn test_probe_failure_is_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("broken.mkv"), b"x").unwrap();
        fs::write(dir.path().join("good.mkv"), b"x").unwrap();

        let prober = FakeProber::new(&[("good.mkv", AAC)]);
        let transcoder = FakeTranscoder::new(false);
        let audit = CodecAudit::new(&prober, &transcoder, TranscodeSettings::default());

        let report = audit.run(dir.path()).unwrap();
        assert_eq!(report.probe_failed, 1);
        assert_eq!(report.converted, 1);
    }

    #[test]
    fn test_failed_conversion_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("movie.mkv");
        fs::write(&file, b"x").unwrap();

        let prober = FakeProber::new(&[("movie.mkv", AAC)]);
        let transcoder = FakeTranscoder::new(true);
        let audit = CodecAudit::new(&prober, &transcoder, TranscodeSettings::default());

        assert!(matches!(audit.process_file(&file), FileResult::Failed(_)));
        assert!(!dir.path().join("movie_EAC3.mkv").exists());
    }

    #[test]
    fn test_walk_skips_samples_and_extensions() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("Show").join("Season 1");
        fs::create_dir_all(&nested).unwrap();
        fs::write(nested.join("show.s01e01.mkv"), b"x").unwrap();
        fs::write(nested.join("show.s01e01.SAMPLE.mkv"), b"x").unwrap();
        fs::write(nested.join("Sample.mp4"), b"x").unwrap();
        fs::write(nested.join("show.nfo"), b"x").unwrap();

        let prober = FakeProber::new(&[
            ("show.s01e01.mkv", EAC3),
            ("show.s01e01.SAMPLE.mkv", AAC),
            ("Sample.mp4", AAC),
        ]);
        let transcoder = FakeTranscoder::new(false);
        let audit = CodecAudit::new(&prober, &transcoder, TranscodeSettings::default());

        let report = audit.run(dir.path()).unwrap();
        assert_eq!(report.already_target, 1);
        assert_eq!(report.skipped, 3);
        assert_eq!(report.converted, 0);

        let probed = prober.calls.borrow();
        assert_eq!(probed.len(), 1);
        assert!(probed.iter().all(|p| !name_contains(p, "sample")));
    }

    #[test]
    fn test_dry_run_does_not_transcode() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("movie.mp4");
        fs::write(&file, b"x").unwrap();

        let prober = FakeProber::new(&[("movie.mp4", AAC)]);
        let transcoder = FakeTranscoder::new(false);
        let mut settings = TranscodeSettings::default();
        settings.dry_run = true;
        let audit = CodecAudit::new(&prober, &transcoder, settings);

        assert_eq!(
            audit.process_file(&file),
            FileResult::WouldConvert(dir.path().join("movie_EAC3.mp4"))
        );
        assert!(transcoder.calls.borrow().is_empty());
    }

    #[test]
    fn test_skip_reason() {
        let prober = FakeProber::new(&[]);
        let transcoder = FakeTranscoder::new(false);
        let audit = CodecAudit::new(&prober, &transcoder, TranscodeSettings::default());

        assert_eq!(audit.skip_reason(Path::new("/m/a.mkv")), None);
        assert_eq!(
            audit.skip_reason(Path::new("/m/a-sample.mkv")),
            Some(SkipReason::Sample)
        );
        assert_eq!(
            audit.skip_reason(Path::new("/m/a.srt")),
            Some(SkipReason::Extension)
        );
        assert_eq!(
            audit.skip_reason(Path::new("/m/a_EAC3.mkv")),
            Some(SkipReason::OwnOutput)
        );
    }

    #[test]
    fn test_own_output_suffix_ignores_case() {
        let prober = FakeProber::new(&[]);
        let transcoder = FakeTranscoder::new(false);
        let audit = CodecAudit::new(&prober, &transcoder, TranscodeSettings::default());

        assert_eq!(
            audit.skip_reason(Path::new("/m/movie_eac3.mkv")),
            Some(SkipReason::OwnOutput)
        );
        assert_eq!(
            audit.skip_reason(Path::new("/m/Movie_Eac3.MKV")),
            Some(SkipReason::OwnOutput)
        );
        assert_eq!(audit.skip_reason(Path::new("/m/eac3_movie.mkv")), None);
    }

    #[test]
    fn test_run_missing_path() {
        let prober = FakeProber::new(&[]);
        let transcoder = FakeTranscoder::new(false);
        let audit = CodecAudit::new(&prober, &transcoder, TranscodeSettings::default());
        assert!(audit.run(Path::new("/nonexistent/dir")).is_err());
    }
}
