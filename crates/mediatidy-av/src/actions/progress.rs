//! Parsing of ffmpeg's machine-readable progress stream.
//!
//! With `-progress pipe:2` ffmpeg writes blocks of `key=value` lines to
//! stderr, each block terminated by `progress=continue` or `progress=end`.
//! Only the output timestamp is used here, turned into a coarse percentage
//! of the probed duration.

use std::time::Duration;

/// A progress line we care about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressEvent {
    /// Output timestamp reached so far.
    OutTime(Duration),
    /// End of a progress block; `true` once encoding is finished.
    Block { finished: bool },
}

/// A progress update handed to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TranscodeProgress {
    pub out_time: Duration,
    /// Percentage of the total duration, when it is known.
    pub percent: Option<u8>,
    pub finished: bool,
}

/// Parse one stderr line. Returns `None` for anything that is not a
/// usable progress key (including ffmpeg's own diagnostics).
pub fn parse_progress_line(line: &str) -> Option<ProgressEvent> {
    let (key, value) = line.trim().split_once('=')?;
    match key {
        // out_time_ms is in microseconds too.
        "out_time_us" | "out_time_ms" => value
            .parse::<u64>()
            .ok()
            .map(|us| ProgressEvent::OutTime(Duration::from_micros(us))),
        "out_time" => parse_timestamp(value).map(ProgressEvent::OutTime),
        "progress" => Some(ProgressEvent::Block {
            finished: value == "end",
        }),
        _ => None,
    }
}

/// Parse `HH:MM:SS.ffffff`.
fn parse_timestamp(value: &str) -> Option<Duration> {
    let mut parts = value.splitn(3, ':');
    let hours: u64 = parts.next()?.parse().ok()?;
    let minutes: u64 = parts.next()?.parse().ok()?;
    let seconds: f64 = parts.next()?.parse().ok()?;
    if !seconds.is_finite() || seconds < 0.0 {
        return None;
    }
    Some(Duration::from_secs(hours * 3600 + minutes * 60) + Duration::from_secs_f64(seconds))
}

/// Turns progress events into updates at fixed percentage steps.
#[derive(Debug, Clone)]
pub struct ProgressTracker {
    total: Option<Duration>,
    step: u8,
    out_time: Duration,
    last_reported: Option<u8>,
}

impl ProgressTracker {
    /// Track against `total`, reporting every `step` percent.
    pub fn new(total: Option<Duration>, step: u8) -> Self {
        Self {
            total: total.filter(|t| !t.is_zero()),
            step: step.max(1),
            out_time: Duration::ZERO,
            last_reported: None,
        }
    }

    fn percent(&self) -> Option<u8> {
        let total = self.total?;
        let ratio = self.out_time.as_secs_f64() / total.as_secs_f64();
        Some((ratio * 100.0).clamp(0.0, 100.0) as u8)
    }

    /// Feed one event; returns an update when a new step is reached or the
    /// encode finished.
    pub fn observe(&mut self, event: ProgressEvent) -> Option<TranscodeProgress> {
        match event {
            ProgressEvent::OutTime(t) => {
                self.out_time = t;
                None
            }
            ProgressEvent::Block { finished: true } => Some(TranscodeProgress {
                out_time: self.out_time,
                percent: self.total.map(|_| 100),
                finished: true,
            }),
            ProgressEvent::Block { finished: false } => {
                let percent = self.percent()?;
                let bucket = percent - percent % self.step;
                if self.last_reported.is_some_and(|last| bucket <= last) {
                    return None;
                }
                self.last_reported = Some(bucket);
                Some(TranscodeProgress {
                    out_time: self.out_time,
                    percent: Some(bucket),
                    finished: false,
                })
            }
        }
    }
}
