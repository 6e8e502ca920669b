//! Artifact parsing: captured probe output to timing records

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use super::args::{TIME_PRETRANSFER, TIME_STARTTRANSFER, TIME_TOTAL};
use super::error::ProbeError;

/// Captured output of one trial
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrialArtifact {
    index: u32,
    path: PathBuf,
}

impl TrialArtifact {
    pub fn new(index: u32, path: impl Into<PathBuf>) -> Self {
        Self {
            index,
            path: path.into(),
        }
    }

    /// Zero-based trial index
    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Timing values of one trial in whole milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimingRecord {
    /// End-to-end duration
    pub total: i64,
    /// Server-side processing window (start-transfer minus pre-transfer)
    pub calc: i64,
}

impl TimingRecord {
    pub fn new(total: i64, calc: i64) -> Self {
        Self { total, calc }
    }
}

/// Read and parse a trial artifact
pub fn parse_artifact(artifact: &TrialArtifact) -> Result<TimingRecord, ProbeError> {
    let content =
        std::fs::read_to_string(artifact.path()).map_err(|source| ProbeError::ArtifactUnreadable {
            path: artifact.path().to_path_buf(),
            source,
        })?;
    parse_timings(&content)
}

/// Parse timing values out of captured probe output
pub fn parse_timings(content: &str) -> Result<TimingRecord, ProbeError> {
    let props = parse_properties(content);

    let pretransfer = seconds_to_ms(&props, TIME_PRETRANSFER)?;
    let starttransfer = seconds_to_ms(&props, TIME_STARTTRANSFER)?;
    let total = seconds_to_ms(&props, TIME_TOTAL)?;

    Ok(TimingRecord::new(total, starttransfer - pretransfer))
}

/// Read `key=value` (or `key:value`) lines; later keys override earlier ones
fn parse_properties(content: &str) -> HashMap<&str, &str> {
    let mut props = HashMap::new();

    for line in content.lines() {
        let line = line.trim_start();
        if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
            continue;
        }

        let (key, value) = match line.find(['=', ':']) {
            Some(pos) => (&line[..pos], &line[pos + 1..]),
            None => (line, ""),
        };
        props.insert(key.trim(), value.trim());
    }

    props
}

fn seconds_to_ms(props: &HashMap<&str, &str>, key: &str) -> Result<i64, ProbeError> {
    let raw = props.get(key).ok_or_else(|| ProbeError::MalformedTiming {
        key: key.to_string(),
        reason: "key not found".to_string(),
    })?;

    parse_seconds_as_ms(&raw.replace(',', ".")).ok_or_else(|| ProbeError::MalformedTiming {
        key: key.to_string(),
        reason: format!("'{}' is not a decimal number of seconds", raw),
    })
}

/// Convert a decimal seconds string to whole milliseconds, truncating.
///
/// Works on the digits directly so values like `0.29` don't lose a
/// millisecond to binary floating point.
fn parse_seconds_as_ms(value: &str) -> Option<i64> {
    let (negative, digits) = match value.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, value.strip_prefix('+').unwrap_or(value)),
    };

    let (int_part, frac_part) = digits.split_once('.').unwrap_or((digits, ""));
    if int_part.is_empty() && frac_part.is_empty() {
        return None;
    }
    if !int_part.bytes().chain(frac_part.bytes()).all(|b| b.is_ascii_digit()) {
        return None;
    }

    let seconds: i64 = if int_part.is_empty() {
        0
    } else {
        int_part.parse().ok()?
    };
    let millis = frac_part
        .bytes()
        .chain(std::iter::repeat(b'0'))
        .take(3)
        .fold(0i64, |acc, b| acc * 10 + i64::from(b - b'0'));

    let ms = seconds.checked_mul(1000)?.checked_add(millis)?;
    Some(if negative { -ms } else { ms })
}
