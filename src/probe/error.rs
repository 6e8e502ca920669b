//! Probe run errors

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while configuring, running or aggregating a probe run
#[derive(Debug, Error)]
pub enum ProbeError {
    /// Probe command or target URL was never set
    #[error("Curl path or url is not set")]
    ConfigurationIncomplete,

    /// Trial count below the minimum of two
    #[error("Count should have an integer value >= 2, but it has a value: {0}")]
    InvalidCount(i64),

    /// The probe process could not be started at all
    #[error("Failed to launch probe command '{command}': {source}")]
    LaunchFailure {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// A single trial exceeded its wall-clock budget
    #[error("Trial {index} timed out after {timeout_ms}ms")]
    TrialTimeout { index: u32, timeout_ms: u64 },

    /// Captured artifact could not be read
    #[error("Failed to read artifact {}: {source}", path.display())]
    ArtifactUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Artifact is missing a timing key or holds a non-numeric value
    #[error("Malformed timing value for '{key}': {reason}")]
    MalformedTiming { key: String, reason: String },

    /// Every trial timed out
    #[error("No trials completed successfully")]
    NoSuccessfulTrials,

    /// Only the first trial completed, nothing to average
    #[error("No steady-state samples after the first trial")]
    NoSteadyStateSamples,

    /// Temporary directory or artifact file could not be prepared
    #[error("Artifact workspace error at {}: {source}", path.display())]
    Workspace {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ProbeError {
    /// Check if this error stems from bad or missing configuration
    pub fn is_usage_error(&self) -> bool {
        matches!(
            self,
            ProbeError::ConfigurationIncomplete | ProbeError::InvalidCount(_)
        )
    }

    /// Process exit code for this error
    pub fn exit_code(&self) -> i32 {
        if self.is_usage_error() {
            2
        } else {
            1
        }
    }
}
