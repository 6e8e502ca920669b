//! Trial runner: launches one probe process per trial

use async_trait::async_trait;
use std::fs::File;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, warn};

use super::error::ProbeError;
use crate::config::TimeoutPolicy;

/// How a single trial ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrialOutcome {
    /// Process exited within the timeout, whatever its exit code
    Completed,
    /// Timeout elapsed first; the captured output is not trusted
    TimedOut,
}

impl TrialOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, TrialOutcome::Completed)
    }
}

/// Runs one trial and captures its combined output into a file
#[async_trait]
pub trait TrialRunner: Send + Sync {
    /// Run the probe with `args` (program first), writing stdout and stderr
    /// to `output`, and wait at most `timeout` for it to exit.
    ///
    /// Launch failures are returned as errors; a timeout is an outcome.
    async fn run(
        &self,
        args: &[String],
        output: &Path,
        timeout: Duration,
    ) -> Result<TrialOutcome, ProbeError>;
}

/// Runs the probe as a real subprocess
#[derive(Debug, Clone, Default)]
pub struct ProcessRunner {
    policy: TimeoutPolicy,
}

impl ProcessRunner {
    pub fn new(policy: TimeoutPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> TimeoutPolicy {
        self.policy
    }
}

#[async_trait]
impl TrialRunner for ProcessRunner {
    async fn run(
        &self,
        args: &[String],
        output: &Path,
        timeout: Duration,
    ) -> Result<TrialOutcome, ProbeError> {
        let (program, rest) = args.split_first().ok_or_else(|| ProbeError::LaunchFailure {
            command: String::new(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "empty argument vector"),
        })?;

        let workspace_err = |source: std::io::Error| ProbeError::Workspace {
            path: output.to_path_buf(),
            source,
        };
        let stdout = File::create(output).map_err(workspace_err)?;
        let stderr = stdout.try_clone().map_err(workspace_err)?;

        let mut child = Command::new(program)
            .args(rest)
            .stdin(Stdio::null())
            .stdout(Stdio::from(stdout))
            .stderr(Stdio::from(stderr))
            .spawn()
            .map_err(|source| ProbeError::LaunchFailure {
                command: program.clone(),
                source,
            })?;

        debug!(pid = ?child.id(), output = %output.display(), "Probe process started");

        match tokio::time::timeout(timeout, child.wait()).await {
            Ok(Ok(status)) => {
                debug!(exit_code = ?status.code(), "Probe process exited");
                Ok(TrialOutcome::Completed)
            }
            Ok(Err(source)) => Err(ProbeError::LaunchFailure {
                command: program.clone(),
                source,
            }),
            Err(_) => {
                match self.policy {
                    TimeoutPolicy::Kill => {
                        if let Err(e) = child.kill().await {
                            warn!("Failed to kill timed-out probe process: {}", e);
                        }
                    }
                    TimeoutPolicy::Abandon => {
                        debug!(pid = ?child.id(), "Abandoning timed-out probe process");
                    }
                }
                Ok(TrialOutcome::TimedOut)
            }
        }
    }
}
