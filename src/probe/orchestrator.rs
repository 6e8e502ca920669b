//! Trial orchestration
//!
//! Drives the requested number of trials one after another, collects the
//! artifacts of the trials that completed and owns the cleanup of the run's
//! temporary files.

use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::args::build_args;
use super::artifact::{parse_artifact, TimingRecord, TrialArtifact};
use super::error::ProbeError;
use super::runner::{TrialOutcome, TrialRunner};
use super::stats::{aggregate, Summary};
use crate::config::{AverageMode, ProbeConfig};

/// Prefix of the per-run temporary directory
pub const TEMP_DIR_PREFIX: &str = "temp";

/// Files and the directory to release when a run ends.
///
/// Registered files are removed first, then the directory if it is empty.
/// Release runs on drop, so it happens on both success and error paths.
#[derive(Debug, Default)]
pub struct CleanupScope {
    dir: Option<PathBuf>,
    files: Vec<PathBuf>,
}

impl CleanupScope {
    /// Scope rooted at a directory that is removed last
    pub fn for_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: Some(dir.into()),
            files: Vec::new(),
        }
    }

    /// Register a file for removal
    pub fn register(&mut self, path: impl Into<PathBuf>) {
        self.files.push(path.into());
    }

    /// Registered files
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    /// Release everything now. Errors are logged, never returned.
    pub fn release(&mut self) {
        for file in self.files.drain(..) {
            if let Err(e) = std::fs::remove_file(&file) {
                if e.kind() != std::io::ErrorKind::NotFound {
                    warn!("Failed to delete artifact {}: {}", file.display(), e);
                }
            }
        }

        if let Some(dir) = self.dir.take() {
            // Fails while kept artifacts are still inside, which leaves them in place.
            match std::fs::remove_dir(&dir) {
                Ok(()) => debug!("Removed temporary directory {}", dir.display()),
                Err(e) => debug!("Keeping temporary directory {}: {}", dir.display(), e),
            }
        }
    }
}

impl Drop for CleanupScope {
    fn drop(&mut self) {
        self.release();
    }
}

/// Outcome of the trial phase of a run
#[derive(Debug)]
pub struct TrialRun {
    requested: u32,
    artifacts: Vec<TrialArtifact>,
    timed_out: Vec<u32>,
    dir: PathBuf,
    cleanup: CleanupScope,
}

impl TrialRun {
    /// Trial count from the configuration
    pub fn requested(&self) -> u32 {
        self.requested
    }

    /// Artifacts of completed trials, in trial order
    pub fn artifacts(&self) -> &[TrialArtifact] {
        &self.artifacts
    }

    /// Indices of trials that timed out
    pub fn timed_out(&self) -> &[u32] {
        &self.timed_out
    }

    /// Temporary directory holding this run's artifacts
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Parse every artifact into a timing record; the first failure aborts
    pub fn timing_records(&self) -> Result<Vec<TimingRecord>, ProbeError> {
        self.artifacts.iter().map(parse_artifact).collect()
    }

    /// Parse the artifacts and aggregate them into a summary
    pub fn summarize(&self, mode: AverageMode) -> Result<Summary, ProbeError> {
        let records = self.timing_records()?;
        aggregate(&records, self.requested, mode)
    }

    /// Release artifacts and the temporary directory now instead of on drop
    pub fn cleanup(mut self) {
        self.cleanup.release();
    }
}

/// Runs trials sequentially through a [`TrialRunner`]
pub struct TrialOrchestrator<R> {
    runner: R,
}

impl<R: TrialRunner> TrialOrchestrator<R> {
    pub fn new(runner: R) -> Self {
        Self { runner }
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Run `config.count()` trials and collect the completed ones.
    ///
    /// A timed-out trial is logged and skipped. A launch failure aborts the
    /// whole run; the temporary directory is still released.
    pub async fn execute(&self, config: &ProbeConfig) -> Result<TrialRun, ProbeError> {
        let dir = create_run_dir(config.artifact_dir())?;
        let mut cleanup = CleanupScope::for_dir(&dir);
        let args = build_args(config);

        info!(
            url = %config.url(),
            count = config.count(),
            timeout_ms = config.timeout_ms(),
            dir = %dir.display(),
            "Starting probe trials"
        );

        let mut artifacts = Vec::new();
        let mut timed_out = Vec::new();

        for index in 0..config.count() {
            let path = dir.join(artifact_file_name(config.artifact_name(), index));
            if config.delete_artifacts() {
                cleanup.register(&path);
            }

            match self.runner.run(&args, &path, config.timeout()).await? {
                TrialOutcome::Completed => {
                    debug!(trial = index, "Trial completed");
                    artifacts.push(TrialArtifact::new(index, path));
                }
                TrialOutcome::TimedOut => {
                    let diagnostic = ProbeError::TrialTimeout {
                        index,
                        timeout_ms: config.timeout_ms(),
                    };
                    warn!(trial = index, "{}", diagnostic);
                    timed_out.push(index);
                }
            }
        }

        info!(
            completed = artifacts.len(),
            timed_out = timed_out.len(),
            "Probe trials finished"
        );

        Ok(TrialRun {
            requested: config.count(),
            artifacts,
            timed_out,
            dir,
            cleanup,
        })
    }
}

/// File name of the artifact for trial `index`
pub fn artifact_file_name(base: &str, index: u32) -> String {
    format!("{}.{}.log", base, index)
}

fn create_run_dir(parent: &Path) -> Result<PathBuf, ProbeError> {
    let workspace_err = |source: std::io::Error| ProbeError::Workspace {
        path: parent.to_path_buf(),
        source,
    };

    std::fs::create_dir_all(parent).map_err(workspace_err)?;
    let dir = tempfile::Builder::new()
        .prefix(TEMP_DIR_PREFIX)
        .tempdir_in(parent)
        .map_err(workspace_err)?;

    // Lifetime is managed by CleanupScope from here on.
    Ok(dir.keep())
}
