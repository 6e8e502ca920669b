//! Probe run configuration
//!
//! [`ProbeConfig`] is immutable once built. All values go through
//! [`ProbeConfigBuilder`], which validates required fields and the trial
//! count in a single [`ProbeConfigBuilder::build`] step.

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::probe::ProbeError;

/// Default number of trials per run
pub const DEFAULT_COUNT: u32 = 10;

/// Default per-trial timeout in milliseconds
pub const DEFAULT_TIMEOUT_MS: u64 = 10 * 1000;

/// Probe progress output is hidden by default
pub const DEFAULT_SILENT: bool = true;

/// Artifacts are deleted when the run ends by default
pub const DEFAULT_DELETE_ARTIFACTS: bool = true;

/// Default base name for per-trial artifact files
pub const DEFAULT_ARTIFACT_NAME: &str = "curl";

/// Smallest accepted trial count: one first sample plus one steady-state sample
pub const MIN_COUNT: i64 = 2;

/// What happens to a probe process that outlives its timeout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeoutPolicy {
    /// Terminate and reap the process
    #[default]
    Kill,
    /// Leave the process running in the background
    Abandon,
}

/// Divisor used for the steady-state average
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AverageMode {
    /// Requested trial count minus one; timed-out trials still count
    #[default]
    Requested,
    /// Completed trial count minus one
    Completed,
}

/// Validated configuration for one probe run
#[derive(Debug, Clone)]
pub struct ProbeConfig {
    cmd: String,
    url: String,
    count: u32,
    timeout_ms: u64,
    silent: bool,
    verbose: bool,
    method: Option<String>,
    artifact_name: String,
    delete_artifacts: bool,
    headers: IndexSet<String>,
    form_fields: IndexSet<String>,
    body_fields: IndexSet<String>,
    timeout_policy: TimeoutPolicy,
    average_mode: AverageMode,
    artifact_dir: PathBuf,
}

impl ProbeConfig {
    /// Start a new builder with default settings
    pub fn builder() -> ProbeConfigBuilder {
        ProbeConfigBuilder::default()
    }

    /// Path of the probe command
    pub fn cmd(&self) -> &str {
        &self.cmd
    }

    /// Normalized target URL
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Requested trial count (always >= 2)
    pub fn count(&self) -> u32 {
        self.count
    }

    /// Per-trial timeout in milliseconds
    pub fn timeout_ms(&self) -> u64 {
        self.timeout_ms
    }

    /// Per-trial timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn silent(&self) -> bool {
        self.silent
    }

    pub fn verbose(&self) -> bool {
        self.verbose
    }

    /// HTTP method override, if any
    pub fn method(&self) -> Option<&str> {
        self.method.as_deref()
    }

    /// Base name of artifact files
    pub fn artifact_name(&self) -> &str {
        &self.artifact_name
    }

    pub fn delete_artifacts(&self) -> bool {
        self.delete_artifacts
    }

    /// Request headers in insertion order
    pub fn headers(&self) -> impl Iterator<Item = &str> {
        self.headers.iter().map(String::as_str)
    }

    /// Multipart form fields in insertion order
    pub fn form_fields(&self) -> impl Iterator<Item = &str> {
        self.form_fields.iter().map(String::as_str)
    }

    /// Raw body fields in insertion order
    pub fn body_fields(&self) -> impl Iterator<Item = &str> {
        self.body_fields.iter().map(String::as_str)
    }

    pub fn timeout_policy(&self) -> TimeoutPolicy {
        self.timeout_policy
    }

    pub fn average_mode(&self) -> AverageMode {
        self.average_mode
    }

    /// Parent directory for the per-run temporary directory
    pub fn artifact_dir(&self) -> &Path {
        &self.artifact_dir
    }
}

/// Staged builder for [`ProbeConfig`]
///
/// Setters never fail. Validation happens once, in [`build`](Self::build).
#[derive(Debug, Clone)]
pub struct ProbeConfigBuilder {
    cmd: Option<String>,
    url: Option<String>,
    count: i64,
    timeout_ms: u64,
    silent: bool,
    verbose: bool,
    method: Option<String>,
    artifact_name: String,
    delete_artifacts: bool,
    headers: IndexSet<String>,
    form_fields: IndexSet<String>,
    body_fields: IndexSet<String>,
    timeout_policy: TimeoutPolicy,
    average_mode: AverageMode,
    artifact_dir: PathBuf,
}

impl Default for ProbeConfigBuilder {
    fn default() -> Self {
        Self {
            cmd: None,
            url: None,
            count: i64::from(DEFAULT_COUNT),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            silent: DEFAULT_SILENT,
            verbose: false,
            method: None,
            artifact_name: DEFAULT_ARTIFACT_NAME.to_string(),
            delete_artifacts: DEFAULT_DELETE_ARTIFACTS,
            headers: IndexSet::new(),
            form_fields: IndexSet::new(),
            body_fields: IndexSet::new(),
            timeout_policy: TimeoutPolicy::default(),
            average_mode: AverageMode::default(),
            artifact_dir: PathBuf::from("."),
        }
    }
}

impl ProbeConfigBuilder {
    pub fn cmd(mut self, cmd: impl Into<String>) -> Self {
        self.cmd = Some(cmd.into());
        self
    }

    /// Set the target URL; it is trimmed and spaces are percent-encoded
    pub fn url(mut self, url: impl AsRef<str>) -> Self {
        self.url = Some(normalize_url(url.as_ref()));
        self
    }

    /// Set the trial count; values below 2 are rejected by `build`
    pub fn count(mut self, count: i64) -> Self {
        self.count = count;
        self
    }

    pub fn timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn silent(mut self, silent: bool) -> Self {
        self.silent = silent;
        self
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    pub fn artifact_name(mut self, name: impl Into<String>) -> Self {
        self.artifact_name = name.into();
        self
    }

    pub fn delete_artifacts(mut self, delete: bool) -> Self {
        self.delete_artifacts = delete;
        self
    }

    /// Add a header; exact duplicates are ignored
    pub fn header(mut self, header: impl Into<String>) -> Self {
        self.headers.insert(header.into());
        self
    }

    /// Add a multipart form field; exact duplicates are ignored
    pub fn form_field(mut self, field: impl Into<String>) -> Self {
        self.form_fields.insert(field.into());
        self
    }

    /// Add a raw body field; exact duplicates are ignored
    pub fn body_field(mut self, field: impl Into<String>) -> Self {
        self.body_fields.insert(field.into());
        self
    }

    pub fn timeout_policy(mut self, policy: TimeoutPolicy) -> Self {
        self.timeout_policy = policy;
        self
    }

    pub fn average_mode(mut self, mode: AverageMode) -> Self {
        self.average_mode = mode;
        self
    }

    pub fn artifact_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.artifact_dir = dir.into();
        self
    }

    /// Whether both required values (command and URL) are set
    pub fn is_ready(&self) -> bool {
        self.cmd.is_some() && self.url.is_some()
    }

    /// Validate and produce an immutable configuration
    pub fn build(self) -> Result<ProbeConfig, ProbeError> {
        if self.count < MIN_COUNT {
            return Err(ProbeError::InvalidCount(self.count));
        }
        let count = u32::try_from(self.count).map_err(|_| ProbeError::InvalidCount(self.count))?;

        let (Some(cmd), Some(url)) = (self.cmd, self.url) else {
            return Err(ProbeError::ConfigurationIncomplete);
        };

        Ok(ProbeConfig {
            cmd,
            url,
            count,
            timeout_ms: self.timeout_ms,
            silent: self.silent,
            verbose: self.verbose,
            method: self.method,
            artifact_name: self.artifact_name,
            delete_artifacts: self.delete_artifacts,
            headers: self.headers,
            form_fields: self.form_fields,
            body_fields: self.body_fields,
            timeout_policy: self.timeout_policy,
            average_mode: self.average_mode,
            artifact_dir: self.artifact_dir,
        })
    }
}

/// Trim surrounding whitespace and percent-encode interior spaces
pub fn normalize_url(url: &str) -> String {
    url.trim().replace(' ', "%20")
}
