//! Integration tests for the probe engine
//!
//! The trial runner is replaced with scripted mocks so these tests run
//! without curl or network access.

use async_trait::async_trait;
use curl_latency_lens::config::{AverageMode, ProbeConfig, ProbeConfigBuilder};
use curl_latency_lens::probe::{
    aggregate, format_mean, ProbeError, TrialOrchestrator, TrialOutcome, TrialRunner,
};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tempfile::TempDir;

/// Render probe output for one trial with the given millisecond timings
fn probe_output(pretransfer_ms: u64, starttransfer_ms: u64, total_ms: u64) -> String {
    format!(
        "{{\"status\":\"ok\"}}\nexitcode=0\njson={{}}\nstdout=\n\
         time_pretransfer={:.6}\ntime_starttransfer={:.6}\ntime_total={:.6}\n",
        pretransfer_ms as f64 / 1000.0,
        starttransfer_ms as f64 / 1000.0,
        total_ms as f64 / 1000.0
    )
}

/// Runner that follows a script of outcomes and writes matching artifacts
struct ScriptedRunner {
    calls: AtomicUsize,
    script: Vec<(TrialOutcome, String)>,
    seen_args: Mutex<Vec<Vec<String>>>,
    seen_paths: Mutex<Vec<PathBuf>>,
}

impl ScriptedRunner {
    fn new(script: Vec<(TrialOutcome, String)>) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            script,
            seen_args: Mutex::new(Vec::new()),
            seen_paths: Mutex::new(Vec::new()),
        }
    }

    /// Every trial completes with identical timings
    fn always_completed(count: usize) -> Self {
        Self::new(
            (0..count)
                .map(|_| (TrialOutcome::Completed, probe_output(5, 25, 40)))
                .collect(),
        )
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TrialRunner for ScriptedRunner {
    async fn run(
        &self,
        args: &[String],
        output: &Path,
        _timeout: Duration,
    ) -> Result<TrialOutcome, ProbeError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen_args.lock().unwrap().push(args.to_vec());
        self.seen_paths.lock().unwrap().push(output.to_path_buf());

        let (outcome, content) = self.script[call].clone();
        if outcome.is_completed() {
            std::fs::write(output, content).unwrap();
        }
        Ok(outcome)
    }
}

/// Runner that always times out
struct TimeoutRunner {
    calls: AtomicUsize,
}

#[async_trait]
impl TrialRunner for TimeoutRunner {
    async fn run(
        &self,
        _args: &[String],
        _output: &Path,
        _timeout: Duration,
    ) -> Result<TrialOutcome, ProbeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(TrialOutcome::TimedOut)
    }
}

/// Runner whose probe binary cannot be started
struct MissingBinaryRunner;

#[async_trait]
impl TrialRunner for MissingBinaryRunner {
    async fn run(
        &self,
        args: &[String],
        _output: &Path,
        _timeout: Duration,
    ) -> Result<TrialOutcome, ProbeError> {
        Err(ProbeError::LaunchFailure {
            command: args[0].clone(),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        })
    }
}

fn builder(dir: &TempDir) -> ProbeConfigBuilder {
    ProbeConfig::builder()
        .cmd("curl")
        .url("http://localhost:8080/health")
        .artifact_dir(dir.path())
}

fn entries(dir: &Path) -> usize {
    std::fs::read_dir(dir).unwrap().count()
}

/// Test: default count produces ten artifacts
#[tokio::test]
async fn test_default_count() {
    let dir = TempDir::new().unwrap();
    let config = builder(&dir).build().unwrap();
    let orchestrator = TrialOrchestrator::new(ScriptedRunner::always_completed(10));

    let run = orchestrator.execute(&config).await.unwrap();

    assert_eq!(run.artifacts().len(), 10);
    assert_eq!(orchestrator.runner().calls(), 10);
}

/// Test: N successful trials produce N artifacts and N runner calls
#[tokio::test]
async fn test_count_matches_artifacts() {
    for count in [2usize, 10, 100] {
        let dir = TempDir::new().unwrap();
        let config = builder(&dir).count(count as i64).build().unwrap();
        let orchestrator = TrialOrchestrator::new(ScriptedRunner::always_completed(count));

        let run = orchestrator.execute(&config).await.unwrap();

        assert_eq!(run.artifacts().len(), count);
        assert_eq!(orchestrator.runner().calls(), count);
        assert_eq!(run.requested() as usize, count);
        assert!(run.timed_out().is_empty());
    }
}

/// Test: every trial receives the same argument vector and its own artifact path
#[tokio::test]
async fn test_args_shared_and_paths_indexed() {
    let dir = TempDir::new().unwrap();
    let config = builder(&dir)
        .count(3)
        .artifact_name("health")
        .header("Accept: */*")
        .build()
        .unwrap();
    let orchestrator = TrialOrchestrator::new(ScriptedRunner::always_completed(3));

    let run = orchestrator.execute(&config).await.unwrap();

    let args = orchestrator.runner().seen_args.lock().unwrap().clone();
    assert!(args.windows(2).all(|w| w[0] == w[1]));
    assert_eq!(args[0].last().unwrap(), "http://localhost:8080/health");

    let paths = orchestrator.runner().seen_paths.lock().unwrap().clone();
    let names: Vec<String> = paths
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["health.0.log", "health.1.log", "health.2.log"]);
    assert!(paths.iter().all(|p| p.parent() == Some(run.dir())));
}

/// Test: all trials timing out leaves nothing to aggregate
#[tokio::test]
async fn test_all_timeouts_fail_aggregation_cleanly() {
    let dir = TempDir::new().unwrap();
    let config = builder(&dir).count(4).build().unwrap();
    let orchestrator = TrialOrchestrator::new(TimeoutRunner {
        calls: AtomicUsize::new(0),
    });

    let run = orchestrator.execute(&config).await.unwrap();

    assert!(run.artifacts().is_empty());
    assert_eq!(run.timed_out(), &[0, 1, 2, 3]);
    assert_eq!(orchestrator.runner().calls.load(Ordering::SeqCst), 4);

    let err = run.summarize(AverageMode::Requested).unwrap_err();
    assert!(matches!(err, ProbeError::NoSuccessfulTrials));
}

/// Test: timed-out trials are skipped and still count in the divisor
#[tokio::test]
async fn test_partial_timeouts_underestimate_mean() {
    let dir = TempDir::new().unwrap();
    let config = builder(&dir).count(5).build().unwrap();
    let orchestrator = TrialOrchestrator::new(ScriptedRunner::new(vec![
        (TrialOutcome::Completed, probe_output(0, 10, 100)),
        (TrialOutcome::TimedOut, String::new()),
        (TrialOutcome::Completed, probe_output(0, 20, 200)),
        (TrialOutcome::TimedOut, String::new()),
        (TrialOutcome::Completed, probe_output(0, 30, 300)),
    ]));

    let run = orchestrator.execute(&config).await.unwrap();
    assert_eq!(run.timed_out(), &[1, 3]);
    assert_eq!(
        run.artifacts().iter().map(|a| a.index()).collect::<Vec<_>>(),
        vec![0, 2, 4]
    );

    let summary = run.summarize(AverageMode::Requested).unwrap();
    assert_eq!(summary.first.total, 100);
    assert_eq!(summary.first.calc, 10);
    assert_eq!(format_mean(summary.then.total), "125");
    assert_eq!(format_mean(summary.then.calc), "12.5");

    let summary = run.summarize(AverageMode::Completed).unwrap();
    assert_eq!(format_mean(summary.then.total), "250");
    assert_eq!(format_mean(summary.then.calc), "25");
}

/// Test: three completed trials, first reported verbatim, rest averaged
#[tokio::test]
async fn test_summary_text() {
    let dir = TempDir::new().unwrap();
    let config = builder(&dir).count(3).build().unwrap();
    let orchestrator = TrialOrchestrator::new(ScriptedRunner::new(vec![
        (TrialOutcome::Completed, probe_output(0, 10, 100)),
        (TrialOutcome::Completed, probe_output(0, 20, 200)),
        (TrialOutcome::Completed, probe_output(0, 30, 300)),
    ]));

    let run = orchestrator.execute(&config).await.unwrap();
    let records = run.timing_records().unwrap();
    let summary = aggregate(&records, config.count(), config.average_mode()).unwrap();

    assert_eq!(
        summary.to_string(),
        "First:\n- total time - 100\n- calculation time - 10\n\
         Then:\n- total time - 250\n- calculation time - 25"
    );
}

/// Test: a malformed artifact aborts aggregation
#[tokio::test]
async fn test_malformed_artifact_is_fatal() {
    let dir = TempDir::new().unwrap();
    let config = builder(&dir).count(2).build().unwrap();
    let orchestrator = TrialOrchestrator::new(ScriptedRunner::new(vec![
        (TrialOutcome::Completed, probe_output(0, 10, 100)),
        (TrialOutcome::Completed, "curl: (6) Could not resolve host\n".to_string()),
    ]));

    let run = orchestrator.execute(&config).await.unwrap();
    let err = run.summarize(AverageMode::Requested).unwrap_err();

    assert!(matches!(err, ProbeError::MalformedTiming { .. }));
}

/// Test: launch failure aborts the run and the temporary directory is released
#[tokio::test]
async fn test_launch_failure_aborts_run() {
    let dir = TempDir::new().unwrap();
    let config = builder(&dir).build().unwrap();
    let orchestrator = TrialOrchestrator::new(MissingBinaryRunner);

    let err = orchestrator.execute(&config).await.unwrap_err();

    assert!(matches!(err, ProbeError::LaunchFailure { ref command, .. } if command == "curl"));
    assert_eq!(entries(dir.path()), 0);
}

/// Test: a very large count does not allocate up front; the first trial still runs
#[tokio::test]
async fn test_huge_count_reaches_first_trial() {
    let dir = TempDir::new().unwrap();
    let config = builder(&dir).count(i64::from(u32::MAX)).build().unwrap();
    let orchestrator = TrialOrchestrator::new(MissingBinaryRunner);

    let err = orchestrator.execute(&config).await.unwrap_err();

    assert!(matches!(err, ProbeError::LaunchFailure { .. }));
    assert_eq!(entries(dir.path()), 0);
}

/// Test: artifacts and the temporary directory are deleted when the run ends
#[tokio::test]
async fn test_artifacts_deleted_after_run() {
    let dir = TempDir::new().unwrap();
    let config = builder(&dir).count(3).build().unwrap();
    let orchestrator = TrialOrchestrator::new(ScriptedRunner::always_completed(3));

    let run = orchestrator.execute(&config).await.unwrap();
    let run_dir = run.dir().to_path_buf();
    assert_eq!(entries(&run_dir), 3);

    drop(run);

    assert!(!run_dir.exists());
    assert_eq!(entries(dir.path()), 0);
}

/// Test: artifacts are kept when deletion is disabled
#[tokio::test]
async fn test_artifacts_kept_when_configured() {
    let dir = TempDir::new().unwrap();
    let config = builder(&dir)
        .count(2)
        .delete_artifacts(false)
        .build()
        .unwrap();
    let orchestrator = TrialOrchestrator::new(ScriptedRunner::always_completed(2));

    let run = orchestrator.execute(&config).await.unwrap();
    let kept: Vec<PathBuf> = run.artifacts().iter().map(|a| a.path().to_path_buf()).collect();
    run.cleanup();

    assert!(kept.iter().all(|p| p.exists()));
}

/// Test: incomplete configuration never reaches the runner
#[test]
fn test_incomplete_config_rejected_before_run() {
    let err = ProbeConfig::builder().url("http://localhost").build().unwrap_err();
    assert!(matches!(err, ProbeError::ConfigurationIncomplete));

    let err = ProbeConfig::builder().cmd("curl").build().unwrap_err();
    assert!(matches!(err, ProbeError::ConfigurationIncomplete));
}

/// Test: counts below two are rejected at configuration time
#[test]
fn test_invalid_counts_rejected() {
    for count in [-1, 0, 1] {
        let err = ProbeConfig::builder()
            .cmd("curl")
            .url("http://localhost")
            .count(count)
            .build()
            .unwrap_err();
        assert!(matches!(err, ProbeError::InvalidCount(_)));
    }
}
