//! RunReport struct for machine-readable run output

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::{AverageMode, ProbeConfig};
use crate::probe::{Summary, TimingRecord, TrialRun};

/// Everything known about a finished probe run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// Unique identifier of this run
    pub run_id: Uuid,

    /// Normalized target URL
    pub target_url: String,

    /// Probe command that was executed
    pub probe_cmd: String,

    /// Trial count from the configuration
    pub requested_trials: u32,

    /// Indices of trials that timed out
    pub timed_out_trials: Vec<u32>,

    /// Timing records of completed trials, in trial order
    pub records: Vec<TimingRecord>,

    /// Divisor mode used for the steady-state mean
    pub average_mode: AverageMode,

    pub summary: Summary,

    /// UTC timestamp when the report was created
    pub timestamp: DateTime<Utc>,
}

impl RunReport {
    pub fn new(
        config: &ProbeConfig,
        run: &TrialRun,
        records: Vec<TimingRecord>,
        summary: Summary,
    ) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            target_url: config.url().to_string(),
            probe_cmd: config.cmd().to_string(),
            requested_trials: run.requested(),
            timed_out_trials: run.timed_out().to_vec(),
            records,
            average_mode: config.average_mode(),
            summary,
            timestamp: Utc::now(),
        }
    }

    /// Number of trials that completed
    pub fn completed_trials(&self) -> usize {
        self.records.len()
    }

    /// Whether any trial timed out
    pub fn is_partial(&self) -> bool {
        !self.timed_out_trials.is_empty()
    }

    /// Completed trials as a percentage of requested trials
    pub fn success_rate(&self) -> f64 {
        if self.requested_trials == 0 {
            return 0.0;
        }
        (self.completed_trials() as f64 / f64::from(self.requested_trials)) * 100.0
    }
}
