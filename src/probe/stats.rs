//! First-call vs. steady-state statistics

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use super::artifact::TimingRecord;
use super::error::ProbeError;
use crate::config::AverageMode;

/// Mean timing values of the steady-state trials, in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SteadyState {
    pub total: f64,
    pub calc: f64,
}

/// Result of a full probe run: the cold first call and the steady-state mean
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub first: TimingRecord,
    pub then: SteadyState,
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "First:")?;
        writeln!(f, "- total time - {}", self.first.total)?;
        writeln!(f, "- calculation time - {}", self.first.calc)?;
        writeln!(f, "Then:")?;
        writeln!(f, "- total time - {}", format_mean(self.then.total))?;
        write!(f, "- calculation time - {}", format_mean(self.then.calc))
    }
}

/// Aggregate timing records in trial order into a [`Summary`].
///
/// The first record is reported verbatim. The rest are summed and divided by
/// a divisor chosen by `mode`: with [`AverageMode::Requested`] it is
/// `requested_count - 1`, so timed-out trials pull the average down.
pub fn aggregate(
    records: &[TimingRecord],
    requested_count: u32,
    mode: AverageMode,
) -> Result<Summary, ProbeError> {
    let (first, rest) = records.split_first().ok_or(ProbeError::NoSuccessfulTrials)?;

    let divisor = match mode {
        AverageMode::Requested => {
            if requested_count < 2 {
                return Err(ProbeError::InvalidCount(i64::from(requested_count)));
            }
            u64::from(requested_count - 1)
        }
        AverageMode::Completed => {
            if rest.is_empty() {
                return Err(ProbeError::NoSteadyStateSamples);
            }
            rest.len() as u64
        }
    };

    let total_sum: i64 = rest.iter().map(|r| r.total).sum();
    let calc_sum: i64 = rest.iter().map(|r| r.calc).sum();

    debug!(
        samples = rest.len(),
        divisor, total_sum, calc_sum, "Aggregating steady-state samples"
    );

    Ok(Summary {
        first: *first,
        then: SteadyState {
            total: total_sum as f64 / divisor as f64,
            calc: calc_sum as f64 / divisor as f64,
        },
    })
}

/// Format a mean with at most two decimals, dropping trailing zeros
pub fn format_mean(value: f64) -> String {
    let formatted = format!("{:.2}", value);
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    if trimmed == "-0" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}
