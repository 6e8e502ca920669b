//! Probe execution engine
//!
//! Repeatedly runs an HTTP probe (curl or a compatible binary) against one
//! URL and turns the captured timings into a first-call vs. steady-state
//! summary.
//!
//! # Data Flow
//!
//! ```text
//! ProbeConfig ──► build_args ──► TrialOrchestrator ──► TrialRunner (×N)
//!                                       │
//!                                       ▼
//!                               TrialArtifact list
//!                                       │
//!                                       ▼
//!                  parse_artifact ──► TimingRecord ──► aggregate ──► Summary
//! ```
//!
//! Trials run strictly one after another. A timed-out trial is skipped and
//! the run goes on; a probe that cannot be launched aborts the run.

pub mod args;
pub mod artifact;
pub mod error;
pub mod orchestrator;
pub mod runner;
pub mod stats;

pub use args::{build_args, OUTPUT_TEMPLATE};
pub use artifact::{parse_artifact, parse_timings, TimingRecord, TrialArtifact};
pub use error::ProbeError;
pub use orchestrator::{CleanupScope, TrialOrchestrator, TrialRun};
pub use runner::{ProcessRunner, TrialOutcome, TrialRunner};
pub use stats::{aggregate, format_mean, SteadyState, Summary};
