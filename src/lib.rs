//! curl-latency-lens
//!
//! Measures how the first request to an endpoint compares with the requests
//! that follow it. Each request is one run of curl (or a compatible binary)
//! whose timing variables are captured and aggregated.
//!
//! # Modules
//!
//! - [`config`]: validated, immutable run configuration
//! - [`probe`]: argument building, trial execution, parsing and statistics
//! - [`report`]: serializable run reports
//! - [`cli`]: command-line surface

pub mod cli;
pub mod config;
pub mod probe;
pub mod report;

pub use config::{AverageMode, ProbeConfig, ProbeConfigBuilder, TimeoutPolicy};
pub use probe::{ProbeError, Summary, TimingRecord, TrialOrchestrator, TrialRunner};
pub use report::RunReport;
