//! Command-line interface
//!
//! Flag letters follow curl-tool conventions: `-c` probe command, `-u` URL,
//! `-n` count, `-h` header and so on. Help is only available as `--help`.

pub mod commands;

use clap::{ArgAction, Args, Parser};
use std::path::PathBuf;

use crate::config::{
    AverageMode, ProbeConfig, ProbeConfigBuilder, TimeoutPolicy, DEFAULT_ARTIFACT_NAME,
    DEFAULT_COUNT, DEFAULT_DELETE_ARTIFACTS, DEFAULT_SILENT, DEFAULT_TIMEOUT_MS,
};

/// Measure cold-call vs. steady-state request latency with curl
#[derive(Parser, Debug)]
#[command(
    name = "curl-latency-lens",
    version,
    disable_help_flag = true,
    after_help = "Example:\n  curl-latency-lens -c /usr/bin/curl -u https://localhost:8443/health -n 20"
)]
pub struct Cli {
    /// Print help
    #[arg(long, action = ArgAction::Help)]
    pub help: Option<bool>,

    #[command(flatten)]
    pub run: RunArgs,

    /// Print the run report as JSON instead of text
    #[arg(long)]
    pub json: bool,

    /// Only print the summary
    #[arg(short = 'q', long)]
    pub quiet: bool,

    /// Enable info-level logging (RUST_LOG takes precedence)
    #[arg(long)]
    pub verbose_log: bool,
}

/// Arguments of a probe run
#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Curl command (required)
    #[arg(short = 'c', long = "curl", env = "CURL_LENS_CMD", value_name = "CURL")]
    pub curl: Option<String>,

    /// URL to test (required)
    #[arg(short = 'u', long, env = "CURL_LENS_URL")]
    pub url: Option<String>,

    /// Count of calls, an integer >= 2
    #[arg(short = 'n', long, default_value_t = i64::from(DEFAULT_COUNT), allow_negative_numbers = true)]
    pub count: i64,

    /// Intermediate log file name (one file per call, marked with its index)
    #[arg(short = 'l', long = "log", default_value = DEFAULT_ARTIFACT_NAME)]
    pub log: String,

    /// Delete intermediate log files when the run ends
    #[arg(short = 'd', long = "delete-logs", action = ArgAction::Set, default_value_t = DEFAULT_DELETE_ARTIFACTS)]
    pub delete_logs: bool,

    /// Request method (GET, POST, PUT, ...); passed through unvalidated
    #[arg(short = 'm', long)]
    pub method: Option<String>,

    /// Timeout for a single call in milliseconds
    #[arg(short = 't', long, default_value_t = DEFAULT_TIMEOUT_MS)]
    pub timeout: u64,

    /// Silent mode; hides curl progress output
    #[arg(short = 's', long, action = ArgAction::Set, default_value_t = DEFAULT_SILENT)]
    pub silent: bool,

    /// Curl verbose mode; debug output goes to the call logs
    #[arg(short = 'v', long, action = ArgAction::Set, default_value_t = false)]
    pub verbose: bool,

    /// Request header, can be repeated
    #[arg(short = 'h', long = "header", value_name = "HEADER")]
    pub headers: Vec<String>,

    /// Multipart form field (curl -F), can be repeated
    #[arg(short = 'f', long = "form", value_name = "FIELD")]
    pub form: Vec<String>,

    /// Raw body data such as JSON (curl -d), can be repeated
    #[arg(short = 'b', long = "body", value_name = "DATA")]
    pub body: Vec<String>,

    /// Kill a call that exceeds the timeout instead of leaving it running
    #[arg(long, action = ArgAction::Set, default_value_t = true)]
    pub kill_on_timeout: bool,

    /// Average over completed calls instead of all requested calls
    #[arg(long)]
    pub average_over_completed: bool,

    /// Directory in which the temporary log directory is created
    #[arg(long, default_value = ".")]
    pub log_dir: PathBuf,

    /// Write the run report as JSON to this file
    #[arg(short = 'o', long)]
    pub output: Option<PathBuf>,
}

impl RunArgs {
    /// Map arguments onto a configuration builder
    pub fn to_builder(&self) -> ProbeConfigBuilder {
        let mut builder = ProbeConfig::builder()
            .count(self.count)
            .artifact_name(self.log.clone())
            .delete_artifacts(self.delete_logs)
            .timeout_ms(self.timeout)
            .silent(self.silent)
            .verbose(self.verbose)
            .artifact_dir(self.log_dir.clone())
            .timeout_policy(if self.kill_on_timeout {
                TimeoutPolicy::Kill
            } else {
                TimeoutPolicy::Abandon
            })
            .average_mode(if self.average_over_completed {
                AverageMode::Completed
            } else {
                AverageMode::Requested
            });

        if let Some(ref curl) = self.curl {
            builder = builder.cmd(curl.clone());
        }
        if let Some(ref url) = self.url {
            builder = builder.url(url);
        }
        if let Some(ref method) = self.method {
            builder = builder.method(method.clone());
        }
        for header in &self.headers {
            builder = builder.header(header.clone());
        }
        for field in &self.form {
            builder = builder.form_field(field.clone());
        }
        for field in &self.body {
            builder = builder.body_field(field.clone());
        }

        builder
    }
}
