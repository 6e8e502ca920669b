//! Run command implementation
//!
//! Prints the configuration, runs the trials and prints the first-call vs.
//! steady-state summary.

use anyhow::{Context, Result};
use colored::Colorize;
use tabled::{Table, Tabled};
use tracing::info;

use crate::cli::RunArgs;
use crate::config::ProbeConfig;
use crate::probe::{aggregate, ProcessRunner, TrialOrchestrator};
use crate::report::{write_report, RunReport};

/// Run the probe command
pub async fn run(args: RunArgs, json_output: bool, quiet: bool) -> Result<()> {
    info!("Starting run command");

    let config = args.to_builder().build()?;

    if !quiet && !json_output {
        print_settings(&config);
    }

    let orchestrator = TrialOrchestrator::new(ProcessRunner::new(config.timeout_policy()));
    let trial_run = orchestrator.execute(&config).await?;

    let records = trial_run
        .timing_records()
        .context("Failed to parse probe output")?;
    let summary = aggregate(&records, trial_run.requested(), config.average_mode())?;
    let report = RunReport::new(&config, &trial_run, records, summary);

    if let Some(ref path) = args.output {
        write_report(&report, path)?;
        if !quiet && !json_output {
            println!("{} Report written to: {}", "=>".bright_cyan(), path.display());
        }
    }

    if json_output {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", report.summary);

        if report.is_partial() && !quiet {
            println!();
            println!(
                "{} {} of {} calls timed out: {:?}",
                "!".bright_red(),
                report.timed_out_trials.len(),
                report.requested_trials,
                report.timed_out_trials
            );
        }
    }

    trial_run.cleanup();
    Ok(())
}

/// Print the settings the run will use
fn print_settings(config: &ProbeConfig) {
    #[derive(Tabled)]
    struct SettingRow {
        #[tabled(rename = "Setting")]
        name: &'static str,
        #[tabled(rename = "Value")]
        value: String,
    }

    let mut rows = vec![
        SettingRow {
            name: "Curl",
            value: config.cmd().to_string(),
        },
        SettingRow {
            name: "URL to test",
            value: config.url().to_string(),
        },
        SettingRow {
            name: "Count of calls",
            value: config.count().to_string(),
        },
        SettingRow {
            name: "Remote request timeout",
            value: format!("{}ms", config.timeout_ms()),
        },
    ];

    if !config.silent() {
        rows.push(SettingRow {
            name: "Silent mode",
            value: config.silent().to_string(),
        });
        rows.push(SettingRow {
            name: "Log file name",
            value: config.artifact_name().to_string(),
        });
        rows.push(SettingRow {
            name: "Delete logs on exit",
            value: config.delete_artifacts().to_string(),
        });
    }
    if let Some(method) = config.method() {
        rows.push(SettingRow {
            name: "Method",
            value: method.to_string(),
        });
    }
    let headers: Vec<&str> = config.headers().collect();
    if !headers.is_empty() {
        rows.push(SettingRow {
            name: "Headers",
            value: headers.join("\n"),
        });
    }

    println!("{}", "Configuration".bright_cyan().bold());
    println!("{}", Table::new(rows));
    println!();
}
