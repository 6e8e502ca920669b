//! Probe argument vector construction

use crate::config::ProbeConfig;

pub const TIME_PRETRANSFER: &str = "time_pretransfer";
pub const TIME_STARTTRANSFER: &str = "time_starttransfer";
pub const TIME_TOTAL: &str = "time_total";

/// Output template written by the probe after every request.
///
/// Each line is a `key=value` pair so the captured output can be read back
/// as a property file. The leading newline separates it from the response body.
pub const OUTPUT_TEMPLATE: &str = "\nexitcode=%{exitcode}\njson=%{json}\nstdout=%{stdout}\ntime_pretransfer=%{time_pretransfer}\ntime_starttransfer=%{time_starttransfer}\ntime_total=%{time_total}\n";

/// Build the full argument vector for one trial, probe path first and URL last
pub fn build_args(config: &ProbeConfig) -> Vec<String> {
    let mut args = vec![
        config.cmd().to_string(),
        "-w".to_string(),
        OUTPUT_TEMPLATE.to_string(),
        "-k".to_string(),
    ];

    if config.silent() {
        args.push("-s".to_string());
    }
    if config.verbose() {
        args.push("-v".to_string());
    }
    if let Some(method) = config.method() {
        args.push("-X".to_string());
        args.push(method.to_string());
    }
    for header in config.headers() {
        args.push("-H".to_string());
        args.push(header.to_string());
    }
    for field in config.form_fields() {
        args.push("-F".to_string());
        args.push(format!("'{}'", field));
    }
    for field in config.body_fields() {
        args.push("-d".to_string());
        args.push(field.to_string());
    }

    args.push(config.url().to_string());
    args
}
