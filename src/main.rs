//! curl-latency-lens binary entry point

use clap::{CommandFactory, Parser};
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use curl_latency_lens::cli::{commands, Cli};
use curl_latency_lens::probe::ProbeError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose_log { "info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = commands::run::run(cli.run, cli.json, cli.quiet).await {
        let probe_error = e.downcast_ref::<ProbeError>();
        let code = probe_error.map(ProbeError::exit_code).unwrap_or(1);

        eprintln!("{} {:#}", "error:".bright_red().bold(), e);
        if probe_error.is_some_and(ProbeError::is_usage_error) {
            eprintln!();
            eprintln!("{}", Cli::command().render_help());
        }
        std::process::exit(code);
    }
}
