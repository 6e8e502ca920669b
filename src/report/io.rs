//! File I/O for run reports

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use super::result::RunReport;

/// Write a report as pretty JSON, creating parent directories as needed
pub fn write_report(report: &RunReport, path: &Path) -> Result<PathBuf> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    let json = serde_json::to_string_pretty(report).context("Failed to serialize run report")?;
    fs::write(path, json)
        .with_context(|| format!("Failed to write report to: {}", path.display()))?;

    Ok(path.to_path_buf())
}
