//! JSON report output.
//!
//! One file per run, grouped by ticker code:
//! `{json_output_dir}/{code}/{date_from}_{date_to}.json`. A rerun over the
//! same window overwrites the earlier file.

use crate::models::NewsReport;
use crate::outputs::window_stem;
use std::error::Error;
use tokio::fs;
use tracing::{error, info, instrument};

/// Write a [`NewsReport`] and return the path written.
#[instrument(level = "info", skip_all, fields(json_output_dir = %json_output_dir, code = %report.code))]
pub async fn write_report(
    report: &NewsReport,
    json_output_dir: &str,
) -> Result<String, Box<dyn Error>> {
    let json = serde_json::to_string_pretty(report)?;

    let full_json_dir = format!("{}/{}", json_output_dir.trim_end_matches('/'), report.code);
    info!(%full_json_dir, "Ensuring JSON directory exists");
    if let Err(e) = fs::create_dir_all(&full_json_dir).await {
        error!(%full_json_dir, error = %e, "Failed to create JSON dir");
        return Err(e.into());
    }

    let output_json_filename = format!("{}/{}.json", full_json_dir, window_stem(report));
    fs::write(&output_json_filename, json).await?;
    info!(path = %output_json_filename, articles = report.articles.len(), "Wrote JSON report");

    Ok(output_json_filename)
}
