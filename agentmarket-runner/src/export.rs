//! Export: CSV, JSON and Parquet artifacts for paths and runs.
//!
//! - **CSV**: price paths (`step,price`) and episode net-worth curves
//! - **JSON**: pretty-printed `EpisodeResult` / `SweepSummary`
//! - **Parquet**: price paths as a single `close` column, loadable again as a
//!   reference series

use std::path::{Path, PathBuf};

use agentmarket_core::data::write_price_series_parquet;
use anyhow::{Context, Result};
use serde::Serialize;

use crate::episode::EpisodeResult;

// ─── JSON export ────────────────────────────────────────────────────

/// Serialize any run summary to pretty JSON.
pub fn export_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).context("failed to serialize summary to JSON")
}

// ─── CSV export ─────────────────────────────────────────────────────

/// Export a price path as CSV with `step` and `price` columns.
///
/// `first_step` is the step index of `prices[0]`.
pub fn export_price_path_csv(prices: &[f64], first_step: usize) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["step", "price"])?;
    for (i, price) in prices.iter().enumerate() {
        wtr.write_record([&(first_step + i).to_string(), &format!("{price:.6}")])?;
    }
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// Export a net-worth curve as CSV with `step` and `net_worth` columns.
pub fn export_curve_csv(curve: &[f64]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["step", "net_worth"])?;
    for (i, net_worth) in curve.iter().enumerate() {
        wtr.write_record([&i.to_string(), &format!("{net_worth:.2}")])?;
    }
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

// ─── Files ──────────────────────────────────────────────────────────

/// Write a price path, picking the format from the extension.
///
/// `.parquet` writes a `close` column; anything else writes CSV.
pub fn write_price_path(path: &Path, prices: &[f64], first_step: usize) -> Result<()> {
    let is_parquet = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("parquet"));

    if is_parquet {
        write_price_series_parquet(path, prices)
            .with_context(|| format!("failed to write {}", path.display()))?;
    } else {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let csv = export_price_path_csv(prices, first_step)?;
        std::fs::write(path, csv).with_context(|| format!("failed to write {}", path.display()))?;
    }
    tracing::info!(path = %path.display(), points = prices.len(), "price path written");
    Ok(())
}

/// Save the artifact set for one episode.
///
/// Creates `episode_{policy}_{timestamp}/` under `output_dir` containing:
/// - `summary.json`: the full `EpisodeResult`
/// - `net_worth.csv`: per-step net worth
///
/// Returns the path to the created directory.
pub fn save_episode_artifacts(result: &EpisodeResult, output_dir: &Path) -> Result<PathBuf> {
    let dirname = format!(
        "episode_{}_{}",
        result.policy,
        result.started_at.format("%Y%m%d_%H%M%S")
    );
    let run_dir = output_dir.join(dirname);
    std::fs::create_dir_all(&run_dir)
        .with_context(|| format!("failed to create artifact dir: {}", run_dir.display()))?;

    std::fs::write(run_dir.join("summary.json"), export_json(result)?)?;
    std::fs::write(
        run_dir.join("net_worth.csv"),
        export_curve_csv(&result.net_worth_curve)?,
    )?;

    Ok(run_dir)
}
