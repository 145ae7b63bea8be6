//! Reference data and config resolution for the runner.
//!
//! A run needs a reference series from one of two places:
//! 1. A `.parquet` or `.csv` file with a `close` column
//! 2. A synthetic geometric walk (developer mode, no file needed)

use std::path::{Path, PathBuf};

use agentmarket_core::data::{load_reference_series, synthetic_reference};
use agentmarket_core::{ReferencePriceSeries, SimConfig};
use anyhow::{Context, Result};

/// Where the reference series comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum ReferenceSource {
    File(PathBuf),
    Synthetic { len: usize, seed: u64 },
}

impl ReferenceSource {
    pub fn is_synthetic(&self) -> bool {
        matches!(self, ReferenceSource::Synthetic { .. })
    }
}

/// Load the reference series a source describes.
pub fn load_reference(source: &ReferenceSource) -> Result<ReferencePriceSeries> {
    match source {
        ReferenceSource::File(path) => load_reference_series(path)
            .with_context(|| format!("failed to load reference series from {}", path.display())),
        ReferenceSource::Synthetic { len, seed } => {
            tracing::info!(len, seed, "using synthetic reference series");
            Ok(synthetic_reference(*len, *seed))
        }
    }
}

/// Load a config file, or the defaults when no path is given.
pub fn load_config(path: Option<&Path>) -> Result<SimConfig> {
    match path {
        Some(path) => SimConfig::from_file(path)
            .with_context(|| format!("failed to load config from {}", path.display())),
        None => Ok(SimConfig::default()),
    }
}

/// Reference points a full episode needs to keep fundamentalists informed
/// until the last step.
pub fn required_reference_len(config: &SimConfig) -> usize {
    config
        .market
        .initial_history
        .max(config.market.fundamentalist.fundamental_period)
        + config.env.simulation_horizon
}

/// Warn when a series will starve fundamentalists before the horizon.
pub fn check_coverage(reference: &ReferencePriceSeries, config: &SimConfig) -> bool {
    let required = required_reference_len(config);
    let covered = reference.len() >= required;
    if !covered {
        tracing::warn!(
            available = reference.len(),
            required,
            "reference series ends before the horizon; fundamentalists go quiet from then on"
        );
    }
    covered
}
