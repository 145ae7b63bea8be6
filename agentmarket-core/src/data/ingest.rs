//! Reference series loading with format dispatch.

use super::parquet::{read_close_parquet, CLOSE_COLUMN};
use super::{DataError, ReferencePriceSeries};
use serde::Deserialize;
use std::path::Path;

/// One CSV row; every column other than `close` is ignored.
#[derive(Debug, Deserialize)]
struct CloseRow {
    close: f64,
}

/// Load a reference series from a `.parquet` or `.csv` file.
///
/// Only the `close` column is read. The result is validated (non-empty,
/// finite, positive) before it is returned.
pub fn load_reference_series(path: &Path) -> Result<ReferencePriceSeries, DataError> {
    if !path.exists() {
        return Err(DataError::NotFound {
            path: path.to_path_buf(),
        });
    }

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    let prices = match extension.as_deref() {
        Some("parquet") => read_close_parquet(path)?,
        Some("csv") => read_close_csv(path)?,
        _ => {
            return Err(DataError::UnsupportedFormat {
                path: path.to_path_buf(),
            })
        }
    };

    let series = ReferencePriceSeries::new(prices)?;
    tracing::info!(
        path = %path.display(),
        rows = series.len(),
        "loaded reference series"
    );
    Ok(series)
}

/// Read the `close` column of a headed CSV file.
fn read_close_csv(path: &Path) -> Result<Vec<f64>, DataError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| DataError::Csv(e.to_string()))?;

    let headers = reader
        .headers()
        .map_err(|e| DataError::Csv(e.to_string()))?;
    if !headers.iter().any(|h| h == CLOSE_COLUMN) {
        return Err(DataError::MissingColumn {
            column: CLOSE_COLUMN.to_string(),
        });
    }

    let mut prices = Vec::new();
    for (row, record) in reader.deserialize::<CloseRow>().enumerate() {
        let record = record.map_err(|e| DataError::Csv(format!("row {row}: {e}")))?;
        prices.push(record.close);
    }
    Ok(prices)
}
