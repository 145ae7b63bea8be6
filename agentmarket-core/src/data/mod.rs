//! Reference price data: loading, validation, statistics.
//!
//! The core consumes only the closing-price column of whatever OHLC source
//! produced the file. Loaders live here; the engine only ever sees a
//! validated [`ReferencePriceSeries`].

pub mod ingest;
pub mod parquet;
pub mod series;
pub mod stats;
pub mod synthetic;

pub use ingest::load_reference_series;
pub use parquet::{read_close_parquet, write_price_series_parquet};
pub use series::ReferencePriceSeries;
pub use synthetic::synthetic_reference;

use std::path::PathBuf;
use thiserror::Error;

/// Structured error types for reference data operations.
///
/// All of these are construction-time failures: a run never starts on
/// malformed input.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("data file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("unsupported data file extension for {} (expected .parquet or .csv)", path.display())]
    UnsupportedFormat { path: PathBuf },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("parquet I/O error: {0}")]
    Parquet(String),

    #[error("csv error: {0}")]
    Csv(String),

    #[error("missing column '{column}'")]
    MissingColumn { column: String },

    #[error("reference series is empty")]
    Empty,

    #[error("invalid price {value} at row {row}: prices must be finite and positive")]
    InvalidValue { row: usize, value: f64 },
}
