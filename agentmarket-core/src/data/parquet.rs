//! Parquet I/O for close-price series.
//!
//! Reads the `close` column out of any OHLC parquet file (other columns are
//! ignored) and writes single-column `close` files. Writes are atomic: write
//! to `.tmp`, then rename into place.

use super::DataError;
use polars::prelude::*;
use std::fs;
use std::path::Path;

/// Name of the column the core consumes.
pub const CLOSE_COLUMN: &str = "close";

/// Read the `close` column of a parquet file as `f64`, in file order.
///
/// Integer and `f32` columns are cast to `f64`. A null cell is an error.
pub fn read_close_parquet(path: &Path) -> Result<Vec<f64>, DataError> {
    let file = fs::File::open(path)?;
    let df = ParquetReader::new(file)
        .finish()
        .map_err(|e| DataError::Parquet(format!("read: {e}")))?;

    let column = df
        .column(CLOSE_COLUMN)
        .map_err(|_| DataError::MissingColumn {
            column: CLOSE_COLUMN.to_string(),
        })?
        .cast(&DataType::Float64)
        .map_err(|e| DataError::Parquet(format!("close cast: {e}")))?;
    let close_ca = column
        .f64()
        .map_err(|e| DataError::Parquet(format!("close column type: {e}")))?;

    let n = df.height();
    let mut prices = Vec::with_capacity(n);
    for i in 0..n {
        let value = close_ca
            .get(i)
            .ok_or_else(|| DataError::Parquet(format!("null close at row {i}")))?;
        prices.push(value);
    }
    Ok(prices)
}

/// Write a price series as a single `close` column parquet file.
pub fn write_price_series_parquet(path: &Path, prices: &[f64]) -> Result<(), DataError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let mut df = DataFrame::new(vec![Column::new(CLOSE_COLUMN.into(), prices.to_vec())])
        .map_err(|e| DataError::Parquet(format!("dataframe creation: {e}")))?;

    let tmp_path = path.with_extension("parquet.tmp");
    let file = fs::File::create(&tmp_path)?;
    ParquetWriter::new(file)
        .finish(&mut df)
        .map_err(|e| DataError::Parquet(format!("write parquet: {e}")))?;

    fs::rename(&tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        DataError::Io(e)
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_and_read_close_column() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prices.parquet");
        let prices = vec![100.0, 101.5, 99.25];

        write_price_series_parquet(&path, &prices).unwrap();
        let loaded = read_close_parquet(&path).unwrap();

        assert_eq!(loaded, prices);
        assert!(!path.with_extension("parquet.tmp").exists());
    }

    #[test]
    fn ohlc_file_reads_only_close() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ohlc.parquet");
        let mut df = DataFrame::new(vec![
            Column::new("open".into(), vec![1.0, 2.0]),
            Column::new("high".into(), vec![3.0, 4.0]),
            Column::new("low".into(), vec![0.5, 1.5]),
            Column::new("close".into(), vec![2.0, 3.0]),
        ])
        .unwrap();
        ParquetWriter::new(fs::File::create(&path).unwrap())
            .finish(&mut df)
            .unwrap();

        assert_eq!(read_close_parquet(&path).unwrap(), vec![2.0, 3.0]);
    }

    #[test]
    fn missing_close_column_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("no_close.parquet");
        let mut df = DataFrame::new(vec![Column::new("open".into(), vec![1.0, 2.0])]).unwrap();
        ParquetWriter::new(fs::File::create(&path).unwrap())
            .finish(&mut df)
            .unwrap();

        let err = read_close_parquet(&path).unwrap_err();
        assert!(matches!(err, DataError::MissingColumn { .. }));
    }
}
