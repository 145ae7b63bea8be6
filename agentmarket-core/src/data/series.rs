//! The immutable reference price series.

use super::stats;
use super::DataError;
use std::sync::Arc;

/// Chronologically ordered, strictly positive reference prices.
///
/// Cheap to clone: the values sit behind an `Arc`, so an environment can hand
/// the same series to every engine it builds without copying.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferencePriceSeries {
    prices: Arc<[f64]>,
}

impl ReferencePriceSeries {
    /// Validate and wrap a price vector.
    ///
    /// Rejects an empty vector and any value that is not finite or not > 0.
    pub fn new(prices: Vec<f64>) -> Result<Self, DataError> {
        if prices.is_empty() {
            return Err(DataError::Empty);
        }
        if let Some((row, &value)) = prices
            .iter()
            .enumerate()
            .find(|(_, p)| !p.is_finite() || **p <= 0.0)
        {
            return Err(DataError::InvalidValue { row, value });
        }
        Ok(Self {
            prices: prices.into(),
        })
    }

    /// Wrap prices already known to be non-empty, finite and positive.
    pub(crate) fn from_positive(prices: Vec<f64>) -> Self {
        debug_assert!(!prices.is_empty());
        debug_assert!(prices.iter().all(|p| p.is_finite() && *p > 0.0));
        Self {
            prices: prices.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    /// Always false for a constructed series; kept for API symmetry with slices.
    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.prices
    }

    pub fn get(&self, index: usize) -> Option<f64> {
        self.prices.get(index).copied()
    }

    /// The first `n` prices (or all of them if the series is shorter).
    pub fn head(&self, n: usize) -> &[f64] {
        &self.prices[..n.min(self.prices.len())]
    }

    /// Sample standard deviation of the whole series' percentage changes.
    ///
    /// NaN when fewer than three prices exist.
    pub fn return_volatility(&self) -> f64 {
        stats::pct_change_std(&self.prices)
    }

    /// Mean over `[start, end)`. `None` if the range is empty or out of bounds.
    pub fn window_mean(&self, start: usize, end: usize) -> Option<f64> {
        if start >= end || end > self.prices.len() {
            return None;
        }
        Some(stats::mean(&self.prices[start..end]))
    }
}
