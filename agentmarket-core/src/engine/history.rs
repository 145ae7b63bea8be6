//! Append-only price history.

/// Every finalized price of a run, oldest first.
///
/// Only the engine appends; everyone else reads slices. Nothing is ever
/// removed or reordered, so `len()` grows by exactly one per tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceHistory {
    prices: Vec<f64>,
}

impl PriceHistory {
    /// Start from an initial window of prices. `capacity` reserves room for
    /// the ticks to come.
    pub fn seeded(initial: &[f64], capacity: usize) -> Self {
        let mut prices = Vec::with_capacity(initial.len() + capacity);
        prices.extend_from_slice(initial);
        Self { prices }
    }

    pub fn push(&mut self, price: f64) {
        self.prices.push(price);
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.prices
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }

    pub fn last(&self) -> Option<f64> {
        self.prices.last().copied()
    }
}
