//! Deterministic synthetic reference series.
//!
//! A developer convenience for demos and tests when no historical file is at
//! hand. Not a substitute for real data: the engine's base impact is derived
//! from this series' volatility, so results only describe the synthetic walk.

use super::ReferencePriceSeries;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const START_PRICE: f64 = 100.0;
const MAX_STEP_RETURN: f64 = 0.002;

/// Geometric random walk of `len` prices starting at 100.
///
/// Each step multiplies the previous price by `1 + u`, `u ~ U(-0.2%, 0.2%)`,
/// so every value stays strictly positive. `len == 0` yields a one-point series.
pub fn synthetic_reference(len: usize, seed: u64) -> ReferencePriceSeries {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut prices = Vec::with_capacity(len.max(1));
    let mut price = START_PRICE;
    prices.push(price);
    for _ in 1..len {
        price *= 1.0 + rng.gen_range(-MAX_STEP_RETURN..MAX_STEP_RETURN);
        prices.push(price);
    }
    ReferencePriceSeries::from_positive(prices)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_series() {
        assert_eq!(synthetic_reference(500, 7), synthetic_reference(500, 7));
        assert_ne!(synthetic_reference(500, 7), synthetic_reference(500, 8));
    }

    #[test]
    fn length_and_start() {
        let series = synthetic_reference(1200, 1);
        assert_eq!(series.len(), 1200);
        assert_eq!(series.get(0), Some(100.0));
        assert!(series.return_volatility() > 0.0);
    }

    #[test]
    fn zero_length_is_single_point() {
        assert_eq!(synthetic_reference(0, 1).len(), 1);
    }
}
