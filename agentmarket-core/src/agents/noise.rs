//! Noise trader: uniform random demand.

use rand::Rng;

/// Draws its demand uniformly from {-1, 0, +1} every tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NoiseTrader {
    demand: f64,
}

impl NoiseTrader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn demand(&self) -> f64 {
        self.demand
    }

    pub fn step<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.demand = rng.gen_range(-1i32..=1) as f64;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn draws_every_outcome_and_nothing_else() {
        let mut trader = NoiseTrader::new();
        let mut rng = StdRng::seed_from_u64(21);
        let mut counts = [0usize; 3];
        for _ in 0..3000 {
            trader.step(&mut rng);
            let d = trader.demand();
            assert!(d == -1.0 || d == 0.0 || d == 1.0, "unexpected demand {d}");
            counts[(d + 1.0) as usize] += 1;
        }
        // Roughly uniform: each bucket well above a degenerate share.
        assert!(counts.iter().all(|&c| c > 800), "counts {counts:?}");
    }

    #[test]
    fn deterministic_under_seed() {
        let mut a = NoiseTrader::new();
        let mut b = NoiseTrader::new();
        let mut rng_a = StdRng::seed_from_u64(4);
        let mut rng_b = StdRng::seed_from_u64(4);
        for _ in 0..50 {
            a.step(&mut rng_a);
            b.step(&mut rng_b);
            assert_eq!(a.demand(), b.demand());
        }
    }
}
