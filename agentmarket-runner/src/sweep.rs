//! Multi-seed simulation sweeps.
//!
//! Runs `runs` independent engines of `steps` ticks each. Run `i` uses the
//! seed `SeedHierarchy::run_seed(i)` of the master seed, so results do not
//! depend on how rayon schedules the work.

use agentmarket_core::data::stats::{mean, pct_change_std, sample_std};
use agentmarket_core::{MarketConfig, MarketEngine, ReferencePriceSeries, SeedHierarchy};
use anyhow::{bail, Context, Result};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Summary of one simulated path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathSummary {
    pub run: u64,
    pub seed: u64,
    pub start_price: f64,
    pub final_price: f64,
    pub min_price: f64,
    pub max_price: f64,
    /// Sample std of tick-to-tick percentage changes, start price included.
    /// `None` for paths of fewer than two ticks.
    pub realized_volatility: Option<f64>,
    pub reverted_ticks: u64,
}

impl PathSummary {
    pub fn total_return(&self) -> f64 {
        self.final_price / self.start_price - 1.0
    }
}

/// Aggregate over every path of a sweep. Always holds at least one path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepSummary {
    pub master_seed: u64,
    pub runs: usize,
    pub steps: usize,
    pub mean_final_price: f64,
    /// `None` for a single run.
    pub std_final_price: Option<f64>,
    pub min_final_price: f64,
    pub max_final_price: f64,
    /// Mean over the paths whose volatility is defined.
    pub mean_realized_volatility: Option<f64>,
    pub total_reverted_ticks: u64,
    pub paths: Vec<PathSummary>,
}

impl SweepSummary {
    fn from_paths(master_seed: u64, steps: usize, paths: Vec<PathSummary>) -> Self {
        let finals: Vec<f64> = paths.iter().map(|p| p.final_price).collect();
        let vols: Vec<f64> = paths.iter().filter_map(|p| p.realized_volatility).collect();
        Self {
            master_seed,
            runs: paths.len(),
            steps,
            mean_final_price: mean(&finals),
            std_final_price: defined(sample_std(&finals)),
            min_final_price: finals.iter().copied().fold(f64::INFINITY, f64::min),
            max_final_price: finals.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            mean_realized_volatility: defined(mean(&vols)),
            total_reverted_ticks: paths.iter().map(|p| p.reverted_ticks).sum(),
            paths,
        }
    }
}

/// Independent engine runs over one reference series.
#[derive(Debug, Clone)]
pub struct SimulationSweep {
    reference: ReferencePriceSeries,
    market: MarketConfig,
    runs: usize,
    steps: usize,
    seeds: SeedHierarchy,
    parallel: bool,
}

impl SimulationSweep {
    /// Defaults: 10 runs of 1000 ticks, master seed 0, parallel.
    pub fn new(reference: ReferencePriceSeries, market: MarketConfig) -> Self {
        Self {
            reference,
            market,
            runs: 10,
            steps: 1000,
            seeds: SeedHierarchy::new(0),
            parallel: true,
        }
    }

    pub fn with_runs(mut self, runs: usize) -> Self {
        self.runs = runs;
        self
    }

    pub fn with_steps(mut self, steps: usize) -> Self {
        self.steps = steps;
        self
    }

    pub fn with_master_seed(mut self, master_seed: u64) -> Self {
        self.seeds = SeedHierarchy::new(master_seed);
        self
    }

    pub fn with_parallelism(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Run every path and aggregate. Fails for zero runs.
    pub fn run(&self) -> Result<SweepSummary> {
        if self.runs == 0 {
            bail!("a sweep needs at least one run");
        }
        tracing::info!(
            runs = self.runs,
            steps = self.steps,
            master_seed = self.seeds.master_seed(),
            parallel = self.parallel,
            "starting sweep"
        );

        let indices: Vec<u64> = (0..self.runs as u64).collect();
        let paths: Vec<PathSummary> = if self.parallel {
            indices
                .par_iter()
                .map(|&run| self.run_path(run))
                .collect::<Result<Vec<_>>>()?
        } else {
            indices
                .iter()
                .map(|&run| self.run_path(run))
                .collect::<Result<Vec<_>>>()?
        };

        Ok(SweepSummary::from_paths(
            self.seeds.master_seed(),
            self.steps,
            paths,
        ))
    }

    /// Simulate the `run`-th path.
    pub fn run_path(&self, run: u64) -> Result<PathSummary> {
        let seed = self.seeds.run_seed(run);
        let market = self.market.clone().with_seed(seed);
        let mut engine = MarketEngine::new(self.reference.clone(), market)
            .with_context(|| format!("failed to build engine for run {run}"))?;
        engine.run(self.steps);

        // The last seeded price anchors the path.
        let history = engine.price_history();
        let path = &history[engine.seed_len() - 1..];
        let start_price = path[0];

        Ok(PathSummary {
            run,
            seed,
            start_price,
            final_price: engine.current_price(),
            min_price: path.iter().copied().fold(f64::INFINITY, f64::min),
            max_price: path.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            realized_volatility: defined(pct_change_std(path)),
            reverted_ticks: engine.reverted_ticks(),
        })
    }
}

/// Statistics that are undefined for too few samples come back as NaN.
fn defined(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use agentmarket_core::data::synthetic_reference;

    fn sweep() -> SimulationSweep {
        SimulationSweep::new(synthetic_reference(600, 1), MarketConfig::default())
            .with_runs(4)
            .with_steps(100)
            .with_master_seed(77)
    }

    #[test]
    fn parallel_matches_sequential() {
        let parallel = sweep().run().unwrap();
        let sequential = sweep().with_parallelism(false).run().unwrap();
        assert_eq!(parallel, sequential);
    }

    #[test]
    fn paths_use_distinct_seeds() {
        let summary = sweep().run().unwrap();
        assert_eq!(summary.runs, 4);
        assert_eq!(summary.paths.len(), 4);
        let mut seeds: Vec<u64> = summary.paths.iter().map(|p| p.seed).collect();
        seeds.dedup();
        assert_eq!(seeds.len(), 4);
        for (i, path) in summary.paths.iter().enumerate() {
            assert_eq!(path.run, i as u64);
            assert_eq!(path.seed, SeedHierarchy::new(77).run_seed(i as u64));
        }
    }

    #[test]
    fn summary_bounds_are_consistent() {
        let summary = sweep().run().unwrap();
        assert!(summary.min_final_price <= summary.mean_final_price);
        assert!(summary.mean_final_price <= summary.max_final_price);
        for path in &summary.paths {
            assert!(path.min_price <= path.final_price && path.final_price <= path.max_price);
            assert!(path.min_price <= path.start_price && path.start_price <= path.max_price);
            assert!(path.realized_volatility.is_some_and(f64::is_finite));
            assert!(path.total_return().is_finite());
        }
    }

    #[test]
    fn zero_runs_is_rejected() {
        let err = sweep().with_runs(0).run().unwrap_err();
        assert!(err.to_string().contains("at least one run"));
    }

    #[test]
    fn single_run_has_no_spread() {
        let summary = sweep().with_runs(1).run().unwrap();
        assert_eq!(summary.runs, 1);
        assert_eq!(summary.std_final_price, None);
        assert_eq!(summary.mean_final_price, summary.paths[0].final_price);
        assert_eq!(summary.min_final_price, summary.max_final_price);
        assert!(summary.mean_realized_volatility.is_some());
    }

    #[test]
    fn zero_steps_leave_volatility_undefined() {
        let summary = sweep().with_steps(0).run().unwrap();
        for path in &summary.paths {
            assert_eq!(path.realized_volatility, None);
            assert_eq!(path.final_price, path.start_price);
        }
        assert_eq!(summary.mean_realized_volatility, None);
    }

    #[test]
    fn run_path_is_reproducible() {
        let sweep = sweep();
        assert_eq!(sweep.run_path(2).unwrap(), sweep.run_path(2).unwrap());
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(16))]

            #[test]
            fn path_extremes_bracket_every_price(master_seed in any::<u64>(), run in 0u64..1000) {
                let sweep = SimulationSweep::new(synthetic_reference(400, 3), MarketConfig::default())
                    .with_steps(60)
                    .with_master_seed(master_seed);
                let path = sweep.run_path(run).unwrap();
                prop_assert!(path.min_price > 0.0);
                prop_assert!(path.min_price <= path.final_price);
                prop_assert!(path.final_price <= path.max_price);
                prop_assert_eq!(path.seed, SeedHierarchy::new(master_seed).run_seed(run));
            }
        }
    }
}
