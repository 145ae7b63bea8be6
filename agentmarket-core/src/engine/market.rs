//! The market engine: agents, price history, and the tick pipeline.

use super::history::PriceHistory;
use super::impact::{base_impact, clamp_demand, price_factor, recalibrate};
use crate::agents::{Agent, MarketView};
use crate::config::{ConfigError, MarketConfig};
use crate::data::ReferencePriceSeries;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

/// What happened during one tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TickReport {
    /// Engine ticks completed, this one included.
    pub tick: u64,
    pub trader_demand: f64,
    pub maker_demand: f64,
    /// Aggregate demand after clamping.
    pub total_demand: f64,
    pub impact_factor: f64,
    /// Price appended to history at the end of the tick.
    pub price: f64,
    /// Whether this tick's price change was discarded.
    pub reverted: bool,
}

/// Agent-based price formation over a reference series.
///
/// Owns the single random source of a run: the decision order shuffle, every
/// agent draw, and the noise term all come from it, so a fixed seed replays
/// a run exactly.
#[derive(Debug, Clone)]
pub struct MarketEngine {
    reference: ReferencePriceSeries,
    config: MarketConfig,
    agents: Vec<Agent>,
    /// Indices of trader agents, reshuffled every tick.
    decision_order: Vec<usize>,
    history: PriceHistory,
    current_price: f64,
    step_count: usize,
    ticks: u64,
    base_impact: f64,
    impact_factor: f64,
    reverted_ticks: u64,
    noise: Normal<f64>,
    rng: StdRng,
}

impl MarketEngine {
    /// Build an engine whose history is seeded with the first
    /// `initial_history` reference prices. The last of those is the current
    /// price.
    pub fn new(reference: ReferencePriceSeries, config: MarketConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let noise = Normal::new(0.0, config.price_noise_std).map_err(|e| ConfigError::Invalid {
            field: "price_noise_std",
            reason: e.to_string(),
        })?;

        let seed = reference.head(config.initial_history);
        let history = PriceHistory::seeded(seed, 1024);
        let current_price = history.last().ok_or_else(|| ConfigError::Invalid {
            field: "initial_history",
            reason: "reference series yields no seed prices".into(),
        })?;

        let agents = Agent::population(&config);
        let decision_order = agents
            .iter()
            .enumerate()
            .filter(|(_, a)| a.is_trader())
            .map(|(i, _)| i)
            .collect();

        let base_impact = base_impact(&reference);
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Ok(Self {
            step_count: history.len(),
            reference,
            config,
            agents,
            decision_order,
            history,
            current_price,
            ticks: 0,
            base_impact,
            impact_factor: base_impact,
            reverted_ticks: 0,
            noise,
            rng,
        })
    }

    /// Advance one tick.
    pub fn step(&mut self) -> TickReport {
        // Decision phase.
        self.decision_order.shuffle(&mut self.rng);
        let view = MarketView {
            price_history: self.history.as_slice(),
            current_price: self.current_price,
            step: self.step_count,
            reference: &self.reference,
        };
        for &index in &self.decision_order {
            self.agents[index].step(&view, &mut self.rng);
        }

        let trader_demand: f64 = self
            .agents
            .iter()
            .filter(|a| a.is_trader())
            .map(Agent::demand)
            .sum();

        // Maker reaction.
        let mut maker_demand = 0.0;
        for maker in self.agents.iter_mut().filter(|a| !a.is_trader()) {
            maker.act(trader_demand);
            maker_demand += maker.demand();
        }

        self.impact_factor = recalibrate(self.base_impact, self.history.as_slice());

        let total_demand = clamp_demand(trader_demand + maker_demand);
        let mut price = self.current_price;
        if let Some(factor) = price_factor(total_demand, self.impact_factor) {
            price *= factor;
        }
        if is_valid_price(price) {
            price *= 1.0 + self.noise.sample(&mut self.rng);
        }

        let reverted = !is_valid_price(price);
        if reverted {
            let last = self.history.last().unwrap_or(self.current_price);
            tracing::debug!(
                tick = self.ticks + 1,
                discarded = price,
                retained = last,
                "price update discarded"
            );
            price = last;
            self.reverted_ticks += 1;
        }

        self.current_price = price;
        self.history.push(price);
        self.step_count += 1;
        self.ticks += 1;

        TickReport {
            tick: self.ticks,
            trader_demand,
            maker_demand,
            total_demand,
            impact_factor: self.impact_factor,
            price,
            reverted,
        }
    }

    /// Advance `n` ticks.
    pub fn run(&mut self, n: usize) -> Vec<TickReport> {
        (0..n).map(|_| self.step()).collect()
    }

    pub fn current_price(&self) -> f64 {
        self.current_price
    }

    pub fn price_history(&self) -> &[f64] {
        self.history.as_slice()
    }

    /// Absolute time index into the reference series. Starts at the seeded
    /// history length.
    pub fn step_count(&self) -> usize {
        self.step_count
    }

    /// Ticks since construction.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Number of prices the history was seeded with.
    pub fn seed_len(&self) -> usize {
        self.history.len() - self.ticks as usize
    }

    /// Prices produced by ticks, excluding the seeded history.
    pub fn simulated_prices(&self) -> &[f64] {
        &self.history.as_slice()[self.seed_len()..]
    }

    pub fn base_impact(&self) -> f64 {
        self.base_impact
    }

    /// Impact factor used by the most recent tick (`base_impact` before any).
    pub fn impact_factor(&self) -> f64 {
        self.impact_factor
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn reference(&self) -> &ReferencePriceSeries {
        &self.reference
    }

    pub fn config(&self) -> &MarketConfig {
        &self.config
    }

    /// Ticks whose price change was discarded.
    pub fn reverted_ticks(&self) -> u64 {
        self.reverted_ticks
    }
}

fn is_valid_price(price: f64) -> bool {
    price.is_finite() && price > 0.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::AgentKind;
    use crate::data::synthetic_reference;
    use crate::engine::impact::DEMAND_LIMIT;

    fn quiet_config() -> MarketConfig {
        MarketConfig {
            chartists: 0,
            fundamentalists: 0,
            noise_traders: 0,
            market_makers: 0,
            price_noise_std: 0.0,
            seed: Some(1),
            ..Default::default()
        }
    }

    #[test]
    fn seeds_history_from_reference_head() {
        let reference = synthetic_reference(500, 3);
        let engine = MarketEngine::new(reference.clone(), MarketConfig::default().with_seed(1))
            .unwrap();
        assert_eq!(engine.price_history(), reference.head(200));
        assert_eq!(engine.current_price(), reference.as_slice()[199]);
        assert_eq!(engine.step_count(), 200);
        assert_eq!(engine.ticks(), 0);
        assert_eq!(engine.seed_len(), 200);
        assert_eq!(engine.impact_factor(), engine.base_impact());
        assert_eq!(engine.agents().len(), 100);
    }

    #[test]
    fn short_reference_seeds_what_it_has() {
        let reference = synthetic_reference(50, 3);
        let engine = MarketEngine::new(reference, MarketConfig::default().with_seed(1)).unwrap();
        assert_eq!(engine.price_history().len(), 50);
        assert_eq!(engine.step_count(), 50);
    }

    #[test]
    fn no_agents_no_noise_keeps_price() {
        let reference = synthetic_reference(300, 8);
        let mut engine = MarketEngine::new(reference, quiet_config()).unwrap();
        let start = engine.current_price();
        for report in engine.run(25) {
            assert_eq!(report.price, start);
            assert_eq!(report.total_demand, 0.0);
            assert!(!report.reverted);
        }
        assert_eq!(engine.price_history().len(), 225);
        assert_eq!(engine.step_count(), 225);
        assert_eq!(engine.simulated_prices().len(), 25);
    }

    #[test]
    fn same_seed_same_path() {
        let reference = synthetic_reference(600, 5);
        let config = MarketConfig::default().with_seed(77);
        let mut a = MarketEngine::new(reference.clone(), config.clone()).unwrap();
        let mut b = MarketEngine::new(reference, config).unwrap();
        assert_eq!(a.run(100), b.run(100));
        assert_eq!(a.price_history(), b.price_history());
    }

    #[test]
    fn different_seeds_diverge() {
        let reference = synthetic_reference(600, 5);
        let mut a = MarketEngine::new(reference.clone(), MarketConfig::default().with_seed(1))
            .unwrap();
        let mut b = MarketEngine::new(reference, MarketConfig::default().with_seed(2)).unwrap();
        a.run(50);
        b.run(50);
        assert_ne!(a.price_history(), b.price_history());
    }

    #[test]
    fn makers_oppose_trader_flow() {
        let reference = synthetic_reference(600, 5);
        let mut engine =
            MarketEngine::new(reference, MarketConfig::default().with_seed(12)).unwrap();
        for report in engine.run(200) {
            if report.trader_demand == 0.0 {
                assert_eq!(report.maker_demand, 0.0);
            } else {
                assert_eq!(report.maker_demand.signum(), -report.trader_demand.signum());
            }
            assert!(report.total_demand.abs() <= DEMAND_LIMIT);
        }
    }

    #[test]
    fn full_strength_makers_cancel_flow() {
        let reference = synthetic_reference(300, 5);
        let mut config = quiet_config();
        config.noise_traders = 10;
        config.market_makers = 1;
        config.market_maker.strength = 1.0;
        let mut engine = MarketEngine::new(reference, config).unwrap();
        let start = engine.current_price();
        for report in engine.run(50) {
            assert_eq!(report.total_demand, 0.0);
            assert_eq!(report.price, start);
        }
    }

    #[test]
    fn overflowing_update_reverts_to_last_price() {
        // A price near f64::MAX times a finite factor > 1 overflows.
        let reference =
            ReferencePriceSeries::new(vec![1e308, 1.7e308, 1e308, 1.7e308, 1e308, 1.7e308])
                .unwrap();
        let mut config = quiet_config();
        config.chartists = 60;
        config.chartist.lookback_period = 2;
        config.chartist.conviction = 1.0;
        config.initial_history = 6;
        let mut engine = MarketEngine::new(reference, config).unwrap();

        let first = engine.step();
        assert_eq!(first.total_demand, DEMAND_LIMIT);
        assert!(first.reverted);
        assert_eq!(first.price, 1.7e308);
        assert_eq!(engine.reverted_ticks(), 1);
        assert_eq!(engine.price_history().len(), 7);
        assert_eq!(engine.step_count(), 7);

        for report in engine.run(50) {
            assert!(report.price.is_finite() && report.price > 0.0);
        }
    }

    #[test]
    fn exploding_impact_leaves_price_unchanged() {
        // Base impact around 1e147: any nonzero demand gives an infinite or
        // zero factor, which is skipped. Stays below the volatility window so
        // recalibration cannot kick in.
        let reference =
            ReferencePriceSeries::new(vec![1e-150, 1.0, 1e-150, 1.0, 1e-150, 1.0]).unwrap();
        let mut config = quiet_config();
        config.noise_traders = 50;
        config.initial_history = 6;
        config.seed = Some(4);
        let mut engine = MarketEngine::new(reference, config).unwrap();
        for report in engine.run(10) {
            assert_eq!(report.price, 1.0);
            assert!(!report.reverted);
        }
        assert_eq!(engine.price_history().len(), 16);
    }

    #[test]
    fn impact_never_exceeds_base() {
        let reference = synthetic_reference(600, 9);
        let mut engine =
            MarketEngine::new(reference, MarketConfig::default().with_seed(3)).unwrap();
        for report in engine.run(200) {
            assert!(report.impact_factor <= engine.base_impact());
        }
    }

    #[test]
    fn rejects_invalid_config() {
        let reference = synthetic_reference(300, 1);
        let mut config = MarketConfig::default();
        config.market_maker.strength = 2.0;
        assert!(MarketEngine::new(reference, config).is_err());
    }

    #[test]
    fn population_matches_config() {
        let reference = synthetic_reference(300, 1);
        let engine = MarketEngine::new(reference, MarketConfig::default().with_seed(1)).unwrap();
        let makers = engine
            .agents()
            .iter()
            .filter(|a| a.kind() == AgentKind::MarketMaker)
            .count();
        assert_eq!(makers, 5);
    }
}
