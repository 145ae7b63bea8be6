//! Integration tests for the market engine.
//!
//! Tests:
//! 1. Agent rules inside a full engine (conviction extremes)
//! 2. Fundamentalists read the reference series at the absolute step index
//! 3. Reproducibility under a fixed seed
//! 4. Default population over a long run

use agentmarket_core::agents::Agent;
use agentmarket_core::config::MarketConfig;
use agentmarket_core::data::synthetic_reference;
use agentmarket_core::{MarketEngine, ReferencePriceSeries};

fn silent_market() -> MarketConfig {
    MarketConfig {
        chartists: 0,
        fundamentalists: 0,
        noise_traders: 0,
        market_makers: 0,
        price_noise_std: 0.0,
        seed: Some(11),
        ..Default::default()
    }
}

/// Helper: strictly increasing reference series.
fn rising_reference(n: usize) -> ReferencePriceSeries {
    ReferencePriceSeries::new((0..n).map(|i| 100.0 + i as f64 * 0.5).collect()).unwrap()
}

// ── 1. Conviction extremes ───────────────────────────────────────────

#[test]
fn full_conviction_chartists_buy_a_rising_seed() {
    let mut config = silent_market();
    config.chartists = 10;
    config.chartist.conviction = 1.0;
    let mut engine = MarketEngine::new(rising_reference(300), config).unwrap();

    let report = engine.step();
    assert_eq!(report.trader_demand, 10.0);
    assert!(engine
        .agents()
        .iter()
        .all(|a| a.demand() == 1.0));
    assert!(report.price > engine.price_history()[199]);
}

#[test]
fn rising_path_keeps_full_conviction_chartists_buying() {
    let mut config = silent_market();
    config.chartists = 5;
    config.chartist.conviction = 1.0;
    let mut engine = MarketEngine::new(rising_reference(300), config).unwrap();
    // Positive demand and no noise keep the path strictly rising.
    for report in engine.run(100) {
        assert_eq!(report.trader_demand, 5.0);
    }
}

#[test]
fn zero_conviction_traders_never_move_the_price() {
    let mut config = silent_market();
    config.chartists = 20;
    config.fundamentalists = 20;
    config.market_makers = 3;
    config.chartist.conviction = 0.0;
    config.fundamentalist.conviction = 0.0;
    let mut engine = MarketEngine::new(synthetic_reference(600, 2), config).unwrap();
    let start = engine.current_price();
    for report in engine.run(100) {
        assert_eq!(report.trader_demand, 0.0);
        assert_eq!(report.maker_demand, 0.0);
        assert_eq!(report.price, start);
    }
    assert!(engine.agents().iter().all(|a| a.demand() == 0.0));
}

// ── 2. Fundamental value indexing ────────────────────────────────────

#[test]
fn fundamentalists_sell_an_overpriced_market() {
    // Reference holds at 50 after the seed window; the seeded price is 100.
    let mut prices = vec![100.0; 200];
    prices.extend(std::iter::repeat(50.0).take(400));
    let reference = ReferencePriceSeries::new(prices).unwrap();

    let mut config = silent_market();
    config.fundamentalists = 4;
    config.fundamentalist.conviction = 1.0;
    config.fundamentalist.fundamental_period = 10;
    let mut engine = MarketEngine::new(reference, config).unwrap();

    // At step 200 the window [190, 200) is still all 100: at fair value, so sell.
    assert_eq!(engine.step().trader_demand, -4.0);
    // Once the window sits inside the 50 plateau the market is overpriced
    // and stays that way.
    engine.run(20);
    assert_eq!(engine.step().trader_demand, -4.0);
}

#[test]
fn fundamentalists_go_quiet_past_reference_end() {
    let mut config = silent_market();
    config.fundamentalists = 3;
    config.fundamentalist.conviction = 1.0;
    config.fundamentalist.fundamental_period = 50;
    let mut engine = MarketEngine::new(synthetic_reference(210, 6), config).unwrap();

    let reports = engine.run(20);
    assert!(reports[..10].iter().all(|r| r.trader_demand.abs() == 3.0));
    assert!(reports[10..].iter().all(|r| r.trader_demand == 0.0));
}

// ── 3. Reproducibility ───────────────────────────────────────────────

#[test]
fn fixed_seed_replays_exactly() {
    let reference = synthetic_reference(800, 9);
    let config = MarketConfig::default().with_seed(2024);
    let run = |reference: ReferencePriceSeries| {
        let mut engine = MarketEngine::new(reference, config.clone()).unwrap();
        engine.run(300);
        engine.price_history().to_vec()
    };
    assert_eq!(run(reference.clone()), run(reference));
}

// ── 4. Default population ────────────────────────────────────────────

#[test]
fn default_population_long_run() {
    let mut engine =
        MarketEngine::new(synthetic_reference(1200, 3), MarketConfig::default().with_seed(8))
            .unwrap();
    let reports = engine.run(1000);
    assert_eq!(reports.len(), 1000);
    assert_eq!(engine.ticks(), 1000);
    assert_eq!(engine.step_count(), 1200);
    assert_eq!(engine.price_history().len(), 1200);
    assert!(reports.iter().all(|r| r.price.is_finite() && r.price > 0.0));
    assert!(reports
        .iter()
        .all(|r| r.total_demand.abs() <= agentmarket_core::engine::DEMAND_LIMIT));
    let traders = engine.agents().iter().filter(|a| a.is_trader()).count();
    assert_eq!(traders, 95);
    assert!(engine.agents().iter().any(|a| matches!(a, Agent::MarketMaker(_))));
}
