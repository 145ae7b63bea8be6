//! The agent family.
//!
//! Every agent contributes one signed `demand` scalar per tick. Trader-type
//! agents (chartist, fundamentalist, noise trader) decide during the shared
//! decision phase from a read-only [`MarketView`]; market makers sit that
//! phase out and react afterwards to the net trader flow via [`Agent::act`].
//!
//! Agents only ever write their own `demand`. Randomness comes from the
//! engine's single generator, passed in explicitly.

pub mod chartist;
pub mod fundamentalist;
pub mod market_maker;
pub mod noise;

pub use chartist::Chartist;
pub use fundamentalist::Fundamentalist;
pub use market_maker::MarketMaker;
pub use noise::NoiseTrader;

use crate::config::MarketConfig;
use crate::data::ReferencePriceSeries;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Read-only market context handed to every trader during the decision phase.
#[derive(Debug, Clone, Copy)]
pub struct MarketView<'a> {
    /// Every finalized price so far, oldest first. The last entry is the
    /// current price.
    pub price_history: &'a [f64],
    pub current_price: f64,
    /// Absolute time index into the reference series.
    pub step: usize,
    pub reference: &'a ReferencePriceSeries,
}

/// Agent variant tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentKind {
    Chartist,
    Fundamentalist,
    NoiseTrader,
    MarketMaker,
}

impl fmt::Display for AgentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AgentKind::Chartist => "chartist",
            AgentKind::Fundamentalist => "fundamentalist",
            AgentKind::NoiseTrader => "noise_trader",
            AgentKind::MarketMaker => "market_maker",
        };
        f.write_str(name)
    }
}

/// A market participant.
#[derive(Debug, Clone, PartialEq)]
pub enum Agent {
    Chartist(Chartist),
    Fundamentalist(Fundamentalist),
    NoiseTrader(NoiseTrader),
    MarketMaker(MarketMaker),
}

impl Agent {
    /// Build the population a config describes: chartists, fundamentalists,
    /// noise traders, then market makers.
    pub fn population(config: &MarketConfig) -> Vec<Agent> {
        let mut agents = Vec::with_capacity(config.agent_count());
        agents.extend(
            (0..config.chartists).map(|_| Agent::Chartist(Chartist::new(config.chartist))),
        );
        agents.extend((0..config.fundamentalists).map(|_| {
            Agent::Fundamentalist(Fundamentalist::new(config.fundamentalist))
        }));
        agents.extend((0..config.noise_traders).map(|_| Agent::NoiseTrader(NoiseTrader::new())));
        agents.extend(
            (0..config.market_makers)
                .map(|_| Agent::MarketMaker(MarketMaker::new(config.market_maker))),
        );
        agents
    }

    pub fn kind(&self) -> AgentKind {
        match self {
            Agent::Chartist(_) => AgentKind::Chartist,
            Agent::Fundamentalist(_) => AgentKind::Fundamentalist,
            Agent::NoiseTrader(_) => AgentKind::NoiseTrader,
            Agent::MarketMaker(_) => AgentKind::MarketMaker,
        }
    }

    /// Whether this agent takes part in the decision phase.
    pub fn is_trader(&self) -> bool {
        !matches!(self, Agent::MarketMaker(_))
    }

    /// Demand written during the most recent tick.
    pub fn demand(&self) -> f64 {
        match self {
            Agent::Chartist(a) => a.demand(),
            Agent::Fundamentalist(a) => a.demand(),
            Agent::NoiseTrader(a) => a.demand(),
            Agent::MarketMaker(a) => a.demand(),
        }
    }

    /// Decision phase. Market makers do nothing here.
    pub fn step<R: Rng + ?Sized>(&mut self, view: &MarketView<'_>, rng: &mut R) {
        match self {
            Agent::Chartist(a) => a.step(view, rng),
            Agent::Fundamentalist(a) => a.step(view, rng),
            Agent::NoiseTrader(a) => a.step(rng),
            Agent::MarketMaker(_) => {}
        }
    }

    /// Maker reaction phase. Traders ignore it.
    pub fn act(&mut self, net_trader_demand: f64) {
        if let Agent::MarketMaker(maker) = self {
            maker.act(net_trader_demand);
        }
    }
}

/// Probabilistic directional decision shared by chartists and fundamentalists.
///
/// A favorable roll (`u < conviction`) yields `direction`; an unfavorable roll
/// yields exactly 0, never the opposite sign.
pub(crate) fn conviction_demand<R: Rng + ?Sized>(
    rng: &mut R,
    conviction: f64,
    direction: f64,
) -> f64 {
    if rng.gen::<f64>() < conviction {
        direction
    } else {
        0.0
    }
}
