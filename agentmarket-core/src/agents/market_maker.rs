//! Market maker: leans against the net order flow of the same tick.

use crate::config::MarketMakerParams;

/// Liquidity provider that reacts after the traders have decided.
///
/// `act(net)` sets `demand = -net * strength`, so its demand always opposes
/// (or, for zero flow, equals zero) the net trader demand.
#[derive(Debug, Clone, PartialEq)]
pub struct MarketMaker {
    params: MarketMakerParams,
    demand: f64,
}

impl MarketMaker {
    pub fn new(params: MarketMakerParams) -> Self {
        Self {
            params,
            demand: 0.0,
        }
    }

    pub fn strength(&self) -> f64 {
        self.params.strength
    }

    pub fn demand(&self) -> f64 {
        self.demand
    }

    pub fn act(&mut self, net_trader_demand: f64) {
        self.demand = -net_trader_demand * self.params.strength;
    }
}
