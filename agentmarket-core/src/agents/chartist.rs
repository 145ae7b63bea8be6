//! Chartist: trend follower over the recent synthetic price window.

use super::{conviction_demand, MarketView};
use crate::config::ChartistParams;
use rand::Rng;

/// Buys into uptrends and sells into everything else, with probability
/// `conviction`.
///
/// The trend is the sign of `last - first` over the most recent
/// `lookback_period` prices; a flat window counts as a downtrend.
#[derive(Debug, Clone, PartialEq)]
pub struct Chartist {
    params: ChartistParams,
    demand: f64,
}

impl Chartist {
    pub fn new(params: ChartistParams) -> Self {
        Self {
            params,
            demand: 0.0,
        }
    }

    pub fn params(&self) -> &ChartistParams {
        &self.params
    }

    pub fn demand(&self) -> f64 {
        self.demand
    }

    pub fn step<R: Rng + ?Sized>(&mut self, view: &MarketView<'_>, rng: &mut R) {
        let lookback = self.params.lookback_period;
        let history = view.price_history;
        if lookback == 0 || history.len() < lookback {
            self.demand = 0.0;
            return;
        }

        let window = &history[history.len() - lookback..];
        let direction = if window[lookback - 1] > window[0] {
            1.0
        } else {
            -1.0
        };
        self.demand = conviction_demand(rng, self.params.conviction, direction);
    }
}
