//! Fundamentalist: value trader anchored on the real reference series.

use super::{conviction_demand, MarketView};
use crate::config::FundamentalistParams;
use rand::Rng;

/// Compares the synthetic price against a fundamental value: the mean of the
/// reference series over `[step - fundamental_period, step)`.
///
/// Underpriced means buy, anything else means sell, each with probability
/// `conviction`. Before `fundamental_period` reference points exist, or once
/// the step runs past the end of the reference series, demand is 0.
#[derive(Debug, Clone, PartialEq)]
pub struct Fundamentalist {
    params: FundamentalistParams,
    demand: f64,
}

impl Fundamentalist {
    pub fn new(params: FundamentalistParams) -> Self {
        Self {
            params,
            demand: 0.0,
        }
    }

    pub fn params(&self) -> &FundamentalistParams {
        &self.params
    }

    pub fn demand(&self) -> f64 {
        self.demand
    }

    /// Fundamental value at `step`, if the reference series covers it.
    pub fn fundamental_value(&self, view: &MarketView<'_>) -> Option<f64> {
        let period = self.params.fundamental_period;
        let step = view.step;
        if period == 0 || step < period || step >= view.reference.len() {
            return None;
        }
        view.reference.window_mean(step - period, step)
    }

    pub fn step<R: Rng + ?Sized>(&mut self, view: &MarketView<'_>, rng: &mut R) {
        let Some(value) = self.fundamental_value(view) else {
            self.demand = 0.0;
            return;
        };

        let direction = if view.current_price < value { 1.0 } else { -1.0 };
        self.demand = conviction_demand(rng, self.params.conviction, direction);
    }
}
