//! Cash-and-shares portfolio driven by all-in / all-out actions.

use super::Action;
use serde::{Deserialize, Serialize};

/// Single-asset portfolio. Only the environment mutates it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Portfolio {
    balance: f64,
    shares_held: f64,
}

impl Portfolio {
    pub fn new(initial_balance: f64) -> Self {
        Self {
            balance: initial_balance,
            shares_held: 0.0,
        }
    }

    pub fn balance(&self) -> f64 {
        self.balance
    }

    pub fn shares_held(&self) -> f64 {
        self.shares_held
    }

    /// `balance + shares_held * price`.
    pub fn net_worth(&self, price: f64) -> f64 {
        self.balance + self.shares_held * price
    }

    /// Apply an action at `price`.
    ///
    /// Buy converts all cash into shares, Sell converts all shares into cash.
    /// Buying without cash or selling without shares does nothing.
    pub fn apply(&mut self, action: Action, price: f64) {
        match action {
            Action::Hold => {}
            Action::Buy => {
                if self.balance > 0.0 {
                    self.shares_held += self.balance / price;
                    self.balance = 0.0;
                }
            }
            Action::Sell => {
                if self.shares_held > 0.0 {
                    self.balance += self.shares_held * price;
                    self.shares_held = 0.0;
                }
            }
        }
    }
}
