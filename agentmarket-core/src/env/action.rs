//! Discrete trading actions.

use super::EnvError;
use rand::distributions::{Distribution, Standard};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// All-in / all-out action set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum Action {
    Hold = 0,
    Buy = 1,
    Sell = 2,
}

impl Action {
    /// Every action, in code order.
    pub const ALL: [Action; 3] = [Action::Hold, Action::Buy, Action::Sell];

    pub fn code(self) -> u8 {
        self as u8
    }
}

impl TryFrom<i64> for Action {
    type Error = EnvError;

    fn try_from(code: i64) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Action::Hold),
            1 => Ok(Action::Buy),
            2 => Ok(Action::Sell),
            other => Err(EnvError::InvalidAction(other)),
        }
    }
}

/// Uniform over the three actions.
impl Distribution<Action> for Standard {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Action {
        Action::ALL[rng.gen_range(0..Action::ALL.len())]
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Action::Hold => "hold",
            Action::Buy => "buy",
            Action::Sell => "sell",
        };
        f.write_str(name)
    }
}
