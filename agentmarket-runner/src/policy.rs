//! Decision policies for episode rollouts.

use std::fmt;
use std::str::FromStr;

use agentmarket_core::{Action, EpisodeInfo};
use anyhow::bail;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Maps an observation to an action.
pub trait Policy {
    fn name(&self) -> &'static str;

    fn act(&mut self, observation: &[f32], info: &EpisodeInfo) -> Action;
}

/// Uniformly random actions.
#[derive(Debug, Clone)]
pub struct RandomPolicy {
    rng: StdRng,
}

impl RandomPolicy {
    /// Seeded when `seed` is given, entropy otherwise.
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { rng }
    }
}

impl Policy for RandomPolicy {
    fn name(&self) -> &'static str {
        "random"
    }

    fn act(&mut self, _observation: &[f32], _info: &EpisodeInfo) -> Action {
        self.rng.gen()
    }
}

/// Never trades.
#[derive(Debug, Clone, Copy, Default)]
pub struct HoldPolicy;

impl Policy for HoldPolicy {
    fn name(&self) -> &'static str {
        "hold"
    }

    fn act(&mut self, _observation: &[f32], _info: &EpisodeInfo) -> Action {
        Action::Hold
    }
}

/// Goes all-in on the first step and holds from then on.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuyAndHoldPolicy;

impl Policy for BuyAndHoldPolicy {
    fn name(&self) -> &'static str {
        "buy-and-hold"
    }

    fn act(&mut self, _observation: &[f32], info: &EpisodeInfo) -> Action {
        if info.balance > 0.0 {
            Action::Buy
        } else {
            Action::Hold
        }
    }
}

/// Named policy selector for command-line use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyKind {
    Random,
    Hold,
    BuyAndHold,
}

impl PolicyKind {
    pub fn build(self, seed: Option<u64>) -> Box<dyn Policy + Send> {
        match self {
            PolicyKind::Random => Box::new(RandomPolicy::new(seed)),
            PolicyKind::Hold => Box::new(HoldPolicy),
            PolicyKind::BuyAndHold => Box::new(BuyAndHoldPolicy),
        }
    }
}

impl FromStr for PolicyKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "random" => Ok(PolicyKind::Random),
            "hold" => Ok(PolicyKind::Hold),
            "buy-and-hold" | "buy_and_hold" => Ok(PolicyKind::BuyAndHold),
            other => bail!("unknown policy '{other}' (expected random, hold or buy-and-hold)"),
        }
    }
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PolicyKind::Random => "random",
            PolicyKind::Hold => "hold",
            PolicyKind::BuyAndHold => "buy-and-hold",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(balance: f64) -> EpisodeInfo {
        EpisodeInfo {
            step: 0,
            net_worth: 10_000.0,
            shares_held: 0.0,
            balance,
            cumulative_reward: 0.0,
        }
    }

    #[test]
    fn seeded_random_policy_repeats() {
        let mut a = RandomPolicy::new(Some(6));
        let mut b = RandomPolicy::new(Some(6));
        let actions_a: Vec<Action> = (0..50).map(|_| a.act(&[], &info(1.0))).collect();
        let actions_b: Vec<Action> = (0..50).map(|_| b.act(&[], &info(1.0))).collect();
        assert_eq!(actions_a, actions_b);
        assert!(actions_a.contains(&Action::Buy));
        assert!(actions_a.contains(&Action::Sell));
    }

    #[test]
    fn buy_and_hold_buys_once() {
        let mut policy = BuyAndHoldPolicy;
        assert_eq!(policy.act(&[], &info(10_000.0)), Action::Buy);
        assert_eq!(policy.act(&[], &info(0.0)), Action::Hold);
    }

    #[test]
    fn kinds_parse_and_display() {
        for kind in [PolicyKind::Random, PolicyKind::Hold, PolicyKind::BuyAndHold] {
            assert_eq!(kind.to_string().parse::<PolicyKind>().unwrap(), kind);
            assert_eq!(kind.build(Some(1)).name(), kind.to_string());
        }
        assert!("momentum".parse::<PolicyKind>().is_err());
    }
}
