//! Single-episode rollouts.

use agentmarket_core::{Action, StepOutcome, TradingEnv};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::policy::Policy;

/// How often each action was taken.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionCounts {
    pub hold: usize,
    pub buy: usize,
    pub sell: usize,
}

impl ActionCounts {
    pub fn record(&mut self, action: Action) {
        match action {
            Action::Hold => self.hold += 1,
            Action::Buy => self.buy += 1,
            Action::Sell => self.sell += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.hold + self.buy + self.sell
    }
}

/// Outcome of one episode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodeResult {
    pub policy: String,
    /// Seed passed to `reset`, if any.
    pub seed: Option<u64>,
    pub started_at: DateTime<Utc>,
    pub steps: usize,
    pub initial_balance: f64,
    pub final_net_worth: f64,
    pub total_reward: f64,
    /// `final_net_worth - initial_balance`.
    pub profit: f64,
    pub terminated: bool,
    pub final_price: f64,
    pub reverted_ticks: u64,
    /// Net worth after reset, then after every step.
    pub net_worth_curve: Vec<f64>,
    pub action_counts: ActionCounts,
}

/// Reset `env` and run `policy` until the episode terminates.
pub fn run_episode(
    env: &mut TradingEnv,
    policy: &mut dyn Policy,
    seed: Option<u64>,
) -> Result<EpisodeResult> {
    run_episode_with(env, policy, seed, |_, _| {})
}

/// Like [`run_episode`], calling `on_step` after every step.
pub fn run_episode_with<F>(
    env: &mut TradingEnv,
    policy: &mut dyn Policy,
    seed: Option<u64>,
    mut on_step: F,
) -> Result<EpisodeResult>
where
    F: FnMut(&TradingEnv, &StepOutcome),
{
    let started_at = Utc::now();
    let (mut observation, mut info) = env.reset(seed).context("failed to reset environment")?;

    let mut net_worth_curve = Vec::with_capacity(env.config().env.simulation_horizon + 1);
    net_worth_curve.push(info.net_worth);
    let mut action_counts = ActionCounts::default();
    let mut terminated = false;

    while !terminated {
        let action = policy.act(&observation, &info);
        let outcome = env
            .step(action)
            .with_context(|| format!("step {} failed", info.step + 1))?;
        action_counts.record(action);
        net_worth_curve.push(outcome.info.net_worth);
        on_step(env, &outcome);

        terminated = outcome.terminated;
        info = outcome.info;
        observation = outcome.observation;
    }

    let (final_price, reverted_ticks) = env
        .engine()
        .map(|e| (e.current_price(), e.reverted_ticks()))
        .unwrap_or((f64::NAN, 0));
    let initial_balance = env.config().env.initial_balance;

    tracing::info!(
        policy = policy.name(),
        steps = info.step,
        net_worth = info.net_worth,
        "episode finished"
    );

    Ok(EpisodeResult {
        policy: policy.name().to_string(),
        seed,
        started_at,
        steps: info.step,
        initial_balance,
        final_net_worth: info.net_worth,
        total_reward: info.cumulative_reward,
        profit: info.net_worth - initial_balance,
        terminated,
        final_price,
        reverted_ticks,
        net_worth_curve,
        action_counts,
    })
}
