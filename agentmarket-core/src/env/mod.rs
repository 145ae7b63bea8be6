//! Decision environment: a gym-style episodic wrapper around the engine.
//!
//! ```text
//! Uninitialized ──reset──▶ Ready ──step (terminated)──▶ Terminated
//!                            ▲                              │
//!                            └──────────── reset ───────────┘
//! ```
//!
//! Every `reset` builds a fresh [`MarketEngine`] over the same reference
//! series and a fresh [`Portfolio`]. Each `step` applies the action at the
//! pre-tick price, advances the engine one tick, and rewards the change in
//! net worth at the post-tick price.

pub mod action;
pub mod portfolio;

pub use action::Action;
pub use portfolio::Portfolio;

use crate::config::{ConfigError, SimConfig};
use crate::data::ReferencePriceSeries;
use crate::engine::MarketEngine;
use crate::rng::SeedHierarchy;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// A fixed-length window of the most recent synthetic prices.
pub type Observation = Vec<f32>;

/// Environment lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnvState {
    Uninitialized,
    Ready,
    Terminated,
}

impl fmt::Display for EnvState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EnvState::Uninitialized => "uninitialized",
            EnvState::Ready => "ready",
            EnvState::Terminated => "terminated",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum EnvError {
    /// Action code outside {0, 1, 2}. The environment is left untouched.
    #[error("invalid action {0}: expected 0 (hold), 1 (buy) or 2 (sell)")]
    InvalidAction(i64),

    #[error("environment is {0}; call reset() before step()")]
    NotReady(EnvState),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Read-only snapshot of the episode after `reset` and every `step`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EpisodeInfo {
    /// Steps taken in the current episode.
    pub step: usize,
    pub net_worth: f64,
    pub shares_held: f64,
    pub balance: f64,
    pub cumulative_reward: f64,
}

/// Result of a single `step`.
#[derive(Debug, Clone, PartialEq)]
pub struct StepOutcome {
    pub observation: Observation,
    pub reward: f64,
    pub terminated: bool,
    /// Always false: the horizon ends an episode through `terminated`.
    pub truncated: bool,
    pub info: EpisodeInfo,
}

/// The decision environment.
#[derive(Debug, Clone)]
pub struct TradingEnv {
    reference: ReferencePriceSeries,
    config: SimConfig,
    seeds: Option<SeedHierarchy>,
    engine: Option<MarketEngine>,
    portfolio: Portfolio,
    state: EnvState,
    episode_step: usize,
    cumulative_reward: f64,
    episodes: u64,
}

impl TradingEnv {
    /// Validate the configuration against the reference series.
    ///
    /// Fails if the seeded history would be shorter than one observation
    /// window.
    pub fn new(reference: ReferencePriceSeries, config: SimConfig) -> Result<Self, EnvError> {
        config.validate()?;
        let seed_len = config.market.initial_history.min(reference.len());
        if seed_len < config.env.window_size {
            return Err(ConfigError::Invalid {
                field: "env.window_size",
                reason: format!(
                    "{} exceeds the {seed_len} seed prices the reference series provides",
                    config.env.window_size
                ),
            }
            .into());
        }

        Ok(Self {
            seeds: config.market.seed.map(SeedHierarchy::new),
            portfolio: Portfolio::new(config.env.initial_balance),
            reference,
            config,
            engine: None,
            state: EnvState::Uninitialized,
            episode_step: 0,
            cumulative_reward: 0.0,
            episodes: 0,
        })
    }

    /// Start a new episode.
    ///
    /// An explicit `seed` wins. Otherwise the seed is derived from the
    /// configured master seed and the episode number, or drawn from entropy
    /// when no master seed is configured.
    pub fn reset(&mut self, seed: Option<u64>) -> Result<(Observation, EpisodeInfo), EnvError> {
        let episode_seed = seed.or_else(|| self.seeds.map(|s| s.episode_seed(self.episodes)));

        let mut market = self.config.market.clone();
        market.seed = episode_seed;
        let engine = MarketEngine::new(self.reference.clone(), market)?;

        self.portfolio = Portfolio::new(self.config.env.initial_balance);
        self.episode_step = 0;
        self.cumulative_reward = 0.0;
        self.state = EnvState::Ready;
        self.episodes += 1;

        tracing::info!(
            episode = self.episodes,
            seed = ?episode_seed,
            price = engine.current_price(),
            "environment reset"
        );

        let observation = observe(&engine, self.config.env.window_size);
        self.engine = Some(engine);
        Ok((observation, self.info()))
    }

    /// Apply `action`, advance the market one tick, and score the result.
    pub fn step(&mut self, action: Action) -> Result<StepOutcome, EnvError> {
        if self.state != EnvState::Ready {
            return Err(EnvError::NotReady(self.state));
        }
        let engine = self
            .engine
            .as_mut()
            .ok_or(EnvError::NotReady(self.state))?;

        let prev_net_worth = self.portfolio.net_worth(engine.current_price());
        self.portfolio.apply(action, engine.current_price());

        engine.step();

        let net_worth = self.portfolio.net_worth(engine.current_price());
        let reward = net_worth - prev_net_worth;
        self.cumulative_reward += reward;
        self.episode_step += 1;

        let terminated =
            net_worth <= 0.0 || self.episode_step >= self.config.env.simulation_horizon;
        let observation = observe(engine, self.config.env.window_size);
        if terminated {
            self.state = EnvState::Terminated;
            tracing::debug!(
                episode = self.episodes,
                steps = self.episode_step,
                net_worth,
                "episode terminated"
            );
        }

        Ok(StepOutcome {
            observation,
            reward,
            terminated,
            truncated: false,
            info: self.info(),
        })
    }

    /// Untyped entry point: decode an integer action code, then step.
    ///
    /// An invalid code fails before anything is touched.
    pub fn step_raw(&mut self, code: i64) -> Result<StepOutcome, EnvError> {
        let action = Action::try_from(code)?;
        self.step(action)
    }

    /// Current snapshot. Before the first reset, reports the initial portfolio.
    pub fn info(&self) -> EpisodeInfo {
        let net_worth = match &self.engine {
            Some(engine) => self.portfolio.net_worth(engine.current_price()),
            None => self.portfolio.balance(),
        };
        EpisodeInfo {
            step: self.episode_step,
            net_worth,
            shares_held: self.portfolio.shares_held(),
            balance: self.portfolio.balance(),
            cumulative_reward: self.cumulative_reward,
        }
    }

    /// One-line textual summary of the episode.
    pub fn render(&self) -> String {
        let Some(engine) = &self.engine else {
            return format!("[{}] no episode in progress", self.state);
        };
        let info = self.info();
        format!(
            "Step: {} | Net Worth: {:.2} | Profit: {:.2} | Total Reward: {:.2} | Price: {:.4} | Shares: {:.4} | Balance: {:.2}",
            info.step,
            info.net_worth,
            info.net_worth - self.config.env.initial_balance,
            info.cumulative_reward,
            engine.current_price(),
            info.shares_held,
            info.balance,
        )
    }

    pub fn state(&self) -> EnvState {
        self.state
    }

    /// Number of discrete actions.
    pub fn action_count(&self) -> usize {
        Action::ALL.len()
    }

    /// Length of every observation.
    pub fn observation_len(&self) -> usize {
        self.config.env.window_size
    }

    pub fn portfolio(&self) -> &Portfolio {
        &self.portfolio
    }

    /// The engine of the current episode, if any.
    pub fn engine(&self) -> Option<&MarketEngine> {
        self.engine.as_ref()
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn reference(&self) -> &ReferencePriceSeries {
        &self.reference
    }

    /// Episodes started so far.
    pub fn episodes(&self) -> u64 {
        self.episodes
    }
}

fn observe(engine: &MarketEngine, window_size: usize) -> Observation {
    let history = engine.price_history();
    history[history.len().saturating_sub(window_size)..]
        .iter()
        .map(|&p| observation_value(p))
        .collect()
}

/// Narrow a price to the observation type. Prices beyond `f32::MAX` saturate
/// instead of becoming infinite.
fn observation_value(price: f64) -> f32 {
    (price as f32).min(f32::MAX)
}
