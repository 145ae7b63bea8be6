//! Simulation configuration.
//!
//! Every knob the engine and environment recognize, loadable from TOML:
//!
//! ```toml
//! [market]
//! chartists = 40
//! fundamentalists = 40
//! noise_traders = 15
//! market_makers = 5
//! seed = 7
//!
//! [market.chartist]
//! lookback_period = 10
//! conviction = 0.75
//!
//! [env]
//! window_size = 60
//! ```
//!
//! Every field has a default, so a file only needs to name what it changes.
//! Values are fixed once an engine or environment is built from them.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Configuration errors. All of them fail construction.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}

fn check_probability(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(invalid(field, format!("{value} is not a probability in [0, 1]")));
    }
    Ok(())
}

/// Chartist parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartistParams {
    /// Number of most recent prices inspected for a trend.
    pub lookback_period: usize,
    /// Probability of acting on the trend signal.
    pub conviction: f64,
}

impl Default for ChartistParams {
    fn default() -> Self {
        Self {
            lookback_period: 10,
            conviction: 0.75,
        }
    }
}

/// Fundamentalist parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FundamentalistParams {
    /// Length of the trailing reference window averaged into a fundamental value.
    pub fundamental_period: usize,
    /// Probability of acting on the valuation signal.
    pub conviction: f64,
}

impl Default for FundamentalistParams {
    fn default() -> Self {
        Self {
            fundamental_period: 200,
            conviction: 0.75,
        }
    }
}

/// Market maker parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketMakerParams {
    /// Fraction of net trader demand leaned against, in (0, 1].
    pub strength: f64,
}

impl Default for MarketMakerParams {
    fn default() -> Self {
        Self { strength: 0.5 }
    }
}

/// Agent population and price-formation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketConfig {
    pub chartists: usize,
    pub fundamentalists: usize,
    pub noise_traders: usize,
    pub market_makers: usize,
    pub chartist: ChartistParams,
    pub fundamentalist: FundamentalistParams,
    pub market_maker: MarketMakerParams,
    /// Reference prices copied into the price history at construction.
    pub initial_history: usize,
    /// Standard deviation of the multiplicative Gaussian noise per tick.
    pub price_noise_std: f64,
    /// Seed for the engine's single random source. `None` seeds from entropy.
    pub seed: Option<u64>,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            chartists: 40,
            fundamentalists: 40,
            noise_traders: 15,
            market_makers: 5,
            chartist: ChartistParams::default(),
            fundamentalist: FundamentalistParams::default(),
            market_maker: MarketMakerParams::default(),
            initial_history: 200,
            price_noise_std: 0.0005,
            seed: None,
        }
    }
}

impl MarketConfig {
    /// Same settings with a fixed seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Total number of agents, makers included.
    pub fn agent_count(&self) -> usize {
        self.chartists + self.fundamentalists + self.noise_traders + self.market_makers
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.chartist.lookback_period == 0 {
            return Err(invalid("chartist.lookback_period", "must be >= 1"));
        }
        check_probability("chartist.conviction", self.chartist.conviction)?;
        if self.fundamentalist.fundamental_period == 0 {
            return Err(invalid("fundamentalist.fundamental_period", "must be >= 1"));
        }
        check_probability("fundamentalist.conviction", self.fundamentalist.conviction)?;
        let strength = self.market_maker.strength;
        if !(strength > 0.0 && strength <= 1.0) {
            return Err(invalid(
                "market_maker.strength",
                format!("{strength} is outside (0, 1]"),
            ));
        }
        if self.initial_history == 0 {
            return Err(invalid("initial_history", "must be >= 1"));
        }
        if !self.price_noise_std.is_finite() || self.price_noise_std < 0.0 {
            return Err(invalid(
                "price_noise_std",
                format!("{} must be finite and >= 0", self.price_noise_std),
            ));
        }
        Ok(())
    }
}

/// Decision environment settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvConfig {
    /// Number of trailing prices in each observation.
    pub window_size: usize,
    /// Episode length in steps.
    pub simulation_horizon: usize,
    /// Cash at the start of every episode.
    pub initial_balance: f64,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            window_size: 60,
            simulation_horizon: 1000,
            initial_balance: 10_000.0,
        }
    }
}

impl EnvConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window_size == 0 {
            return Err(invalid("env.window_size", "must be >= 1"));
        }
        if self.simulation_horizon == 0 {
            return Err(invalid("env.simulation_horizon", "must be >= 1"));
        }
        if !self.initial_balance.is_finite() || self.initial_balance <= 0.0 {
            return Err(invalid(
                "env.initial_balance",
                format!("{} must be finite and > 0", self.initial_balance),
            ));
        }
        Ok(())
    }
}

/// Full simulation configuration: market plus environment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub market: MarketConfig,
    pub env: EnvConfig,
}

impl SimConfig {
    /// Load and validate a config from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse and validate a config from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: SimConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.market.validate()?;
        self.env.validate()?;
        if self.env.window_size > self.market.initial_history {
            return Err(invalid(
                "env.window_size",
                format!(
                    "{} exceeds market.initial_history {}; observations would be short",
                    self.env.window_size, self.market.initial_history
                ),
            ));
        }
        Ok(())
    }
}
