//! AgentMarket Core: reference data, trading agents, price formation, decision environment.
//!
//! This crate contains the heart of the simulator:
//! - Reference price series ingestion (Parquet / CSV) and series statistics
//! - The agent family: chartists, fundamentalists, noise traders, market makers
//! - The market engine: decision phase, demand aggregation, maker reaction,
//!   adaptive impact recalibration and the guarded price update
//! - The decision environment: all-in/all-out portfolio actions, rewards,
//!   fixed-length observations and episode termination
//! - Configuration and deterministic seeding

pub mod agents;
pub mod config;
pub mod data;
pub mod engine;
pub mod env;
pub mod rng;

pub use agents::{Agent, AgentKind, MarketView};
pub use config::{ConfigError, EnvConfig, MarketConfig, SimConfig};
pub use data::{load_reference_series, DataError, ReferencePriceSeries};
pub use engine::{MarketEngine, TickReport};
pub use env::{Action, EnvError, EnvState, EpisodeInfo, Observation, StepOutcome, TradingEnv};
pub use rng::SeedHierarchy;
