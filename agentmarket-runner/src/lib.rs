//! AgentMarket Runner: episode rollouts, simulation sweeps, export.
//!
//! This crate builds on `agentmarket-core` to provide:
//! - Reference data resolution (file or synthetic) and config loading
//! - Simple decision policies and single-episode rollouts
//! - Multi-seed engine sweeps, fanned out over rayon
//! - CSV / JSON / Parquet export of price paths and run summaries

pub mod data_loader;
pub mod episode;
pub mod export;
pub mod policy;
pub mod sweep;

pub use data_loader::{load_config, load_reference, ReferenceSource};
pub use episode::{run_episode, run_episode_with, ActionCounts, EpisodeResult};
pub use export::{
    export_curve_csv, export_json, export_price_path_csv, save_episode_artifacts,
    write_price_path,
};
pub use policy::{BuyAndHoldPolicy, HoldPolicy, Policy, PolicyKind, RandomPolicy};
pub use sweep::{PathSummary, SimulationSweep, SweepSummary};
