//! AgentMarket CLI: simulate, episode, and sweep commands.
//!
//! Commands:
//! - `simulate`: run the market engine and optionally persist the price path
//! - `episode`: run one decision-environment episode under a simple policy
//! - `sweep`: run many seeded engine simulations in parallel and summarize

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use agentmarket_core::{MarketEngine, SimConfig, TradingEnv};
use agentmarket_runner::data_loader::check_coverage;
use agentmarket_runner::{
    export_json, load_config, load_reference, run_episode_with, save_episode_artifacts,
    write_price_path, EpisodeResult, PolicyKind, ReferenceSource, SimulationSweep, SweepSummary,
};

const DEFAULT_LOG_FILTER: &str = "agentmarket=info";
const PROGRESS_EVERY: usize = 100;

#[derive(Parser)]
#[command(
    name = "agentmarket",
    about = "AgentMarket CLI: agent-based market simulator and trading environment"
)]
struct Cli {
    /// Log at debug level (overrides RUST_LOG).
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Where the reference series and config come from.
#[derive(Args)]
struct SourceArgs {
    /// Reference price file (.parquet or .csv with a `close` column).
    #[arg(long, required_unless_present = "synthetic", conflicts_with = "synthetic")]
    data: Option<PathBuf>,

    /// Use a synthetic reference series of this many points instead of --data.
    #[arg(long)]
    synthetic: Option<usize>,

    /// Seed for the synthetic reference series.
    #[arg(long, default_value_t = 0)]
    synthetic_seed: u64,

    /// Path to a TOML config file. Defaults apply to anything it omits.
    #[arg(long)]
    config: Option<PathBuf>,
}

impl SourceArgs {
    fn reference_source(&self) -> ReferenceSource {
        match (&self.data, self.synthetic) {
            (Some(path), _) => ReferenceSource::File(path.clone()),
            (None, Some(len)) => ReferenceSource::Synthetic {
                len,
                seed: self.synthetic_seed,
            },
            // clap enforces one of the two.
            (None, None) => ReferenceSource::Synthetic {
                len: 1200,
                seed: self.synthetic_seed,
            },
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum PolicyArg {
    Random,
    Hold,
    BuyAndHold,
}

impl From<PolicyArg> for PolicyKind {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::Random => PolicyKind::Random,
            PolicyArg::Hold => PolicyKind::Hold,
            PolicyArg::BuyAndHold => PolicyKind::BuyAndHold,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Run the market engine for a number of ticks.
    Simulate {
        #[command(flatten)]
        source: SourceArgs,

        /// Ticks to simulate. Defaults to the configured simulation horizon.
        #[arg(long)]
        steps: Option<usize>,

        /// Engine seed (overrides the config seed).
        #[arg(long)]
        seed: Option<u64>,

        /// Write the full price history here (.csv or .parquet).
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Run one trading episode under a simple policy.
    Episode {
        #[command(flatten)]
        source: SourceArgs,

        /// Decision policy.
        #[arg(long, value_enum, default_value = "random")]
        policy: PolicyArg,

        /// Episode seed, also used to seed the random policy.
        #[arg(long)]
        seed: Option<u64>,

        /// Print the environment state every 100 steps and at the end.
        #[arg(long, default_value_t = false)]
        render: bool,

        /// Write the episode summary as JSON here.
        #[arg(long)]
        output: Option<PathBuf>,

        /// Save a timestamped summary and net-worth curve under this directory.
        #[arg(long)]
        artifacts: Option<PathBuf>,
    },
    /// Run many seeded simulations and summarize the price paths.
    Sweep {
        #[command(flatten)]
        source: SourceArgs,

        /// Number of independent runs.
        #[arg(long, default_value_t = 10)]
        runs: usize,

        /// Ticks per run. Defaults to the configured simulation horizon.
        #[arg(long)]
        steps: Option<usize>,

        /// Master seed for per-run seeds (overrides the config seed).
        #[arg(long)]
        seed: Option<u64>,

        /// Write the sweep summary as JSON here.
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Simulate {
            source,
            steps,
            seed,
            output,
        } => run_simulate(&source, steps, seed, output.as_deref()),
        Commands::Episode {
            source,
            policy,
            seed,
            render,
            output,
            artifacts,
        } => run_episode_cmd(
            &source,
            policy.into(),
            seed,
            render,
            output.as_deref(),
            artifacts.as_deref(),
        ),
        Commands::Sweep {
            source,
            runs,
            steps,
            seed,
            output,
        } => run_sweep(&source, runs, steps, seed, output.as_deref()),
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("agentmarket=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn load_inputs(source: &SourceArgs) -> Result<(SimConfig, agentmarket_core::ReferencePriceSeries)> {
    let config = load_config(source.config.as_deref())?;
    let reference = load_reference(&source.reference_source())?;
    check_coverage(&reference, &config);
    Ok((config, reference))
}

fn run_simulate(
    source: &SourceArgs,
    steps: Option<usize>,
    seed: Option<u64>,
    output: Option<&Path>,
) -> Result<()> {
    let (config, reference) = load_inputs(source)?;
    let steps = steps.unwrap_or(config.env.simulation_horizon);
    let mut market = config.market;
    if seed.is_some() {
        market.seed = seed;
    }

    let mut engine = MarketEngine::new(reference, market).context("failed to build engine")?;
    tracing::info!(
        agents = engine.agents().len(),
        steps,
        base_impact = engine.base_impact(),
        "simulation started"
    );

    for _ in 0..steps {
        let report = engine.step();
        if report.tick as usize % PROGRESS_EVERY == 0 {
            tracing::info!(
                tick = report.tick,
                price = report.price,
                demand = report.total_demand,
                impact = report.impact_factor,
                "progress"
            );
        }
    }

    let path = &engine.price_history()[engine.seed_len() - 1..];
    let min = path.iter().copied().fold(f64::INFINITY, f64::min);
    let max = path.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    println!();
    println!("=== Simulation ===");
    println!("Ticks:           {}", engine.ticks());
    println!("Start price:     {:.4}", path[0]);
    println!("Final price:     {:.4}", engine.current_price());
    println!("Range:           {min:.4} .. {max:.4}");
    println!("Base impact:     {:.6}", engine.base_impact());
    println!("Reverted ticks:  {}", engine.reverted_ticks());

    if let Some(output) = output {
        write_price_path(output, engine.price_history(), 0)?;
        println!("Price path saved to: {}", output.display());
    }
    Ok(())
}

fn run_episode_cmd(
    source: &SourceArgs,
    policy: PolicyKind,
    seed: Option<u64>,
    render: bool,
    output: Option<&Path>,
    artifacts: Option<&Path>,
) -> Result<()> {
    let (config, reference) = load_inputs(source)?;
    let mut env = TradingEnv::new(reference, config).context("failed to build environment")?;
    let mut policy = policy.build(seed);

    let result = run_episode_with(&mut env, policy.as_mut(), seed, |env, outcome| {
        if render && (outcome.info.step % PROGRESS_EVERY == 0 || outcome.terminated) {
            println!("{}", env.render());
        }
    })?;

    print_episode(&result);
    if let Some(output) = output {
        write_json(output, &export_json(&result)?)?;
        println!("Summary saved to: {}", output.display());
    }
    if let Some(dir) = artifacts {
        let saved = save_episode_artifacts(&result, dir)?;
        println!("Artifacts saved to: {}", saved.display());
    }
    Ok(())
}

fn run_sweep(
    source: &SourceArgs,
    runs: usize,
    steps: Option<usize>,
    seed: Option<u64>,
    output: Option<&Path>,
) -> Result<()> {
    let (config, reference) = load_inputs(source)?;
    let steps = steps.unwrap_or(config.env.simulation_horizon);
    let master_seed = seed.or(config.market.seed).unwrap_or(0);

    let summary = SimulationSweep::new(reference, config.market)
        .with_runs(runs)
        .with_steps(steps)
        .with_master_seed(master_seed)
        .run()?;

    print_sweep(&summary);
    if let Some(output) = output {
        write_json(output, &export_json(&summary)?)?;
        println!("Summary saved to: {}", output.display());
    }
    Ok(())
}

fn write_json(path: &Path, json: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    std::fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))
}

fn print_episode(result: &EpisodeResult) {
    let counts = &result.action_counts;
    println!();
    println!("=== Episode ({}) ===", result.policy);
    println!("Steps:           {}", result.steps);
    println!("Terminated:      {}", result.terminated);
    println!("Final net worth: {:.2}", result.final_net_worth);
    println!(
        "Profit:          {:.2} ({:.2}%)",
        result.profit,
        result.profit / result.initial_balance * 100.0
    );
    println!("Total reward:    {:.2}", result.total_reward);
    println!("Final price:     {:.4}", result.final_price);
    println!(
        "Actions:         hold {} / buy {} / sell {}",
        counts.hold, counts.buy, counts.sell
    );
}

fn print_sweep(summary: &SweepSummary) {
    println!();
    println!(
        "=== Sweep ({} runs x {} ticks, master seed {}) ===",
        summary.runs, summary.steps, summary.master_seed
    );
    println!(
        "{:>4}  {:>20}  {:>12}  {:>12}  {:>12}  {:>10}  {:>8}",
        "run", "seed", "final", "min", "max", "vol", "reverted"
    );
    for path in &summary.paths {
        println!(
            "{:>4}  {:>20}  {:>12.4}  {:>12.4}  {:>12.4}  {:>10}  {:>8}",
            path.run,
            path.seed,
            path.final_price,
            path.min_price,
            path.max_price,
            fmt_stat(path.realized_volatility, 6),
            path.reverted_ticks
        );
    }
    println!();
    println!(
        "Final price:     mean {:.4}, std {}, range {:.4} .. {:.4}",
        summary.mean_final_price,
        fmt_stat(summary.std_final_price, 4),
        summary.min_final_price,
        summary.max_final_price
    );
    println!(
        "Mean volatility: {}",
        fmt_stat(summary.mean_realized_volatility, 6)
    );
    println!("Reverted ticks:  {}", summary.total_reverted_ticks);
}

fn fmt_stat(value: Option<f64>, precision: usize) -> String {
    match value {
        Some(v) => format!("{v:.precision$}"),
        None => "n/a".to_string(),
    }
}
