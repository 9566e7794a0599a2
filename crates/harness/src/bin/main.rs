//! Wander explorer CLI
//!
//! Runs the token-ring demo protocol under a chosen search strategy.
//!
//! # Example
//!
//! ```bash
//! # Exhaustive depth-first exploration, deepening by 5 decisions per level
//! wander --strategy depth-dfs --depth-increment 5 --max-depth 40
//!
//! # Minimize a recorded failing path
//! wander --strategy last-nail --lastnail bad.path
//!
//! # Reproduce a saved path bit-exactly
//! wander --strategy replay --replay bad.path
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;
use wander_engine::{EngineConfig, StrategyKind};
use wander_harness::{PathRunner, RingConfig, TokenRing};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum StrategyArg {
    /// Iterative-deepening enumeration over a decision horizon.
    DepthDfs,
    /// Iterative-deepening enumeration over a step horizon.
    StepDfs,
    /// Breadth-first frontier exploration.
    Bfs,
    /// Bisection minimization of a recorded bad path.
    LastNail,
    /// Replay a recorded path.
    Replay,
    /// Replay interactively from standard input.
    Interactive,
}

impl From<StrategyArg> for StrategyKind {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::DepthDfs => StrategyKind::DepthDfs,
            StrategyArg::StepDfs => StrategyKind::StepDfs,
            StrategyArg::Bfs => StrategyKind::Bfs,
            StrategyArg::LastNail => StrategyKind::LastNail,
            StrategyArg::Replay => StrategyKind::Replay,
            StrategyArg::Interactive => StrategyKind::ReplayInteractive,
        }
    }
}

/// Wander path explorer
///
/// Deterministic decision-level search over the token-ring demo protocol.
/// Single-threaded, reproducible when the same seed is used.
#[derive(Parser, Debug)]
#[command(name = "wander")]
#[command(version, about, long_about = None)]
struct Args {
    /// Search strategy
    #[arg(long, value_enum, default_value = "depth-dfs")]
    strategy: StrategyArg,

    /// Nodes in the token ring
    #[arg(short = 'n', long, default_value = "4")]
    nodes: u64,

    /// Token laps required for a path to end normally
    #[arg(long, default_value = "3")]
    laps: u64,

    /// Step budget per path
    #[arg(long, default_value = "200")]
    max_steps: u64,

    /// Depth horizon growth per level, in decisions
    #[arg(long, default_value = "10")]
    depth_increment: usize,

    /// Upper limit on the depth horizon
    #[arg(long, default_value = "1000")]
    max_depth: usize,

    /// Step horizon growth per level, in simulation steps
    #[arg(long, default_value = "100")]
    step_increment: u64,

    /// Upper limit on the step horizon
    #[arg(long, default_value = "100000")]
    max_step_horizon: u64,

    /// Stop after this many paths
    #[arg(long)]
    max_paths: Option<u64>,

    /// Random seed for reproducible results. When omitted, a random seed is used.
    #[arg(long)]
    seed: Option<u64>,

    /// Path file replayed as a fixed prefix of every path
    #[arg(long)]
    prefix: Option<PathBuf>,

    /// Recorded path to replay (strategy: replay)
    #[arg(long)]
    replay: Option<PathBuf>,

    /// Recorded bad path to minimize (strategy: last-nail)
    #[arg(long)]
    lastnail: Option<PathBuf>,

    /// Prefix length the minimizer starts from
    #[arg(long, default_value = "1")]
    lastnail_start_length: usize,

    /// Trials per prefix length before the minimizer moves on
    #[arg(long, default_value = "10")]
    lastnail_path_count: u32,

    /// Frontier checkpoint file to resume from and save to (strategy: bfs)
    #[arg(long)]
    checkpoint: Option<PathBuf>,

    /// Directory saved path files are written into
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,

    /// Start with gusto (weighted choice) on
    #[arg(long)]
    gusto: bool,

    /// Skip bound verification when replaying a prefix
    #[arg(long)]
    no_check_bounds: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn,wander=info")),
        )
        .init();

    let args = Args::parse();
    let seed = args.seed.unwrap_or_else(rand::random);

    info!(
        strategy = ?args.strategy,
        nodes = args.nodes,
        laps = args.laps,
        max_steps = args.max_steps,
        seed,
        "Starting exploration"
    );

    let mut config = EngineConfig::new()
        .strategy(args.strategy.into())
        .depth_increment(args.depth_increment)
        .max_depth(args.max_depth)
        .step_increment(args.step_increment)
        .max_step_horizon(args.max_step_horizon)
        .seed(seed)
        .gusto_default(args.gusto)
        .check_prefix_bounds(!args.no_check_bounds)
        .lastnail_start_length(args.lastnail_start_length)
        .lastnail_path_count(args.lastnail_path_count)
        .output_dir(args.output_dir);

    if let Some(max) = args.max_paths {
        config = config.max_paths(max);
    }
    if let Some(path) = args.prefix {
        config = config.prefix_file(path);
    }
    if let Some(path) = args.replay {
        config = config.replay_file(path);
    }
    if let Some(path) = args.lastnail {
        config = config.lastnail_file(path);
    }
    if let Some(path) = args.checkpoint {
        config = config.checkpoint_file(path);
    }

    let coordinator = match config.build() {
        Ok(coordinator) => coordinator,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let protocol = TokenRing::new(RingConfig {
        nodes: args.nodes,
        target_laps: args.laps,
        max_steps: args.max_steps,
    });
    let mut runner = PathRunner::new(coordinator);
    if let Err(e) = runner.run(|coordinator| protocol.run_path(coordinator)) {
        eprintln!("error: {e}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
