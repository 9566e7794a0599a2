//! Run configuration and coordinator construction.

use std::io::BufReader;
use std::path::PathBuf;

use tracing::info;
use wander_core::{DecisionLedger, GustoController, SeededUniform};
use wander_search::{
    BisectionMinimizer, DepthBoundedDfs, DeterministicReplay, FrontierBfs, StepBoundedDfs, Strategy,
};

use crate::coordinator::PathCoordinator;
use crate::error::RunError;

/// Which exploration strategy a run uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StrategyKind {
    /// Depth-bounded iterative-deepening enumeration.
    #[default]
    DepthDfs,
    /// Step-bounded iterative-deepening enumeration.
    StepDfs,
    /// Breadth-first frontier exploration.
    Bfs,
    /// Bisection minimization of a recorded bad path.
    LastNail,
    /// Deterministic replay of a recorded path.
    Replay,
    /// Interactive replay from standard input.
    ReplayInteractive,
}

/// Builder for a run. Defaults give an unbounded depth-first exploration
/// with a fixed seed.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    strategy: StrategyKind,
    depth_increment: usize,
    max_depth: usize,
    step_increment: u64,
    max_step_horizon: u64,
    max_paths: u64,
    seed: u64,
    gusto_default: bool,
    check_prefix_bounds: bool,
    prefix_file: Option<PathBuf>,
    replay_file: Option<PathBuf>,
    lastnail_file: Option<PathBuf>,
    lastnail_start_length: usize,
    lastnail_path_count: u32,
    checkpoint_file: Option<PathBuf>,
    output_dir: PathBuf,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            strategy: StrategyKind::default(),
            depth_increment: 10,
            max_depth: 1_000,
            step_increment: 100,
            max_step_horizon: 100_000,
            max_paths: u64::MAX,
            seed: 0,
            gusto_default: false,
            check_prefix_bounds: true,
            prefix_file: None,
            replay_file: None,
            lastnail_file: None,
            lastnail_start_length: 1,
            lastnail_path_count: 10,
            checkpoint_file: None,
            output_dir: PathBuf::from("."),
        }
    }
}

impl EngineConfig {
    /// Start from defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Select the exploration strategy.
    pub fn strategy(mut self, strategy: StrategyKind) -> Self {
        self.strategy = strategy;
        self
    }

    /// Depth horizon growth per level, in decisions.
    pub fn depth_increment(mut self, increment: usize) -> Self {
        self.depth_increment = increment;
        self
    }

    /// Upper limit on the depth horizon.
    pub fn max_depth(mut self, max: usize) -> Self {
        self.max_depth = max;
        self
    }

    /// Step horizon growth per level, in simulator steps.
    pub fn step_increment(mut self, increment: u64) -> Self {
        self.step_increment = increment;
        self
    }

    /// Upper limit on the step horizon.
    pub fn max_step_horizon(mut self, max: u64) -> Self {
        self.max_step_horizon = max;
        self
    }

    /// Stop after this many paths regardless of search progress.
    pub fn max_paths(mut self, max: u64) -> Self {
        self.max_paths = max;
        self
    }

    /// Seed for the uniform source. The same seed reproduces the run.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Default gusto flag before any toggles apply.
    pub fn gusto_default(mut self, on: bool) -> Self {
        self.gusto_default = on;
        self
    }

    /// Whether prefix replay verifies recorded bounds against requests.
    pub fn check_prefix_bounds(mut self, check: bool) -> Self {
        self.check_prefix_bounds = check;
        self
    }

    /// Path file whose decisions seed every path's fixed prefix.
    pub fn prefix_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.prefix_file = Some(path.into());
        self
    }

    /// Path file to replay (for [`StrategyKind::Replay`]).
    pub fn replay_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.replay_file = Some(path.into());
        self
    }

    /// Recorded bad path to minimize (for [`StrategyKind::LastNail`]).
    pub fn lastnail_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.lastnail_file = Some(path.into());
        self
    }

    /// Prefix length the minimizer starts from.
    pub fn lastnail_start_length(mut self, length: usize) -> Self {
        self.lastnail_start_length = length;
        self
    }

    /// Trials per prefix length before the minimizer moves on.
    pub fn lastnail_path_count(mut self, count: u32) -> Self {
        self.lastnail_path_count = count;
        self
    }

    /// Frontier checkpoint to resume from and save to (for
    /// [`StrategyKind::Bfs`]).
    pub fn checkpoint_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.checkpoint_file = Some(path.into());
        self
    }

    /// Directory that saved path files are written into.
    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    /// Load referenced files and assemble the coordinator.
    pub fn build(self) -> Result<PathCoordinator, RunError> {
        let mut ledger = DecisionLedger::new(self.check_prefix_bounds);
        let mut gusto = GustoController::new(self.gusto_default);

        if let Some(path) = &self.prefix_file {
            let file = wander_codec::read_path(path)?;
            info!(
                path = %path.display(),
                decisions = file.decisions.len(),
                toggles = file.toggles.len(),
                "Loaded prefix"
            );
            ledger.set_prefix(file.decisions);
            gusto.load_toggles(file.toggles);
        }

        let strategy = match self.strategy {
            StrategyKind::DepthDfs => Strategy::DepthDfs(DepthBoundedDfs::new(
                self.depth_increment,
                self.max_depth,
            )),
            StrategyKind::StepDfs => Strategy::StepDfs(StepBoundedDfs::new(
                self.step_increment,
                self.max_step_horizon,
            )),
            StrategyKind::Bfs => {
                let resumable = self
                    .checkpoint_file
                    .as_deref()
                    .filter(|p| p.exists())
                    .map(wander_search::load_checkpoint)
                    .transpose()?;
                match resumable {
                    Some(checkpoint) => Strategy::Bfs(FrontierBfs::from_checkpoint(
                        self.depth_increment,
                        self.max_depth,
                        checkpoint,
                    )),
                    None => Strategy::Bfs(FrontierBfs::new(self.depth_increment, self.max_depth)),
                }
            }
            StrategyKind::LastNail => {
                let path = self
                    .lastnail_file
                    .as_ref()
                    .ok_or_else(|| RunError::config("lastnail requires a recorded bad path"))?;
                let file = wander_codec::read_path(path)?;
                if file.decisions.is_empty() {
                    return Err(RunError::config("recorded bad path has no decisions"));
                }
                gusto.load_toggles(file.toggles);
                Strategy::LastNail(BisectionMinimizer::new(
                    file.decisions,
                    self.lastnail_start_length,
                    self.lastnail_path_count,
                ))
            }
            StrategyKind::Replay => {
                let path = self
                    .replay_file
                    .as_ref()
                    .ok_or_else(|| RunError::config("replay requires a recorded path file"))?;
                let file = wander_codec::read_path(path)?;
                gusto.load_toggles(file.toggles);
                Strategy::Replay(DeterministicReplay::from_recorded(&file.decisions))
            }
            StrategyKind::ReplayInteractive => Strategy::Replay(DeterministicReplay::from_reader(
                Box::new(BufReader::new(std::io::stdin())),
                true,
            )),
        };

        Ok(PathCoordinator::new(
            ledger,
            gusto,
            strategy,
            SeededUniform::from_seed(self.seed),
            self.max_paths,
            self.output_dir,
            self.checkpoint_file,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lastnail_requires_bad_path() {
        let err = EngineConfig::new()
            .strategy(StrategyKind::LastNail)
            .build()
            .unwrap_err();
        assert!(matches!(err, RunError::Config { .. }));
    }

    #[test]
    fn test_replay_requires_path_file() {
        let err = EngineConfig::new()
            .strategy(StrategyKind::Replay)
            .build()
            .unwrap_err();
        assert!(matches!(err, RunError::Config { .. }));
    }

    #[test]
    fn test_prefix_file_loads_ledger_and_toggles() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefix.path");
        std::fs::write(&path, "2\n5\n4294967295\n4 1\n3 2\n").unwrap();

        let coord = EngineConfig::new().prefix_file(&path).build().unwrap();
        assert_eq!(coord.ledger().prefix_len(), 2);
    }

    #[test]
    fn test_bfs_without_checkpoint_starts_fresh() {
        let coord = EngineConfig::new()
            .strategy(StrategyKind::Bfs)
            .depth_increment(2)
            .build()
            .unwrap();
        assert!(matches!(coord.strategy(), Strategy::Bfs(_)));
    }
}
