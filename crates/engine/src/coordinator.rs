//! Path lifecycle coordination.
//!
//! The coordinator is the single entry point the simulated protocol calls
//! for nondeterministic choices. It owns the ledger, the gusto controller,
//! the active strategy, and the uniform source, and it mediates every
//! decision: prefix replay first, then the strategy's search tail, then
//! uniform draws past the horizon.

use std::path::PathBuf;

use tracing::{debug, info};
use wander_core::{
    Decision, DecisionLedger, EngineError, GustoController, PathOutcome, SeededUniform, Segment,
    UniformSource,
};
use wander_search::{DecisionCtx, Draw, EngineAction, Strategy};

use crate::error::RunError;
use crate::stats::RunStats;

/// Owns all per-run state and drives paths through their lifecycle.
///
/// Exactly one coordinator exists per run; it is constructed from an
/// [`crate::EngineConfig`] and holds the only [`Strategy`] value.
#[derive(Debug)]
pub struct PathCoordinator {
    ledger: DecisionLedger,
    gusto: GustoController,
    strategy: Strategy,
    rng: SeededUniform,
    stats: RunStats,
    path_index: u64,
    max_paths: u64,
    current_step: u64,
    /// Step counter at the time each decision of the current path was
    /// resolved, aligned with the ledger's decision order.
    decision_steps: Vec<u64>,
    output_dir: PathBuf,
    checkpoint_file: Option<PathBuf>,
}

impl PathCoordinator {
    pub(crate) fn new(
        ledger: DecisionLedger,
        gusto: GustoController,
        strategy: Strategy,
        rng: SeededUniform,
        max_paths: u64,
        output_dir: PathBuf,
        checkpoint_file: Option<PathBuf>,
    ) -> Self {
        Self {
            ledger,
            gusto,
            strategy,
            rng,
            stats: RunStats::default(),
            path_index: 0,
            max_paths,
            current_step: 0,
            decision_steps: Vec::new(),
            output_dir,
            checkpoint_file,
        }
    }

    /// Reset per-path state and start a new path.
    pub fn begin_path(&mut self) {
        self.ledger.begin_path();
        self.gusto.begin_path();
        self.strategy.on_path_begin();
        self.current_step = 0;
        self.decision_steps.clear();
        debug!(path = self.path_index, "Path started");
    }

    /// Advance the simulator step counter. Step-horizon strategies and
    /// step-bounded saves read this.
    pub fn set_step(&mut self, step: u64) {
        self.current_step = step;
    }

    /// Resolve one "pick an integer in `[0, bound)`" request.
    ///
    /// A bound of 1 has only one answer and is served without being
    /// recorded; a bound of 0 is a protocol bug and fatal.
    pub fn resolve(&mut self, bound: u64) -> Result<u64, RunError> {
        if bound == 0 {
            return Err(EngineError::ZeroBound {
                position: self.ledger.position(),
            }
            .into());
        }
        if bound == 1 {
            return Ok(0);
        }

        if self.gusto.take_pending() {
            // Requested toggles are deliberate (replay controls), so they
            // survive into later paths.
            self.gusto.toggle_at(self.ledger.position() as u64);
            self.gusto.commit_snapshot();
        }

        let value = if self.ledger.in_prefix() {
            self.ledger.replay_prefix(bound)?
        } else {
            let ctx = DecisionCtx {
                bound,
                offset: self.ledger.offset(),
                position: self.ledger.position(),
                step: self.current_step,
            };
            match self.strategy.next_decision(&ctx, &mut self.rng)? {
                Draw::Value(value) => {
                    debug_assert!(value < bound);
                    self.ledger.record(Segment::Search, Decision { bound, value });
                    value
                }
                Draw::Random => {
                    let value = self.rng.uniform(bound);
                    self.ledger.record(Segment::Random, Decision { bound, value });
                    value
                }
            }
        };
        self.decision_steps.push(self.current_step);

        if self.strategy.wants_gusto_forced() {
            self.gusto.force_on();
        }
        let actions = self.strategy.drain_actions();
        self.perform_actions(actions)?;
        Ok(value)
    }

    /// Resolve a weighted choice among `weights.len()` alternatives.
    ///
    /// With gusto on, the pick is proportional to the weights; with gusto
    /// off, every alternative is equally likely, which lets the search
    /// enumerate unlikely branches.
    pub fn resolve_weighted(&mut self, weights: &[u64]) -> Result<usize, RunError> {
        if self.gusto.is_on(self.ledger.position() as u64) {
            let total: u64 = weights.iter().sum();
            let mut draw = self.resolve(total)?;
            for (index, &weight) in weights.iter().enumerate() {
                if draw < weight {
                    return Ok(index);
                }
                draw -= weight;
            }
            unreachable!("draw below the weight total always lands in a bucket");
        }
        let index = self.resolve(weights.len() as u64)?;
        Ok(index as usize)
    }

    /// Whether gusto is currently on for the next decision.
    pub fn gusto_on(&self) -> bool {
        self.gusto.is_on(self.ledger.position() as u64)
    }

    /// Feed the simulator's verdict back and move the search along.
    ///
    /// Returns whether another path should run.
    pub fn path_complete(&mut self, outcome: PathOutcome) -> Result<bool, RunError> {
        self.stats.paths += 1;
        if outcome.is_live {
            self.stats.live_paths += 1;
        }
        if !outcome.is_safe {
            self.stats.unsafe_paths += 1;
        }
        self.stats.paths_by_cause[outcome.cause.index()] += 1;
        self.stats.steps += outcome.step_count;
        self.stats.decisions += self.ledger.position() as u64;
        self.stats.prefix_decisions += self.ledger.position().min(self.ledger.prefix_len()) as u64;
        self.stats.search_decisions += self.ledger.segment_count(Segment::Search) as u64;
        self.stats.random_decisions += self.ledger.segment_count(Segment::Random) as u64;

        self.strategy.on_path_complete(&outcome);
        let actions = self.strategy.drain_actions();
        self.perform_actions(actions)?;

        self.path_index += 1;
        if self.strategy.advance(&mut self.rng) {
            self.stats.levels += 1;
            info!(
                paths = self.path_index,
                level = %self.strategy.level_label(),
                "Search level completed"
            );
            self.save_checkpoint()?;
        }

        Ok(self.strategy.has_more(outcome.is_live) && self.path_index < self.max_paths)
    }

    /// Write a final checkpoint and print the run report.
    pub fn teardown(&mut self) -> Result<(), RunError> {
        self.save_checkpoint()?;
        self.stats.print_summary();
        Ok(())
    }

    /// Save the current path under `name` in the output directory.
    pub fn save_current_path(&mut self, name: &str) -> Result<(), RunError> {
        let decisions: Vec<Decision> = self.ledger.decisions().copied().collect();
        wander_codec::write_path(
            &self.output_dir.join(name),
            self.gusto.toggles(),
            &[&decisions],
        )?;
        self.stats.paths_saved += 1;
        info!(name, decisions = decisions.len(), "Saved path file");
        Ok(())
    }

    /// Run statistics so far.
    pub fn stats(&self) -> &RunStats {
        &self.stats
    }

    /// The active strategy.
    pub fn strategy(&self) -> &Strategy {
        &self.strategy
    }

    /// The current path's ledger.
    pub fn ledger(&self) -> &DecisionLedger {
        &self.ledger
    }

    fn perform_actions(&mut self, actions: Vec<EngineAction>) -> Result<(), RunError> {
        for action in actions {
            match action {
                EngineAction::SavePath { name } => self.save_current_path(&name)?,
                EngineAction::SavePrefixUpToStep { step, name } => {
                    let decisions: Vec<Decision> = self
                        .ledger
                        .decisions()
                        .zip(&self.decision_steps)
                        .filter(|&(_, &at)| at <= step)
                        .map(|(d, _)| *d)
                        .collect();
                    wander_codec::write_path(
                        &self.output_dir.join(&name),
                        self.gusto.toggles(),
                        &[&decisions],
                    )?;
                    self.stats.paths_saved += 1;
                    info!(name, step, decisions = decisions.len(), "Saved path prefix");
                }
                EngineAction::RequestGustoToggle => self.gusto.request_toggle(),
            }
        }
        Ok(())
    }

    fn save_checkpoint(&self) -> Result<(), RunError> {
        let (Some(path), Strategy::Bfs(bfs)) = (&self.checkpoint_file, &self.strategy) else {
            return Ok(());
        };
        wander_search::save_checkpoint(path, &bfs.checkpoint())?;
        debug!(path = %path.display(), "Saved frontier checkpoint");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wander_core::EndCause;
    use wander_search::{DepthBoundedDfs, DeterministicReplay, ReplayToken};

    fn outcome(is_live: bool) -> PathOutcome {
        PathOutcome {
            cause: EndCause::StoppingCondition,
            is_live,
            is_safe: true,
            step_count: 5,
            decision_count: 3,
        }
    }

    fn coordinator(strategy: Strategy) -> PathCoordinator {
        PathCoordinator::new(
            DecisionLedger::new(true),
            GustoController::new(false),
            strategy,
            SeededUniform::from_seed(0),
            u64::MAX,
            PathBuf::from("."),
            None,
        )
    }

    #[test]
    fn test_prefix_replayed_then_bound_mismatch_is_fatal() {
        // Prefix (4,1) (3,2) (2,0) with gusto toggles at 2 and 5. The third
        // request disagrees with the recorded bound and must abort the run.
        let mut ledger = DecisionLedger::new(true);
        ledger.set_prefix(vec![
            Decision::new(4, 1),
            Decision::new(3, 2),
            Decision::new(2, 0),
        ]);
        let mut gusto = GustoController::new(false);
        gusto.load_toggles(vec![2, 5]);
        let mut coord = PathCoordinator::new(
            ledger,
            gusto,
            Strategy::DepthDfs(DepthBoundedDfs::new(10, 100)),
            SeededUniform::from_seed(0),
            u64::MAX,
            PathBuf::from("."),
            None,
        );
        coord.begin_path();
        assert_eq!(coord.resolve(4).unwrap(), 1);
        assert_eq!(coord.resolve(3).unwrap(), 2);
        let err = coord.resolve(5).unwrap_err();
        assert!(matches!(
            err,
            RunError::Engine(EngineError::BoundMismatch {
                position: 2,
                recorded: 2,
                requested: 5,
            })
        ));
    }

    #[test]
    fn test_bound_one_not_recorded() {
        let mut coord = coordinator(Strategy::DepthDfs(DepthBoundedDfs::new(10, 100)));
        coord.begin_path();
        assert_eq!(coord.resolve(1).unwrap(), 0);
        assert_eq!(coord.ledger().position(), 0);
        coord.resolve(3).unwrap();
        assert_eq!(coord.ledger().position(), 1);
    }

    #[test]
    fn test_zero_bound_is_fatal() {
        let mut coord = coordinator(Strategy::DepthDfs(DepthBoundedDfs::new(10, 100)));
        coord.begin_path();
        assert!(matches!(
            coord.resolve(0).unwrap_err(),
            RunError::Engine(EngineError::ZeroBound { position: 0 })
        ));
    }

    #[test]
    fn test_decisions_past_horizon_land_in_random_segment() {
        let mut coord = coordinator(Strategy::DepthDfs(DepthBoundedDfs::new(2, 2)));
        coord.begin_path();
        coord.resolve(2).unwrap();
        coord.resolve(2).unwrap();
        coord.resolve(7).unwrap();
        assert_eq!(coord.ledger().segment_count(Segment::Search), 2);
        assert_eq!(coord.ledger().segment_count(Segment::Random), 1);
    }

    #[test]
    fn test_weighted_choice_uniform_when_gusto_off() {
        let mut coord = coordinator(Strategy::DepthDfs(DepthBoundedDfs::new(10, 100)));
        coord.begin_path();
        assert!(!coord.gusto_on());
        // Gusto off: the recorded bound is the alternative count, not the
        // weight total.
        let index = coord.resolve_weighted(&[100, 1]).unwrap();
        assert!(index < 2);
        let (_, recorded) = coord.ledger().tail()[0];
        assert_eq!(recorded.bound, 2);
    }

    #[test]
    fn test_weighted_choice_proportional_when_gusto_on() {
        let mut ledger = DecisionLedger::new(true);
        let gusto = GustoController::new(true);
        ledger.set_prefix(Vec::new());
        let mut coord = PathCoordinator::new(
            ledger,
            gusto,
            Strategy::DepthDfs(DepthBoundedDfs::new(10, 100)),
            SeededUniform::from_seed(0),
            u64::MAX,
            PathBuf::from("."),
            None,
        );
        coord.begin_path();
        assert!(coord.gusto_on());
        // Weight 0 on the first alternative: it can never be picked.
        for _ in 0..16 {
            assert_eq!(coord.resolve_weighted(&[0, 3]).unwrap(), 1);
        }
    }

    #[test]
    fn test_path_budget_limits_run() {
        let mut coord = PathCoordinator::new(
            DecisionLedger::new(true),
            GustoController::new(false),
            Strategy::DepthDfs(DepthBoundedDfs::new(1, 10)),
            SeededUniform::from_seed(0),
            1,
            PathBuf::from("."),
            None,
        );
        coord.begin_path();
        coord.resolve(2).unwrap();
        assert!(!coord.path_complete(outcome(false)).unwrap());
    }

    #[test]
    fn test_exploration_runs_every_vector_once() {
        let mut coord = coordinator(Strategy::DepthDfs(DepthBoundedDfs::new(3, 3)));
        let mut seen = std::collections::HashSet::new();
        let mut more = true;
        let mut paths = 0;
        while more {
            coord.begin_path();
            let mut vector = Vec::new();
            for _ in 0..3 {
                vector.push(coord.resolve(2).unwrap());
            }
            assert!(seen.insert(vector));
            more = coord.path_complete(outcome(false)).unwrap();
            paths += 1;
            assert!(paths <= 8);
        }
        assert_eq!(seen.len(), 8);
    }

    #[test]
    fn test_saved_path_keeps_issue_order_with_interleaved_draws() {
        // A fresh draw spliced between two replayed values must come back
        // out of the saved file in the order the decisions were issued.
        let dir = tempfile::tempdir().unwrap();
        let replay = DeterministicReplay::from_tokens(vec![
            ReplayToken::Value(Decision::new(4, 1)),
            ReplayToken::DrawFresh,
            ReplayToken::Value(Decision::new(4, 3)),
        ]);
        let mut coord = PathCoordinator::new(
            DecisionLedger::new(true),
            GustoController::new(false),
            Strategy::Replay(replay),
            SeededUniform::from_seed(0),
            u64::MAX,
            dir.path().to_path_buf(),
            None,
        );
        coord.begin_path();
        let issued = vec![
            coord.resolve(4).unwrap(),
            coord.resolve(4).unwrap(),
            coord.resolve(4).unwrap(),
        ];
        assert_eq!(issued[0], 1);
        assert_eq!(issued[2], 3);
        coord.save_current_path("interleaved.path").unwrap();

        let file = wander_codec::read_path(&dir.path().join("interleaved.path")).unwrap();
        let saved: Vec<u64> = file.decisions.iter().map(|d| d.value).collect();
        assert_eq!(saved, issued);
    }

    #[test]
    fn test_run_until_live_replays_rest_of_stream_after_live_path() {
        let input = format!("0 {}\n4 2\n", wander_core::REPLAY_CONTROL_BASE + 3);
        let replay =
            DeterministicReplay::from_reader(Box::new(std::io::Cursor::new(input)), false);
        let mut coord = coordinator(Strategy::Replay(replay));

        // Dead random path: keep waiting for a live one.
        coord.begin_path();
        coord.resolve(9).unwrap();
        assert!(coord.path_complete(outcome(false)).unwrap());

        // Live path: the run must continue so the unconsumed stream tokens
        // get their path.
        coord.begin_path();
        coord.resolve(9).unwrap();
        assert!(coord.path_complete(outcome(true)).unwrap());

        coord.begin_path();
        assert_eq!(coord.resolve(4).unwrap(), 2);
        assert!(!coord.path_complete(outcome(false)).unwrap());
    }

    #[test]
    fn test_replay_toggle_flips_gusto_at_next_decision() {
        let replay = DeterministicReplay::from_tokens(vec![
            ReplayToken::ToggleGusto,
            ReplayToken::Value(Decision::new(2, 1)),
            ReplayToken::Value(Decision::new(2, 0)),
        ]);
        let mut coord = coordinator(Strategy::Replay(replay));
        coord.begin_path();
        assert!(!coord.gusto_on());
        // The toggle rides along with the first value and lands at the next
        // decision index.
        assert_eq!(coord.resolve(2).unwrap(), 1);
        assert!(!coord.gusto_on());
        assert_eq!(coord.resolve(2).unwrap(), 0);
        assert!(coord.gusto_on());
    }

    #[test]
    fn test_stats_segment_accounting() {
        let mut coord = coordinator(Strategy::DepthDfs(DepthBoundedDfs::new(1, 1)));
        coord.begin_path();
        coord.resolve(2).unwrap();
        coord.resolve(5).unwrap();
        coord.path_complete(outcome(true)).unwrap();
        let stats = coord.stats();
        assert_eq!(stats.paths, 1);
        assert_eq!(stats.live_paths, 1);
        assert_eq!(stats.decisions, 2);
        assert_eq!(stats.search_decisions, 1);
        assert_eq!(stats.random_decisions, 1);
        assert_eq!(stats.steps, 5);
    }
}
