//! The strategy boundary: one enum, five exploration variants.

use wander_core::{EngineError, PathOutcome, UniformSource};

use crate::{
    BisectionMinimizer, DepthBoundedDfs, DeterministicReplay, FrontierBfs, StepBoundedDfs,
};

/// What the strategy answered for one decision request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Draw {
    /// Use this enumerated or replayed value; record it in the search
    /// segment.
    Value(u64),
    /// Beyond the horizon: draw from the uniform primitive and record it in
    /// the random tail.
    Random,
}

/// Context for one decision request.
#[derive(Debug, Clone, Copy)]
pub struct DecisionCtx {
    /// Exclusive upper limit declared by the protocol.
    pub bound: u64,
    /// Offset into the search tail: position minus the ledger prefix length.
    pub offset: usize,
    /// Absolute decision index in the current path, for diagnostics.
    pub position: usize,
    /// Simulator step counter at the time of the request.
    pub step: u64,
}

/// Side effects a strategy asks the coordinator to perform.
///
/// Strategies never touch files or the gusto controller themselves; they
/// queue actions which the coordinator drains and executes after each
/// decision or path boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineAction {
    /// Persist the current ledger (all segments) under this file name.
    SavePath {
        /// File name relative to the run's output directory.
        name: String,
    },
    /// Persist the decisions taken at or before the given simulator step.
    SavePrefixUpToStep {
        /// Step horizon for the saved prefix.
        step: u64,
        /// File name relative to the run's output directory.
        name: String,
    },
    /// Toggle gusto, effective at the next resolved decision.
    RequestGustoToggle,
}

/// The active exploration strategy.
///
/// Exactly one value exists per process, owned by the lifecycle coordinator
/// and created at configuration time.
#[derive(Debug)]
pub enum Strategy {
    /// Depth-bounded iterative-deepening enumeration.
    DepthDfs(DepthBoundedDfs),
    /// Step-bounded iterative-deepening enumeration.
    StepDfs(StepBoundedDfs),
    /// Breadth-first frontier exploration.
    Bfs(FrontierBfs),
    /// Bisection minimization of a recorded bad path.
    LastNail(BisectionMinimizer),
    /// Deterministic lockstep replay.
    Replay(DeterministicReplay),
}

impl Strategy {
    /// Supply the next search-tail decision.
    pub fn next_decision(
        &mut self,
        ctx: &DecisionCtx,
        rng: &mut dyn UniformSource,
    ) -> Result<Draw, EngineError> {
        match self {
            Strategy::DepthDfs(s) => s.next_decision(ctx, rng),
            Strategy::StepDfs(s) => s.next_decision(ctx, rng),
            Strategy::Bfs(s) => s.next_decision(ctx, rng),
            Strategy::LastNail(s) => s.next_decision(ctx),
            Strategy::Replay(s) => s.next_decision(ctx),
        }
    }

    /// Move to the next point in the search after a completed path.
    ///
    /// Returns `true` when a new search level was reached (depth grew, the
    /// frontier swapped, or the minimizer moved to a new prefix length).
    pub fn advance(&mut self, rng: &mut dyn UniformSource) -> bool {
        match self {
            Strategy::DepthDfs(s) => s.advance(rng),
            Strategy::StepDfs(s) => s.advance(rng),
            Strategy::Bfs(s) => s.advance(rng),
            Strategy::LastNail(s) => s.advance(),
            Strategy::Replay(_) => false,
        }
    }

    /// Whether another path should run. Idempotent: calling this any number
    /// of times changes no state.
    pub fn has_more(&self, last_live: bool) -> bool {
        match self {
            Strategy::DepthDfs(s) => s.has_more(),
            Strategy::StepDfs(s) => s.has_more(),
            Strategy::Bfs(s) => s.has_more(),
            Strategy::LastNail(s) => s.has_more(last_live),
            Strategy::Replay(s) => s.has_more(),
        }
    }

    /// Reset per-path strategy state at the start of a path.
    pub fn on_path_begin(&mut self) {
        match self {
            Strategy::DepthDfs(_) | Strategy::LastNail(_) => {}
            Strategy::StepDfs(s) => s.on_path_begin(),
            Strategy::Bfs(s) => s.on_path_begin(),
            Strategy::Replay(s) => s.on_path_begin(),
        }
    }

    /// Feed the simulator's verdict back to the strategy.
    pub fn on_path_complete(&mut self, outcome: &PathOutcome) {
        match self {
            Strategy::DepthDfs(_) | Strategy::StepDfs(_) => {}
            Strategy::Bfs(s) => s.on_path_complete(outcome),
            Strategy::LastNail(s) => s.on_path_complete(outcome),
            Strategy::Replay(s) => s.on_path_complete(outcome),
        }
    }

    /// Take any queued side-effect requests.
    pub fn drain_actions(&mut self) -> Vec<EngineAction> {
        match self {
            Strategy::LastNail(s) => s.drain_actions(),
            Strategy::Replay(s) => s.drain_actions(),
            _ => Vec::new(),
        }
    }

    /// Whether gusto should be forced on for the rest of the current path.
    pub fn wants_gusto_forced(&self) -> bool {
        match self {
            Strategy::StepDfs(s) => s.past_horizon(),
            _ => false,
        }
    }

    /// Short description of the current search level, for level-boundary
    /// logging.
    pub fn level_label(&self) -> String {
        match self {
            Strategy::DepthDfs(s) => format!("depth={}", s.depth()),
            Strategy::StepDfs(s) => format!("step_horizon={}", s.step_horizon()),
            Strategy::Bfs(s) => format!("bfs_depth={}", s.depth()),
            Strategy::LastNail(s) => format!("prefix_length={}", s.prefix_length()),
            Strategy::Replay(_) => "replay".to_string(),
        }
    }
}
