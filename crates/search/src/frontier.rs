//! Breadth-first frontier search.

use std::collections::VecDeque;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use wander_core::{Decision, EngineError, UniformSource};

use crate::odometer::SlotVec;
use crate::strategy::{DecisionCtx, Draw};

/// Two queues of decision vectors: the one being drained at the current
/// depth and the one accumulating vectors discovered for the next level.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchFrontier {
    /// Prefixes still to be explored at the current depth.
    pub current: VecDeque<Vec<Decision>>,
    /// Prefixes discovered for depth + increment.
    pub next: VecDeque<Vec<Decision>>,
}

/// Serializable snapshot of a breadth-first search, for resuming a run
/// across process restarts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrontierCheckpoint {
    /// Depth horizon at snapshot time.
    pub depth: usize,
    /// Frontier entry being explored at snapshot time.
    pub base: Vec<Decision>,
    /// Both frontier queues.
    pub frontier: SearchFrontier,
}

/// Level-by-level exploration of the decision tree.
///
/// Each path replays a frontier prefix (`base`) verbatim, enumerates the
/// tail up to the depth horizon with the shared odometer, and draws randomly
/// past it. A full-depth vector whose path continued beyond the horizon is
/// pushed to the next-level queue; the queues swap and the depth grows only
/// when the current queue drains, which yields breadth-first order.
#[derive(Debug)]
pub struct FrontierBfs {
    base: Vec<Decision>,
    slots: SlotVec,
    frontier: SearchFrontier,
    depth: usize,
    depth_increment: usize,
    max_depth: usize,
    /// The current path went beyond the depth horizon.
    past_depth: bool,
    finished: bool,
}

impl FrontierBfs {
    /// Create a breadth-first search starting at `depth_increment`.
    pub fn new(depth_increment: usize, max_depth: usize) -> Self {
        debug_assert!(depth_increment > 0);
        Self {
            base: Vec::new(),
            slots: SlotVec::default(),
            frontier: SearchFrontier::default(),
            depth: depth_increment.min(max_depth),
            depth_increment,
            max_depth,
            past_depth: false,
            finished: false,
        }
    }

    /// Resume from a checkpoint taken by [`FrontierBfs::checkpoint`].
    pub fn from_checkpoint(
        depth_increment: usize,
        max_depth: usize,
        checkpoint: FrontierCheckpoint,
    ) -> Self {
        info!(
            depth = checkpoint.depth,
            current = checkpoint.frontier.current.len(),
            next = checkpoint.frontier.next.len(),
            "Resuming breadth-first search from checkpoint"
        );
        Self {
            base: checkpoint.base,
            slots: SlotVec::default(),
            frontier: checkpoint.frontier,
            depth: checkpoint.depth,
            depth_increment,
            max_depth,
            past_depth: false,
            finished: false,
        }
    }

    /// Snapshot the resumable search state.
    pub fn checkpoint(&self) -> FrontierCheckpoint {
        FrontierCheckpoint {
            depth: self.depth,
            base: self.base.clone(),
            frontier: self.frontier.clone(),
        }
    }

    /// Current depth horizon.
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub(crate) fn on_path_begin(&mut self) {
        self.past_depth = false;
    }

    pub(crate) fn next_decision(
        &mut self,
        ctx: &DecisionCtx,
        rng: &mut dyn UniformSource,
    ) -> Result<Draw, EngineError> {
        if let Some(recorded) = self.base.get(ctx.offset) {
            if recorded.bound != ctx.bound {
                return Err(EngineError::BoundMismatch {
                    position: ctx.position,
                    recorded: recorded.bound,
                    requested: ctx.bound,
                });
            }
            return Ok(Draw::Value(recorded.value));
        }
        if ctx.offset >= self.depth {
            self.past_depth = true;
            return Ok(Draw::Random);
        }
        let slot_index = ctx.offset - self.base.len();
        let value = self.slots.visit(slot_index, ctx.bound, ctx.position, rng)?;
        Ok(Draw::Value(value))
    }

    pub(crate) fn on_path_complete(&mut self, _outcome: &wander_core::PathOutcome) {
        // A vector explored through depth and beyond seeds the next level.
        if self.past_depth {
            let mut vector = self.base.clone();
            vector.extend(self.slots.decisions());
            debug_assert_eq!(vector.len(), self.depth);
            self.frontier.next.push_back(vector);
        }
    }

    pub(crate) fn advance(&mut self, rng: &mut dyn UniformSource) -> bool {
        if self.finished || !self.slots.advance(rng) {
            return false;
        }
        // Tails under this base are exhausted; take the next frontier entry
        // at the same depth.
        if let Some(base) = self.frontier.current.pop_front() {
            self.base = base;
            self.slots.clear();
            return false;
        }
        // Level drained: swap in the frontier discovered at depth+increment.
        if self.frontier.next.is_empty() || self.depth >= self.max_depth {
            self.finished = true;
            return false;
        }
        std::mem::swap(&mut self.frontier.current, &mut self.frontier.next);
        self.depth = (self.depth + self.depth_increment).min(self.max_depth);
        let Some(base) = self.frontier.current.pop_front() else {
            self.finished = true;
            return false;
        };
        self.base = base;
        self.slots.clear();
        debug!(
            depth = self.depth,
            frontier = self.frontier.current.len() + 1,
            "Advanced to next breadth-first level"
        );
        true
    }

    pub(crate) fn has_more(&self) -> bool {
        !self.finished
    }
}

/// Write a checkpoint as JSON.
pub fn save_checkpoint(path: &Path, checkpoint: &FrontierCheckpoint) -> std::io::Result<()> {
    let file = File::create(path)?;
    let mut w = BufWriter::new(file);
    serde_json::to_writer(&mut w, checkpoint)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
    w.flush()
}

/// Read a checkpoint written by [`save_checkpoint`].
pub fn load_checkpoint(path: &Path) -> std::io::Result<FrontierCheckpoint> {
    let file = File::open(path)?;
    serde_json::from_reader(BufReader::new(file))
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
}
