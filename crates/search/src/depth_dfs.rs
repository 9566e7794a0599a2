//! Depth-bounded iterative-deepening search.

use tracing::debug;
use wander_core::{EngineError, UniformSource};

use crate::odometer::SlotVec;
use crate::strategy::{DecisionCtx, Draw};

/// Enumerates every selection vector up to the current depth horizon, then
/// deepens.
///
/// For bounds all below the continuous threshold this visits every distinct
/// combination exactly once, in carry order (rightmost position fastest),
/// before the horizon grows by `depth_increment`. Deepening stops when no
/// path at the finished level used the full horizon (the tree is shallower
/// than the horizon) or when `max_depth` is reached.
#[derive(Debug)]
pub struct DepthBoundedDfs {
    slots: SlotVec,
    depth: usize,
    depth_increment: usize,
    max_depth: usize,
    /// Some path at the current level requested the decision at the final
    /// horizon offset.
    reached_horizon: bool,
    finished: bool,
}

impl DepthBoundedDfs {
    /// Create a search starting at `depth_increment` and deepening to at
    /// most `max_depth`.
    pub fn new(depth_increment: usize, max_depth: usize) -> Self {
        debug_assert!(depth_increment > 0);
        Self {
            slots: SlotVec::default(),
            depth: depth_increment.min(max_depth),
            depth_increment,
            max_depth,
            reached_horizon: false,
            finished: false,
        }
    }

    /// Current depth horizon.
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub(crate) fn next_decision(
        &mut self,
        ctx: &DecisionCtx,
        rng: &mut dyn UniformSource,
    ) -> Result<Draw, EngineError> {
        if ctx.offset >= self.depth {
            return Ok(Draw::Random);
        }
        if ctx.offset + 1 == self.depth {
            self.reached_horizon = true;
        }
        let value = self.slots.visit(ctx.offset, ctx.bound, ctx.position, rng)?;
        Ok(Draw::Value(value))
    }

    pub(crate) fn advance(&mut self, rng: &mut dyn UniformSource) -> bool {
        if self.finished || !self.slots.advance(rng) {
            return false;
        }
        // Level exhausted. Deepening is only worthwhile when some path at
        // this level used the full horizon.
        if !self.reached_horizon || self.depth >= self.max_depth {
            self.finished = true;
            return false;
        }
        self.depth = (self.depth + self.depth_increment).min(self.max_depth);
        self.reached_horizon = false;
        debug!(depth = self.depth, "Search depth increased");
        true
    }

    pub(crate) fn has_more(&self) -> bool {
        !self.finished
    }
}
