//! Step-bounded iterative-deepening search.

use tracing::debug;
use wander_core::{EngineError, UniformSource};

use crate::odometer::SlotVec;
use crate::strategy::{DecisionCtx, Draw};

/// Identical odometer mechanics to [`crate::DepthBoundedDfs`], but the
/// horizon is measured in external simulation steps rather than decisions.
///
/// On the first decision of a path the current step is captured as the
/// path's base; enumeration applies while `step < base + step_horizon`.
/// Once the step horizon is crossed, the remaining decisions of that path
/// are drawn randomly and gusto is forced on for the remainder.
#[derive(Debug)]
pub struct StepBoundedDfs {
    slots: SlotVec,
    step_horizon: u64,
    step_increment: u64,
    max_step_horizon: u64,
    /// Step count at the first decision of the current path.
    path_base_step: Option<u64>,
    /// The current path crossed the step horizon.
    past_horizon: bool,
    /// Some path at the current level crossed the step horizon.
    reached_horizon: bool,
    finished: bool,
}

impl StepBoundedDfs {
    /// Create a search starting at `step_increment` steps and deepening to
    /// at most `max_step_horizon`.
    pub fn new(step_increment: u64, max_step_horizon: u64) -> Self {
        debug_assert!(step_increment > 0);
        Self {
            slots: SlotVec::default(),
            step_horizon: step_increment.min(max_step_horizon),
            step_increment,
            max_step_horizon,
            path_base_step: None,
            past_horizon: false,
            reached_horizon: false,
            finished: false,
        }
    }

    /// Current step horizon.
    pub fn step_horizon(&self) -> u64 {
        self.step_horizon
    }

    /// Whether the current path has crossed the step horizon.
    pub fn past_horizon(&self) -> bool {
        self.past_horizon
    }

    pub(crate) fn on_path_begin(&mut self) {
        self.path_base_step = None;
        self.past_horizon = false;
    }

    pub(crate) fn next_decision(
        &mut self,
        ctx: &DecisionCtx,
        rng: &mut dyn UniformSource,
    ) -> Result<Draw, EngineError> {
        let base = *self.path_base_step.get_or_insert(ctx.step);
        if ctx.step >= base + self.step_horizon {
            self.past_horizon = true;
            self.reached_horizon = true;
            return Ok(Draw::Random);
        }
        let value = self.slots.visit(ctx.offset, ctx.bound, ctx.position, rng)?;
        Ok(Draw::Value(value))
    }

    pub(crate) fn advance(&mut self, rng: &mut dyn UniformSource) -> bool {
        if self.finished || !self.slots.advance(rng) {
            return false;
        }
        if !self.reached_horizon || self.step_horizon >= self.max_step_horizon {
            self.finished = true;
            return false;
        }
        self.step_horizon = (self.step_horizon + self.step_increment).min(self.max_step_horizon);
        self.reached_horizon = false;
        debug!(step_horizon = self.step_horizon, "Step horizon increased");
        true
    }

    pub(crate) fn has_more(&self) -> bool {
        !self.finished
    }
}
