//! Search strategies for the Wander path explorer.
//!
//! Five interchangeable strategies decide how the search tail of each path
//! is filled in:
//!
//! - [`DepthBoundedDfs`]: iterative-deepening enumeration over a decision
//!   horizon measured in decisions
//! - [`StepBoundedDfs`]: the same odometer, horizon measured in simulator
//!   steps
//! - [`FrontierBfs`]: level-by-level exploration driven by a two-queue
//!   frontier of discovered prefixes
//! - [`BisectionMinimizer`]: doubling/halving search for the minimal failing
//!   prefix of a recorded bad path ("last nail")
//! - [`DeterministicReplay`]: lockstep reproduction from a token stream with
//!   interactive controls
//!
//! All five are variants of the [`Strategy`] enum; the lifecycle coordinator
//! owns exactly one value for the lifetime of the process and dispatches the
//! three shared operations (`next_decision`, `advance`, `has_more`) plus the
//! path begin/complete hooks over it.
//!
//! The carry mechanics shared by the enumerating strategies live in
//! [`odometer`]: a mixed-radix ripple counter over per-position bounds, with
//! re-sampled slots for bounds past the continuous threshold.

pub mod odometer;

mod depth_dfs;
mod frontier;
mod lastnail;
mod replay;
mod step_dfs;
mod strategy;

pub use depth_dfs::DepthBoundedDfs;
pub use frontier::{
    load_checkpoint, save_checkpoint, FrontierBfs, FrontierCheckpoint, SearchFrontier,
};
pub use lastnail::BisectionMinimizer;
pub use replay::{DeterministicReplay, ReplayToken};
pub use step_dfs::StepBoundedDfs;
pub use strategy::{DecisionCtx, Draw, EngineAction, Strategy};
