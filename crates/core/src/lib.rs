//! Core types for the Wander path explorer.
//!
//! This crate provides the foundational types for decision-controlled
//! simulation:
//!
//! - [`Decision`]: one resolved `(bound, value)` choice
//! - [`DecisionLedger`]: the per-path record of every decision, split into
//!   prefix / search / random segments
//! - [`GustoController`]: the toggle list behind the weighted-choice mode flag
//! - [`PathOutcome`] / [`EndCause`]: what the external simulator reports when
//!   a path ends
//! - [`UniformSource`]: the uniform-random capability, with a seeded
//!   ChaCha-backed implementation
//! - [`EngineError`]: the fatal error taxonomy
//!
//! # Architecture
//!
//! The protocol under test never touches a random number generator directly.
//! Every nondeterministic choice flows through a single entry point as a
//! "pick an integer in `[0, bound)`" request:
//!
//! ```text
//! protocol ──resolve(bound)──▶ coordinator ──▶ ledger (prefix segment)
//!                                         └──▶ strategy (search / random tail)
//! ```
//!
//! The ledger records what was decided so a path can be serialized, replayed
//! bit-exactly, or minimized after the fact. All state here is plain data;
//! the search strategies and the lifecycle coordinator live in their own
//! crates and own these types exclusively.

mod decision;
mod error;
mod gusto;
mod ledger;
mod outcome;
mod rng;

pub use decision::Decision;
pub use error::EngineError;
pub use gusto::GustoController;
pub use ledger::{DecisionLedger, Segment};
pub use outcome::{EndCause, PathOutcome};
pub use rng::{SeededUniform, UniformSource};

/// Bounds at or above this limit are treated as continuous: the search
/// odometer re-samples them instead of enumerating every value.
pub const MAX_ENUMERABLE_BOUND: u64 = 1 << 31;

/// How many fresh samples a continuous odometer slot is given before it
/// carries over to the slot on its left.
pub const MAX_CONTINUOUS_SAMPLES: u32 = 20;

/// Line terminating the gusto-toggle block in a path file.
pub const TOGGLE_SENTINEL: u64 = u32::MAX as u64;

/// First in-band control value in a raw replay stream. Values at or above
/// this are interactive control tokens, not decisions.
pub const REPLAY_CONTROL_BASE: u64 = 1_000_000;
