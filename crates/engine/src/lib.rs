//! Path lifecycle coordination for the Wander explorer.
//!
//! One [`PathCoordinator`] per run owns the ledger, the gusto controller,
//! the uniform source, and the single [`wander_search::Strategy`] value. The
//! simulated protocol calls [`PathCoordinator::resolve`] (or
//! [`PathCoordinator::resolve_weighted`]) for every nondeterministic choice;
//! the host loop brackets paths with [`PathCoordinator::begin_path`] and
//! [`PathCoordinator::path_complete`] and keeps going while the latter says
//! so:
//!
//! ```no_run
//! use wander_core::{EndCause, PathOutcome};
//! use wander_engine::{EngineConfig, StrategyKind};
//!
//! # fn main() -> Result<(), wander_engine::RunError> {
//! let mut coordinator = EngineConfig::new()
//!     .strategy(StrategyKind::DepthDfs)
//!     .depth_increment(5)
//!     .max_depth(50)
//!     .seed(7)
//!     .build()?;
//!
//! loop {
//!     coordinator.begin_path();
//!     // ... drive the simulator, calling coordinator.resolve(bound) ...
//!     let outcome = PathOutcome {
//!         cause: EndCause::StoppingCondition,
//!         is_live: false,
//!         is_safe: true,
//!         step_count: 0,
//!         decision_count: 0,
//!     };
//!     if !coordinator.path_complete(outcome)? {
//!         break;
//!     }
//! }
//! coordinator.teardown()?;
//! # Ok(())
//! # }
//! ```

mod config;
mod coordinator;
mod error;
mod stats;

pub use config::{EngineConfig, StrategyKind};
pub use coordinator::PathCoordinator;
pub use error::RunError;
pub use stats::RunStats;
