//! Demo harness for the Wander path explorer.
//!
//! Hosts a token-ring protocol under the decision engine and exposes the
//! path loop the `wander` binary drives. The protocol makes every network
//! fate (deliver, drop, duplicate) a coordinator decision, so any of the
//! search strategies can steer it.

pub mod protocol;
pub mod runner;

pub use protocol::{scripted_path, RingConfig, TokenRing};
pub use runner::PathRunner;
