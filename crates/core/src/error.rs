//! Fatal engine conditions.
//!
//! Every variant here terminates the run. A bound mismatch or an exhausted
//! replay stream means the system under test is not behaving
//! deterministically against a fixed decision sequence, so continuing would
//! silently corrupt the search and minimization invariants. Diagnostics
//! carry the offending decision index and bounds.

use thiserror::Error;

/// Errors raised at the decision boundary.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    /// A replayed or prefix decision was requested with a bound differing
    /// from the one recorded.
    #[error("bound mismatch at decision {position}: recorded {recorded}, requested {requested}")]
    BoundMismatch {
        /// Index of the offending decision.
        position: usize,
        /// Bound stored when the decision was first recorded.
        recorded: u64,
        /// Bound the protocol presented on replay.
        requested: u64,
    },

    /// Replay input ended while a real decision was still expected.
    #[error("replay stream exhausted at decision {position}")]
    StreamExhausted {
        /// Index of the decision that had no input left.
        position: usize,
    },

    /// A zero bound was passed where a value is structurally required.
    #[error("bound must be nonzero at decision {position}")]
    ZeroBound {
        /// Index of the offending decision.
        position: usize,
    },

    /// The replay stream carried an explicit terminate token.
    #[error("replay stream requested termination")]
    ReplayTerminated,
}
