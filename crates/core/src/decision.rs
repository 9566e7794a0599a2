//! The unit record of controlled nondeterminism.

use serde::{Deserialize, Serialize};

/// One resolved choice made on behalf of the system under test.
///
/// `bound` is the exclusive upper limit the protocol declared when it asked
/// for the decision; `value` is what the engine answered, always in
/// `[0, bound)`. Once a decision has been recorded at a given index, any
/// later replay at that index must present an identical bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Decision {
    /// Exclusive upper limit declared by the caller.
    pub bound: u64,
    /// Resolved value in `[0, bound)`.
    pub value: u64,
}

impl Decision {
    /// Create a new decision.
    pub fn new(bound: u64, value: u64) -> Self {
        debug_assert!(value < bound, "decision value {value} out of bound {bound}");
        Self { bound, value }
    }
}
