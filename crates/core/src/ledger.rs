//! Per-path record of every resolved decision.

use crate::{Decision, EngineError};

/// Which segment a freshly resolved decision lands in.
///
/// The prefix segment is never appended to during a path; it is loaded from
/// a saved path file (or interactive input) and replayed verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment {
    /// Actively enumerated / minimized portion, bounded by the horizon.
    Search,
    /// Beyond the horizon, drawn from the uniform primitive.
    Random,
}

/// Ordered record of every decision made in the current path.
///
/// The fixed `prefix` is replayed verbatim; everything after it lands in the
/// tail, tagged with the segment it came from. Search and random decisions
/// can interleave within one path (a replay stream may splice fresh draws
/// between replayed values), so the tail keeps issue order rather than
/// grouping by segment. `position` counts total decisions issued so far.
///
/// Per-path state (the tail and `position`) is cleared at the start of every
/// path; the prefix persists across all paths in a run unless explicitly
/// replaced.
#[derive(Debug, Default)]
pub struct DecisionLedger {
    prefix: Vec<Decision>,
    tail: Vec<(Segment, Decision)>,
    position: usize,
    check_prefix_bounds: bool,
}

impl DecisionLedger {
    /// Create an empty ledger.
    ///
    /// When `check_prefix_bounds` is set, replaying a prefix decision with a
    /// different bound than recorded is fatal.
    pub fn new(check_prefix_bounds: bool) -> Self {
        Self {
            check_prefix_bounds,
            ..Self::default()
        }
    }

    /// Reset per-path state. The prefix is retained.
    pub fn begin_path(&mut self) {
        self.tail.clear();
        self.position = 0;
    }

    /// Replace the fixed prefix. Takes effect from the next path.
    pub fn set_prefix(&mut self, prefix: Vec<Decision>) {
        self.prefix = prefix;
    }

    /// Total decisions issued so far in the current path.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Length of the fixed prefix.
    pub fn prefix_len(&self) -> usize {
        self.prefix.len()
    }

    /// Whether the next decision is served from the prefix.
    pub fn in_prefix(&self) -> bool {
        self.position < self.prefix.len()
    }

    /// Offset of the next decision into the search tail.
    ///
    /// Only meaningful once the prefix is exhausted.
    pub fn offset(&self) -> usize {
        self.position.saturating_sub(self.prefix.len())
    }

    /// Serve the next decision from the prefix and advance the position.
    pub fn replay_prefix(&mut self, bound: u64) -> Result<u64, EngineError> {
        let recorded = self.prefix[self.position];
        if self.check_prefix_bounds && recorded.bound != bound {
            return Err(EngineError::BoundMismatch {
                position: self.position,
                recorded: recorded.bound,
                requested: bound,
            });
        }
        self.position += 1;
        Ok(recorded.value)
    }

    /// Record a freshly resolved decision and advance the position.
    pub fn record(&mut self, segment: Segment, decision: Decision) {
        self.tail.push((segment, decision));
        self.position += 1;
    }

    /// The fixed prefix segment.
    pub fn prefix(&self) -> &[Decision] {
        &self.prefix
    }

    /// Decisions recorded after the prefix, tagged, in issue order.
    pub fn tail(&self) -> &[(Segment, Decision)] {
        &self.tail
    }

    /// Number of tail decisions in the given segment.
    pub fn segment_count(&self, segment: Segment) -> usize {
        self.tail.iter().filter(|(s, _)| *s == segment).count()
    }

    /// All decisions of the current path in issue order: the consumed part
    /// of the prefix, then the tail exactly as it was recorded.
    pub fn decisions(&self) -> impl Iterator<Item = &Decision> {
        self.prefix
            .iter()
            .take(self.position.min(self.prefix.len()))
            .chain(self.tail.iter().map(|(_, d)| d))
    }
}
