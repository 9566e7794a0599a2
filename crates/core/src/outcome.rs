//! Path outcomes reported by the external simulator.

/// Why the simulator ended a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EndCause {
    /// The event queue drained before anything else stopped the path.
    ExhaustedEvents,
    /// The simulator revisited a state it had already seen.
    DuplicateState,
    /// The simulator's stopping condition was satisfied.
    StoppingCondition,
    /// The path exceeded its step budget.
    TooManySteps,
}

impl EndCause {
    /// All causes, in stable order for per-cause counters.
    pub const ALL: [EndCause; 4] = [
        EndCause::ExhaustedEvents,
        EndCause::DuplicateState,
        EndCause::StoppingCondition,
        EndCause::TooManySteps,
    ];

    /// Stable index into per-cause counters.
    pub fn index(self) -> usize {
        match self {
            EndCause::ExhaustedEvents => 0,
            EndCause::DuplicateState => 1,
            EndCause::StoppingCondition => 2,
            EndCause::TooManySteps => 3,
        }
    }

    /// Human-readable label for summaries.
    pub fn label(self) -> &'static str {
        match self {
            EndCause::ExhaustedEvents => "exhausted-events",
            EndCause::DuplicateState => "duplicate-state",
            EndCause::StoppingCondition => "stopping-condition",
            EndCause::TooManySteps => "too-many-steps",
        }
    }
}

/// One complete path's verdict, produced by the external simulator.
///
/// The engine never judges correctness itself; it only supplies decisions
/// and consumes this report.
#[derive(Debug, Clone, Copy)]
pub struct PathOutcome {
    /// Why the path ended.
    pub cause: EndCause,
    /// Whether the path satisfied the simulator's interesting/failure
    /// predicate.
    pub is_live: bool,
    /// Whether the path kept all safety properties.
    pub is_safe: bool,
    /// Simulation steps executed.
    pub step_count: u64,
    /// Decisions issued.
    pub decision_count: u64,
}
