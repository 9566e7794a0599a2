//! Token-ring demo protocol.
//!
//! A single token circulates around a ring of nodes over an unreliable
//! network. Every delivery attempt is a nondeterministic choice resolved
//! through the coordinator, so the explorer can enumerate loss and
//! duplication schedules that plain random testing rarely hits.

use tracing::debug;
use wander_core::{EndCause, PathOutcome};
use wander_engine::{PathCoordinator, RunError};

/// Ring topology and stopping parameters.
#[derive(Debug, Clone, Copy)]
pub struct RingConfig {
    /// Nodes in the ring.
    pub nodes: u64,
    /// Laps the token must complete for the path to end normally.
    pub target_laps: u64,
    /// Step budget per path.
    pub max_steps: u64,
}

impl Default for RingConfig {
    fn default() -> Self {
        Self {
            nodes: 4,
            target_laps: 3,
            max_steps: 200,
        }
    }
}

/// Weights for the per-step network fate: deliver, drop, duplicate.
const FATE_WEIGHTS: [u64; 3] = [8, 1, 1];

/// Token-ring protocol instance.
///
/// The failure predicate ("live" path) is a schedule where the network
/// dropped the token at least three times and duplicated it at least once;
/// the safety property is that at most one token exists when the path ends.
#[derive(Debug, Default)]
pub struct TokenRing {
    config: RingConfig,
}

impl TokenRing {
    /// Create a protocol instance for the given ring.
    pub fn new(config: RingConfig) -> Self {
        Self { config }
    }

    /// Drive one path, resolving every network fate through the
    /// coordinator, and report its outcome.
    pub fn run_path(&self, coordinator: &mut PathCoordinator) -> Result<PathOutcome, RunError> {
        let RingConfig {
            nodes,
            target_laps,
            max_steps,
        } = self.config;

        let mut holder = 0u64;
        let mut tokens = 1u64;
        let mut laps = 0u64;
        let mut drops = 0u64;
        let mut duplicates = 0u64;
        let mut step = 0u64;

        let cause = loop {
            if step >= max_steps {
                break EndCause::TooManySteps;
            }
            coordinator.set_step(step);
            match coordinator.resolve_weighted(&FATE_WEIGHTS)? {
                0 => {
                    holder = (holder + 1) % nodes;
                    if holder == 0 {
                        laps += 1;
                        if laps >= target_laps {
                            break EndCause::StoppingCondition;
                        }
                    }
                }
                1 => {
                    drops += 1;
                    tokens = tokens.saturating_sub(1);
                    if tokens == 0 {
                        // Ring recovery: a nondeterministically chosen node
                        // regenerates the token.
                        holder = coordinator.resolve(nodes)?;
                        tokens = 1;
                    }
                }
                _ => {
                    duplicates += 1;
                    tokens += 1;
                }
            }
            step += 1;
        };

        let outcome = PathOutcome {
            cause,
            is_live: drops >= 3 && duplicates >= 1,
            is_safe: tokens <= 1,
            step_count: step,
            decision_count: coordinator.ledger().position() as u64,
        };
        debug!(
            cause = outcome.cause.label(),
            laps, drops, duplicates, "Ring path finished"
        );
        Ok(outcome)
    }
}

/// Resolve a fixed sequence of bounds and return the values picked.
///
/// Used by tests that need full control over the decision shape of a path.
pub fn scripted_path(
    coordinator: &mut PathCoordinator,
    bounds: &[u64],
) -> Result<(Vec<u64>, PathOutcome), RunError> {
    let mut values = Vec::with_capacity(bounds.len());
    for (step, &bound) in bounds.iter().enumerate() {
        coordinator.set_step(step as u64);
        values.push(coordinator.resolve(bound)?);
    }
    let outcome = PathOutcome {
        cause: EndCause::StoppingCondition,
        is_live: false,
        is_safe: true,
        step_count: bounds.len() as u64,
        decision_count: coordinator.ledger().position() as u64,
    };
    Ok((values, outcome))
}
