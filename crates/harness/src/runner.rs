//! The path loop.

use tracing::info;
use wander_core::{EngineError, PathOutcome};
use wander_engine::{PathCoordinator, RunError};

/// Runs paths until the search is exhausted or the path budget is spent.
#[derive(Debug)]
pub struct PathRunner {
    coordinator: PathCoordinator,
}

impl PathRunner {
    /// Wrap a configured coordinator.
    pub fn new(coordinator: PathCoordinator) -> Self {
        Self { coordinator }
    }

    /// Drive `path` repeatedly until the coordinator says stop, then tear
    /// down.
    ///
    /// A replay terminate request ends the run cleanly rather than as an
    /// error.
    pub fn run<F>(&mut self, mut path: F) -> Result<(), RunError>
    where
        F: FnMut(&mut PathCoordinator) -> Result<PathOutcome, RunError>,
    {
        loop {
            self.coordinator.begin_path();
            let outcome = match path(&mut self.coordinator) {
                Ok(outcome) => outcome,
                Err(RunError::Engine(EngineError::ReplayTerminated)) => {
                    info!("Replay terminated by request");
                    break;
                }
                Err(e) => return Err(e),
            };
            if !self.coordinator.path_complete(outcome)? {
                break;
            }
        }
        self.coordinator.teardown()
    }

    /// The underlying coordinator.
    pub fn coordinator(&self) -> &PathCoordinator {
        &self.coordinator
    }

    /// Mutable access, for saving paths between runs.
    pub fn coordinator_mut(&mut self) -> &mut PathCoordinator {
        &mut self.coordinator
    }
}
