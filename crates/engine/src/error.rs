//! Run-level error taxonomy.

use thiserror::Error;
use wander_codec::CodecError;
use wander_core::EngineError;

/// Any fatal condition while configuring or driving a run.
#[derive(Debug, Error)]
pub enum RunError {
    /// A decision could not be resolved.
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// A path or checkpoint file could not be read or written.
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// Checkpoint or output I/O failure.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// The configuration is incomplete or contradictory.
    #[error("invalid configuration: {reason}")]
    Config {
        /// What was wrong.
        reason: String,
    },
}

impl RunError {
    pub(crate) fn config(reason: impl Into<String>) -> Self {
        RunError::Config {
            reason: reason.into(),
        }
    }
}
