//! Error type for grid construction and evolution.

use crate::schema::ConfigError;

/// Errors surfaced by the factory and the processors.
///
/// None of these are recoverable: once a generation fails the processor refuses
/// further evolution.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Rule returned a state of length {actual}, cell holds {expected} values")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("Neighborhood returned coordinate {coordinate:?} outside the grid")]
    UnknownNeighbor { coordinate: Vec<usize> },

    #[error("Rule returned an empty initial state for {coordinate:?}")]
    InvalidInitialState { coordinate: Vec<usize> },

    #[error("Worker failed during step {step}: {message}")]
    WorkerFailure { step: u64, message: String },

    #[error("Failed to start worker pool: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),

    #[error("Processor halted after a failure at step {step}")]
    Halted { step: u64 },
}
