//! Configuration types for grid construction and processor selection.

use serde::{Deserialize, Serialize};

/// Default worker count for the parallel strategy.
fn default_process_count() -> usize {
    2
}

/// Top-level engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Per-axis grid sizes, outermost axis first.
    pub dimension: Vec<usize>,
    /// Evolution strategy.
    #[serde(default)]
    pub strategy: Strategy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            dimension: vec![64, 64],
            strategy: Strategy::default(),
        }
    }
}

/// How generations are evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Strategy {
    /// Every cell on the calling thread.
    #[default]
    Sequential,
    /// Cells split across a fixed pool of workers sharing the cell arena.
    Parallel {
        /// Number of workers. `1` evaluates inline like [`Strategy::Sequential`].
        #[serde(default = "default_process_count")]
        process_count: usize,
    },
}

impl Strategy {
    /// Validate strategy parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match *self {
            Strategy::Parallel { process_count: 0 } => Err(ConfigError::InvalidProcessCount),
            _ => Ok(()),
        }
    }
}

impl EngineConfig {
    /// Total number of cells (product of all axes).
    #[inline]
    pub fn cell_count(&self) -> usize {
        self.dimension.iter().product()
    }

    /// Validate configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_dimension(&self.dimension)?;
        self.strategy.validate()
    }
}

/// Check that a dimension has at least one axis and no zero-sized axis.
pub fn validate_dimension(dimension: &[usize]) -> Result<(), ConfigError> {
    if dimension.is_empty() {
        return Err(ConfigError::EmptyDimension);
    }
    if let Some(axis) = dimension.iter().position(|&size| size == 0) {
        return Err(ConfigError::ZeroSizedAxis { axis });
    }
    Ok(())
}

/// Configuration validation errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("Process count must be at least 1")]
    InvalidProcessCount,
    #[error("Grid dimension must have at least one axis")]
    EmptyDimension,
    #[error("Grid axis {axis} has size zero")]
    ZeroSizedAxis { axis: usize },
}
