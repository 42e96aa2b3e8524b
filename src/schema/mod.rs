//! Schema module - Configuration and statistics types for automaton runs.

mod config;
mod stats;

pub use config::*;
pub use stats::*;
