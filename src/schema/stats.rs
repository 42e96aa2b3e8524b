//! Per-generation statistics and renderer-facing value types.

use serde::{Deserialize, Serialize};

/// RGB draw color for a cell state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::new(0, 0, 0);
    pub const WHITE: Color = Color::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Counters collected while evaluating one generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GenerationStats {
    /// Step the generation was evaluated for.
    pub step: u64,
    /// Cells whose rule was evaluated.
    pub evaluated: usize,
    /// Evaluated cells whose state changed.
    pub changed: usize,
    /// Cells skipped because they were not active.
    pub skipped: usize,
}

impl GenerationStats {
    /// Empty counters for `step`.
    pub fn for_step(step: u64) -> Self {
        Self {
            step,
            ..Self::default()
        }
    }

    /// Combine counters from two disjoint cell ranges of the same generation.
    pub fn merge(self, other: Self) -> Self {
        Self {
            step: self.step.max(other.step),
            evaluated: self.evaluated + other.evaluated,
            changed: self.changed + other.changed,
            skipped: self.skipped + other.skipped,
        }
    }

    /// Total number of cells visited.
    #[inline]
    pub fn visited(&self) -> usize {
        self.evaluated + self.skipped
    }
}
