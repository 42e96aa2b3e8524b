//! Double-buffered state of a single cell.
//!
//! Slot `step % 2` is written while evaluating `step`; slot `(step - 1) % 2`
//! holds the previous generation and is only read. A write reports a change
//! when it differs from what the same slot held two steps earlier, which is
//! exactly what a cell whose inputs did not change would have produced again.

use crate::EngineError;

use super::storage::{HeapStorage, SLOT_COUNT, SharedStorage, StateStorage};

/// Parity slot used by `step`.
#[inline]
fn slot(step: u64) -> usize {
    (step % SLOT_COUNT as u64) as usize
}

/// One cell's values, activity flags and redraw flag over a storage backend.
#[derive(Debug)]
pub struct CellState<S> {
    storage: S,
}

/// Cell state for the sequential processor.
pub type HeapCellState = CellState<HeapStorage>;

/// Cell state for the parallel processor.
pub type SharedCellState = CellState<SharedStorage>;

impl<S: StateStorage> CellState<S> {
    /// Create a state with both slots set to `initial`, active for the first
    /// two steps and marked for drawing.
    pub fn new(initial: &[f32]) -> Self {
        Self {
            storage: S::from_initial(initial),
        }
    }

    /// Number of values this cell holds.
    #[inline]
    pub fn len(&self) -> usize {
        self.storage.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }

    /// Whether the cell must be recomputed at `step`.
    #[inline]
    pub fn is_active(&self, step: u64) -> bool {
        self.storage.is_active(slot(step))
    }

    /// Mark the cell for recomputation at `step + 1`.
    ///
    /// Safe to call from several workers during the same generation.
    #[inline]
    pub fn set_active_for_next_step(&self, step: u64) {
        self.storage.set_active(slot(step + 1), true);
    }

    /// Values stored for `step`.
    pub fn get_state(&self, step: u64) -> Vec<f32> {
        let mut out = Vec::with_capacity(self.len());
        self.read_state_into(step, &mut out);
        out
    }

    /// Copy the values stored for `step` into `out`.
    #[inline]
    pub fn read_state_into(&self, step: u64, out: &mut Vec<f32>) {
        self.storage.read_slot(slot(step), out);
    }

    /// Store `new_state` for `step` and discharge this step's activity flag.
    ///
    /// Returns whether any value differed from the slot's previous content.
    /// A wrongly-sized state is rejected before anything is written.
    pub fn set_state(&self, new_state: &[f32], step: u64) -> Result<bool, EngineError> {
        if new_state.len() != self.len() {
            return Err(EngineError::LengthMismatch {
                expected: self.len(),
                actual: new_state.len(),
            });
        }

        let slot = slot(step);
        let changed = self.storage.write_slot(slot, new_state);
        if changed {
            self.storage.set_dirty(true);
        }
        self.storage.set_active(slot, false);
        Ok(changed)
    }

    /// Whether a change has not been drawn yet.
    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.storage.is_dirty()
    }

    /// Acknowledge that the current state has been drawn.
    #[inline]
    pub fn clear_dirty(&self) {
        self.storage.set_dirty(false);
    }
}
