//! Cell - per-cell evolution step over the shared state arena.

use crate::EngineError;

use super::cell_state::CellState;
use super::rule::{Coordinate, Rule};
use super::storage::StateStorage;

/// Outcome of [`Cell::evolve_if_ready`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Evaluation {
    /// The cell was not active for this step.
    Skipped,
    /// The rule ran and produced the same values as the slot held.
    Unchanged,
    /// The rule ran and the cell's values changed.
    Changed,
}

/// Reusable gather buffers, one per worker.
#[derive(Debug, Default)]
pub struct EvolveScratch {
    own: Vec<f32>,
    neighbors: Vec<Vec<f32>>,
}

/// A grid cell: its state index in the arena plus its neighbors' indices.
///
/// The cell owns the state at `index`; neighbor indices are read-only
/// references into the same arena.
#[derive(Debug, Clone)]
pub struct Cell {
    coordinate: Coordinate,
    index: usize,
    neighbors: Vec<usize>,
}

impl Cell {
    pub(crate) fn new(coordinate: Coordinate, index: usize, neighbors: Vec<usize>) -> Self {
        Self {
            coordinate,
            index,
            neighbors,
        }
    }

    #[inline]
    pub fn coordinate(&self) -> &[usize] {
        &self.coordinate
    }

    /// Arena index of this cell's own state.
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Arena indices of the neighbors, in neighborhood order.
    #[inline]
    pub fn neighbors(&self) -> &[usize] {
        &self.neighbors
    }

    /// This cell's state within `states`.
    #[inline]
    pub fn state<'a, S>(&self, states: &'a [CellState<S>]) -> &'a CellState<S> {
        &states[self.index]
    }

    /// Recompute this cell for `step` if it is active.
    ///
    /// Reads only step `step - 1` of itself and its neighbors and writes only
    /// step `step` of itself. A change re-activates the cell and all of its
    /// neighbors for `step + 1`.
    pub fn evolve_if_ready<S: StateStorage>(
        &self,
        states: &[CellState<S>],
        rule: &dyn Rule,
        step: u64,
        scratch: &mut EvolveScratch,
    ) -> Result<Evaluation, EngineError> {
        let state = &states[self.index];
        if !state.is_active(step) {
            return Ok(Evaluation::Skipped);
        }

        // u64::MAX has the parity of -1, so step 0 still reads the other slot.
        let last_step = step.wrapping_sub(1);
        state.read_state_into(last_step, &mut scratch.own);
        if scratch.neighbors.len() < self.neighbors.len() {
            scratch.neighbors.resize_with(self.neighbors.len(), Vec::new);
        }
        for (&neighbor, buf) in self.neighbors.iter().zip(scratch.neighbors.iter_mut()) {
            states[neighbor].read_state_into(last_step, buf);
        }

        let neighbor_states: Vec<&[f32]> = scratch.neighbors[..self.neighbors.len()]
            .iter()
            .map(Vec::as_slice)
            .collect();
        let new_state = rule.evolve_cell(&scratch.own, &neighbor_states);

        if !state.set_state(&new_state, step)? {
            return Ok(Evaluation::Unchanged);
        }

        state.set_active_for_next_step(step);
        for &neighbor in &self.neighbors {
            states[neighbor].set_active_for_next_step(step);
        }
        Ok(Evaluation::Changed)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::compute::cell_state::HeapCellState;
    use crate::schema::Color;

    /// Sums the neighborhood and counts invocations.
    struct CountingSum {
        calls: AtomicUsize,
    }

    impl Rule for CountingSum {
        fn init_state(&self, _coordinate: &[usize]) -> Vec<f32> {
            vec![0.0]
        }

        fn evolve_cell(&self, last_state: &[f32], neighbors: &[&[f32]]) -> Vec<f32> {
            self.calls.fetch_add(1, Ordering::Relaxed);
            vec![last_state[0] + neighbors.iter().map(|n| n[0]).sum::<f32>()]
        }

        fn get_state_draw_color(&self, _state: &[f32]) -> Color {
            Color::BLACK
        }
    }

    fn arena(values: &[f32]) -> Vec<HeapCellState> {
        values.iter().map(|&v| HeapCellState::new(&[v])).collect()
    }

    /// Discharge the initial activity of every cell for `step`.
    fn settle(states: &[HeapCellState], step: u64) {
        for state in states {
            let current = state.get_state(step);
            state.set_state(&current, step).unwrap();
        }
    }

    #[test]
    fn test_evolve_reads_previous_step_in_neighbor_order() {
        struct Ordered;
        impl Rule for Ordered {
            fn init_state(&self, _coordinate: &[usize]) -> Vec<f32> {
                vec![0.0]
            }
            fn evolve_cell(&self, _last: &[f32], neighbors: &[&[f32]]) -> Vec<f32> {
                vec![neighbors[0][0] * 10.0 + neighbors[1][0]]
            }
            fn get_state_draw_color(&self, _state: &[f32]) -> Color {
                Color::WHITE
            }
        }

        let states = arena(&[0.0, 3.0, 4.0]);
        let cell = Cell::new(vec![0], 0, vec![2, 1]);
        let mut scratch = EvolveScratch::default();
        let outcome = cell
            .evolve_if_ready(&states, &Ordered, 1, &mut scratch)
            .unwrap();
        assert_eq!(outcome, Evaluation::Changed);
        assert_eq!(states[0].get_state(1), vec![43.0]);
    }

    #[test]
    fn test_idempotent_discharge() {
        let rule = CountingSum {
            calls: AtomicUsize::new(0),
        };
        let states = arena(&[1.0, 1.0]);
        let cell = Cell::new(vec![0], 0, vec![1]);
        let mut scratch = EvolveScratch::default();

        let first = cell.evolve_if_ready(&states, &rule, 1, &mut scratch).unwrap();
        let second = cell.evolve_if_ready(&states, &rule, 1, &mut scratch).unwrap();

        assert_eq!(first, Evaluation::Changed);
        assert_eq!(second, Evaluation::Skipped);
        assert_eq!(rule.calls.load(Ordering::Relaxed), 1);
        assert!(!states[0].is_active(1));
    }

    #[test]
    fn test_change_activates_self_and_neighbors() {
        let rule = CountingSum {
            calls: AtomicUsize::new(0),
        };
        let states = arena(&[0.0, 1.0, 0.0, 0.0]);
        settle(&states, 2);
        settle(&states, 1);
        // Only cell 0 is re-armed for step 1.
        states[0].set_active_for_next_step(0);

        let cell = Cell::new(vec![0], 0, vec![1, 2]);
        let mut scratch = EvolveScratch::default();
        let outcome = cell.evolve_if_ready(&states, &rule, 1, &mut scratch);
        assert_eq!(outcome.unwrap(), Evaluation::Changed);

        assert!(states[0].is_active(2));
        assert!(states[1].is_active(2));
        assert!(states[2].is_active(2));
        assert!(!states[3].is_active(2));
    }

    #[test]
    fn test_no_change_leaves_neighbors_alone() {
        let rule = CountingSum {
            calls: AtomicUsize::new(0),
        };
        let states = arena(&[0.0, 0.0, 0.0]);
        settle(&states, 2);
        settle(&states, 1);
        states[0].set_active_for_next_step(0);

        let cell = Cell::new(vec![0], 0, vec![1, 2]);
        let mut scratch = EvolveScratch::default();
        let outcome = cell.evolve_if_ready(&states, &rule, 1, &mut scratch);
        assert_eq!(outcome.unwrap(), Evaluation::Unchanged);

        assert!(states.iter().all(|s| !s.is_active(2)));
    }

    #[test]
    fn test_wrong_length_from_rule() {
        struct Grows;
        impl Rule for Grows {
            fn init_state(&self, _coordinate: &[usize]) -> Vec<f32> {
                vec![0.0]
            }
            fn evolve_cell(&self, last: &[f32], _neighbors: &[&[f32]]) -> Vec<f32> {
                let mut next = last.to_vec();
                next.push(1.0);
                next
            }
            fn get_state_draw_color(&self, _state: &[f32]) -> Color {
                Color::BLACK
            }
        }

        let states = arena(&[0.0, 0.0]);
        let cell = Cell::new(vec![0], 0, vec![1]);
        let mut scratch = EvolveScratch::default();
        let err = cell
            .evolve_if_ready(&states, &Grows, 1, &mut scratch)
            .unwrap_err();
        assert!(matches!(err, EngineError::LengthMismatch { .. }));
        assert!(states[0].is_active(1));
        assert_eq!(states[0].get_state(1), vec![0.0]);
    }
}
