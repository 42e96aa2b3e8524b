//! Grid state - the cell arena, its topology, step counter and rule.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use super::cell::Cell;
use super::cell_state::CellState;
use super::rule::{Coordinate, Rule};
use super::storage::{HeapStorage, SharedStorage, StateStorage};

/// Complete automaton state.
///
/// Cells and their states share one dense index: `cells[i]` owns `states[i]`.
/// Only the [`Factory`](super::Factory) constructs grids.
pub struct GridState<S> {
    cells: Vec<Cell>,
    states: Vec<CellState<S>>,
    index: HashMap<Coordinate, usize>,
    dimension: Vec<usize>,
    step: AtomicU64,
    rule: Box<dyn Rule>,
}

/// Grid driven by the sequential processor.
pub type HeapGrid = GridState<HeapStorage>;

/// Grid driven by the parallel processor.
pub type SharedGrid = GridState<SharedStorage>;

impl<S> GridState<S> {
    pub(crate) fn new(
        cells: Vec<Cell>,
        states: Vec<CellState<S>>,
        dimension: Vec<usize>,
        rule: Box<dyn Rule>,
    ) -> Self {
        let index = cells
            .iter()
            .map(|cell| (cell.coordinate().to_vec(), cell.index()))
            .collect();

        Self {
            cells,
            states,
            index,
            dimension,
            step: AtomicU64::new(0),
            rule,
        }
    }

    /// Per-axis grid sizes.
    #[inline]
    pub fn dimension(&self) -> &[usize] {
        &self.dimension
    }

    /// Number of cells in the grid.
    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Current evolution step.
    #[inline]
    pub fn step(&self) -> u64 {
        self.step.load(Ordering::Acquire)
    }

    /// Advance the step counter and return the new step.
    #[inline]
    pub(crate) fn advance_step(&self) -> u64 {
        self.step.fetch_add(1, Ordering::AcqRel) + 1
    }

    /// Active rule.
    #[inline]
    pub fn rule(&self) -> &dyn Rule {
        self.rule.as_ref()
    }

    /// Every cell in arena order.
    #[inline]
    pub fn cell_list(&self) -> &[Cell] {
        &self.cells
    }

    /// Cell state arena, indexed by [`Cell::index`].
    #[inline]
    pub fn states(&self) -> &[CellState<S>] {
        &self.states
    }

    /// Arena index of `coordinate`.
    #[inline]
    pub fn index_of(&self, coordinate: &[usize]) -> Option<usize> {
        self.index.get(coordinate).copied()
    }

    /// Cell at `coordinate`.
    pub fn cell(&self, coordinate: &[usize]) -> Option<&Cell> {
        self.index_of(coordinate).map(|i| &self.cells[i])
    }

    /// State of the cell at `coordinate`.
    pub fn cell_state(&self, coordinate: &[usize]) -> Option<&CellState<S>> {
        self.index_of(coordinate).map(|i| &self.states[i])
    }

    /// All `(coordinate, state)` pairs in arena order.
    pub fn cells(&self) -> impl Iterator<Item = (&[usize], &CellState<S>)> {
        self.cells
            .iter()
            .map(move |cell| (cell.coordinate(), cell.state(&self.states)))
    }
}

impl<S: StateStorage> GridState<S> {
    /// Cells with changes not yet drawn.
    pub fn dirty_cells(&self) -> impl Iterator<Item = (&[usize], &CellState<S>)> {
        self.cells().filter(|(_, state)| state.is_dirty())
    }

    /// Values of every cell at the current step, in arena order.
    pub fn snapshot(&self) -> Vec<Vec<f32>> {
        let step = self.step();
        self.states.iter().map(|s| s.get_state(step)).collect()
    }
}
