//! Factory - builds grids and wraps them in processors.

use std::collections::HashMap;

use crate::EngineError;
use crate::schema::{EngineConfig, Strategy, validate_dimension};

use super::cell::Cell;
use super::cell_state::CellState;
use super::grid::GridState;
use super::processor::{AnyProcessor, ParallelProcessor, SequentialProcessor};
use super::rule::{Coordinate, Neighborhood, Rule};
use super::storage::StateStorage;

/// Every coordinate of `dimension` in row-major order (last axis fastest).
pub fn grid_coordinates(dimension: &[usize]) -> Vec<Coordinate> {
    let total: usize = dimension.iter().product();
    let mut coordinates = Vec::with_capacity(total);
    if total == 0 {
        return coordinates;
    }

    let mut current = vec![0usize; dimension.len()];
    for _ in 0..total {
        coordinates.push(current.clone());
        for axis in (0..dimension.len()).rev() {
            current[axis] += 1;
            if current[axis] < dimension[axis] {
                break;
            }
            current[axis] = 0;
        }
    }
    coordinates
}

/// Constructs grids and processors.
pub struct Factory;

impl Factory {
    /// Build a grid at step 0.
    ///
    /// The storage backend `S` is fixed here; the parallel processor needs
    /// [`SharedStorage`](super::SharedStorage) from the start.
    pub fn build<S: StateStorage>(
        dimension: &[usize],
        neighborhood: &dyn Neighborhood,
        rule: Box<dyn Rule>,
    ) -> Result<GridState<S>, EngineError> {
        validate_dimension(dimension)?;

        let coordinates = grid_coordinates(dimension);
        let lookup: HashMap<&[usize], usize> = coordinates
            .iter()
            .enumerate()
            .map(|(i, c)| (c.as_slice(), i))
            .collect();

        let states = coordinates
            .iter()
            .map(|coordinate| {
                let initial = rule.init_state(coordinate);
                if initial.is_empty() {
                    return Err(EngineError::InvalidInitialState {
                        coordinate: coordinate.clone(),
                    });
                }
                Ok(CellState::<S>::new(&initial))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let cells = coordinates
            .iter()
            .enumerate()
            .map(|(index, coordinate)| {
                let neighbors = neighborhood
                    .calculate_cell_neighbor_coordinates(coordinate, dimension)
                    .into_iter()
                    .map(|neighbor| {
                        lookup
                            .get(neighbor.as_slice())
                            .copied()
                            .ok_or(EngineError::UnknownNeighbor {
                                coordinate: neighbor,
                            })
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Cell::new(coordinate.clone(), index, neighbors))
            })
            .collect::<Result<Vec<_>, EngineError>>()?;

        log::debug!(
            "Built grid {:?} with {} cells",
            dimension,
            cells.len()
        );

        Ok(GridState::new(cells, states, dimension.to_vec(), rule))
    }

    /// Build a grid for single-threaded evolution.
    pub fn make_sequential(
        dimension: &[usize],
        neighborhood: &dyn Neighborhood,
        rule: Box<dyn Rule>,
    ) -> Result<SequentialProcessor, EngineError> {
        let grid = Self::build(dimension, neighborhood, rule)?;
        Ok(SequentialProcessor::new(grid))
    }

    /// Build a grid in shared storage evolved by `process_count` workers.
    pub fn make_parallel(
        dimension: &[usize],
        neighborhood: &dyn Neighborhood,
        rule: Box<dyn Rule>,
        process_count: usize,
    ) -> Result<ParallelProcessor, EngineError> {
        // Reject a bad worker count before building anything.
        Strategy::Parallel { process_count }.validate()?;
        let grid = Self::build(dimension, neighborhood, rule)?;
        ParallelProcessor::new(grid, process_count)
    }

    /// Build the processor described by `config`.
    pub fn make(
        config: &EngineConfig,
        neighborhood: &dyn Neighborhood,
        rule: Box<dyn Rule>,
    ) -> Result<AnyProcessor, EngineError> {
        config.validate()?;
        match config.strategy {
            Strategy::Sequential => {
                Self::make_sequential(&config.dimension, neighborhood, rule).map(Into::into)
            }
            Strategy::Parallel { process_count } => {
                Self::make_parallel(&config.dimension, neighborhood, rule, process_count)
                    .map(Into::into)
            }
        }
    }
}
