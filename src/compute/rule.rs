//! Collaborator traits: transition rules and neighborhood topologies.

use crate::schema::Color;

/// Integer grid coordinate, one entry per axis.
pub type Coordinate = Vec<usize>;

/// Transition rule of an automaton.
///
/// Implementations must be deterministic for the sequential and parallel
/// processors to agree.
pub trait Rule: Send + Sync {
    /// Initial values of the cell at `coordinate`.
    fn init_state(&self, coordinate: &[usize]) -> Vec<f32>;

    /// Next values of a cell given its own and its neighbors' previous values.
    ///
    /// `neighbors_last_states` follows the order of the neighborhood. The result
    /// must have the same length as `last_state`.
    fn evolve_cell(&self, last_state: &[f32], neighbors_last_states: &[&[f32]]) -> Vec<f32>;

    /// Color a renderer should use for `state`.
    fn get_state_draw_color(&self, state: &[f32]) -> Color;
}

/// Adjacency between grid coordinates.
pub trait Neighborhood {
    /// Neighbors of `coordinate` in a grid of size `dimension`.
    ///
    /// The order must be stable: rules index neighbors positionally.
    fn calculate_cell_neighbor_coordinates(
        &self,
        coordinate: &[usize],
        dimension: &[usize],
    ) -> Vec<Coordinate>;
}
