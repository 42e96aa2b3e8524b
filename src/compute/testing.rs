//! Reference rules and neighborhoods shared by the unit tests.

use super::rule::{Coordinate, Neighborhood, Rule};
use crate::schema::Color;

/// Left/right neighbors along the last axis.
pub struct Line {
    wrap: bool,
}

impl Line {
    /// Edge cells have a single neighbor.
    pub fn clamped() -> Self {
        Self { wrap: false }
    }

    /// First and last cell of the axis are neighbors.
    pub fn wrapped() -> Self {
        Self { wrap: true }
    }
}

impl Neighborhood for Line {
    fn calculate_cell_neighbor_coordinates(
        &self,
        coordinate: &[usize],
        dimension: &[usize],
    ) -> Vec<Coordinate> {
        let axis = coordinate.len() - 1;
        let size = dimension[axis];
        let at = coordinate[axis];

        let left = if at > 0 {
            Some(at - 1)
        } else if self.wrap && size > 1 {
            Some(size - 1)
        } else {
            None
        };
        let right = if at + 1 < size {
            Some(at + 1)
        } else if self.wrap && size > 1 {
            Some(0)
        } else {
            None
        };

        [left, right]
            .into_iter()
            .flatten()
            .map(|position| {
                let mut neighbor = coordinate.to_vec();
                neighbor[axis] = position;
                neighbor
            })
            .collect()
    }
}

/// Eight surrounding cells of a 2-D torus, row by row.
pub struct MooreTorus;

impl Neighborhood for MooreTorus {
    fn calculate_cell_neighbor_coordinates(
        &self,
        coordinate: &[usize],
        dimension: &[usize],
    ) -> Vec<Coordinate> {
        let (rows, cols) = (dimension[0], dimension[1]);
        let mut neighbors = Vec::with_capacity(8);
        for dy in [rows - 1, 0, 1] {
            for dx in [cols - 1, 0, 1] {
                if dy == 0 && dx == 0 {
                    continue;
                }
                neighbors.push(vec![
                    (coordinate[0] + dy) % rows,
                    (coordinate[1] + dx) % cols,
                ]);
            }
        }
        neighbors
    }
}

/// A cell becomes 1 iff exactly one of itself and its neighbors is 1.
pub struct XorLine {
    initial: Vec<f32>,
}

impl XorLine {
    pub fn new(initial: Vec<f32>) -> Self {
        Self { initial }
    }
}

impl Rule for XorLine {
    fn init_state(&self, coordinate: &[usize]) -> Vec<f32> {
        vec![self.initial[coordinate[coordinate.len() - 1]]]
    }

    fn evolve_cell(&self, last_state: &[f32], neighbors: &[&[f32]]) -> Vec<f32> {
        let live = last_state[0] + neighbors.iter().map(|n| n[0]).sum::<f32>();
        vec![if live == 1.0 { 1.0 } else { 0.0 }]
    }

    fn get_state_draw_color(&self, state: &[f32]) -> Color {
        if state[0] > 0.0 {
            Color::WHITE
        } else {
            Color::BLACK
        }
    }
}

/// Initial value is the coordinate sum; the state never changes.
pub struct CoordinateSum;

impl Rule for CoordinateSum {
    fn init_state(&self, coordinate: &[usize]) -> Vec<f32> {
        vec![coordinate.iter().sum::<usize>() as f32]
    }

    fn evolve_cell(&self, last_state: &[f32], _neighbors: &[&[f32]]) -> Vec<f32> {
        last_state.to_vec()
    }

    fn get_state_draw_color(&self, _state: &[f32]) -> Color {
        Color::BLACK
    }
}

/// Conway's B3/S23 seeded from a hash of each coordinate.
///
/// The second value is the live neighbor count seen at the last step.
pub struct Life {
    seed: u64,
    density: u64,
    pattern: Option<Vec<Coordinate>>,
}

impl Life {
    /// About `density` percent of cells start alive.
    pub fn new(seed: u64, density: u64) -> Self {
        Self {
            seed,
            density,
            pattern: None,
        }
    }

    /// Exactly the listed cells start alive.
    pub fn with_pattern(live: Vec<Coordinate>) -> Self {
        Self {
            seed: 0,
            density: 0,
            pattern: Some(live),
        }
    }

    fn hash(&self, coordinate: &[usize]) -> u64 {
        coordinate.iter().fold(self.seed ^ 0x9E37_79B9_7F4A_7C15, |h, &c| {
            (h ^ c as u64)
                .wrapping_mul(0x0100_0000_01B3)
                .rotate_left(17)
        })
    }
}

impl Rule for Life {
    fn init_state(&self, coordinate: &[usize]) -> Vec<f32> {
        let alive = match &self.pattern {
            Some(live) => live.iter().any(|c| c.as_slice() == coordinate),
            None => self.hash(coordinate) % 100 < self.density,
        };
        vec![if alive { 1.0 } else { 0.0 }, 0.0]
    }

    fn evolve_cell(&self, last_state: &[f32], neighbors: &[&[f32]]) -> Vec<f32> {
        let live = neighbors.iter().filter(|n| n[0] > 0.0).count();
        let alive = last_state[0] > 0.0;
        let next = matches!((alive, live), (true, 2) | (true, 3) | (false, 3));
        vec![if next { 1.0 } else { 0.0 }, live as f32]
    }

    fn get_state_draw_color(&self, state: &[f32]) -> Color {
        if state[0] > 0.0 {
            Color::new(255, 255, 255)
        } else {
            Color::new(30, 30, 30)
        }
    }
}

/// Returns a shorter state than it was given.
pub struct Truncating;

impl Rule for Truncating {
    fn init_state(&self, _coordinate: &[usize]) -> Vec<f32> {
        vec![0.0, 0.0]
    }

    fn evolve_cell(&self, last_state: &[f32], _neighbors: &[&[f32]]) -> Vec<f32> {
        last_state[..1].to_vec()
    }

    fn get_state_draw_color(&self, _state: &[f32]) -> Color {
        Color::BLACK
    }
}

/// Panics when evolving a cell whose value equals `trigger`.
pub struct PanicOn {
    pub trigger: f32,
}

impl Rule for PanicOn {
    fn init_state(&self, coordinate: &[usize]) -> Vec<f32> {
        vec![coordinate[coordinate.len() - 1] as f32]
    }

    fn evolve_cell(&self, last_state: &[f32], _neighbors: &[&[f32]]) -> Vec<f32> {
        if last_state[0] == self.trigger {
            panic!("rule rejected value {}", self.trigger);
        }
        last_state.to_vec()
    }

    fn get_state_draw_color(&self, _state: &[f32]) -> Color {
        Color::BLACK
    }
}
