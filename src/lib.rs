//! Cellular automaton evolution engine.
//!
//! A grid of cells, each holding a small vector of `f32` values, advances in
//! discrete steps under a pluggable [`Rule`]. Every cell keeps two state slots
//! (one per step parity) so the previous generation can be read while the next
//! one is written, and only cells whose inputs may have changed are recomputed.
//!
//! # Architecture
//!
//! The crate is split into two main modules:
//!
//! - `schema`: Configuration, statistics and color types
//! - `compute`: Cell storage, the factory and the sequential/parallel processors
//!
//! # Example
//!
//! ```rust,no_run
//! use cellular_automaton::{
//!     compute::{Coordinate, Factory, Neighborhood, Processor, Rule},
//!     schema::Color,
//! };
//!
//! struct Ring;
//!
//! impl Neighborhood for Ring {
//!     fn calculate_cell_neighbor_coordinates(
//!         &self,
//!         coordinate: &[usize],
//!         dimension: &[usize],
//!     ) -> Vec<Coordinate> {
//!         let n = dimension[0];
//!         vec![vec![(coordinate[0] + n - 1) % n], vec![(coordinate[0] + 1) % n]]
//!     }
//! }
//!
//! struct Rule90;
//!
//! impl Rule for Rule90 {
//!     fn init_state(&self, coordinate: &[usize]) -> Vec<f32> {
//!         vec![if coordinate[0] == 32 { 1.0 } else { 0.0 }]
//!     }
//!
//!     fn evolve_cell(&self, _last: &[f32], neighbors: &[&[f32]]) -> Vec<f32> {
//!         vec![(neighbors[0][0] + neighbors[1][0]) % 2.0]
//!     }
//!
//!     fn get_state_draw_color(&self, state: &[f32]) -> Color {
//!         if state[0] > 0.0 { Color::WHITE } else { Color::BLACK }
//!     }
//! }
//!
//! let mut processor = Factory::make_parallel(&[64], &Ring, Box::new(Rule90), 4)?;
//! processor.evolve_x_times(16)?;
//!
//! println!("Step {}: {:?}", processor.current_step(), processor.last_stats());
//! # Ok::<(), cellular_automaton::EngineError>(())
//! ```

pub mod compute;
pub mod schema;

mod error;

pub use error::EngineError;

// Re-export commonly used types
pub use compute::{
    Factory, GridState, Neighborhood, ParallelProcessor, Processor, Rule, SequentialProcessor,
};
pub use schema::{Color, EngineConfig, GenerationStats, Strategy};
