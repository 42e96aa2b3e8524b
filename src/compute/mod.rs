//! Compute module - Cell storage, evolution and processors.

mod cell;
mod cell_state;
mod factory;
mod grid;
mod processor;
mod rule;
mod storage;

#[cfg(test)]
pub(crate) mod testing;

pub use cell::*;
pub use cell_state::*;
pub use factory::*;
pub use grid::*;
pub use processor::*;
pub use rule::*;
pub use storage::*;
