//! Storage backends for double-buffered cell state.
//!
//! Both backends expose the same slot-level interface through [`StateStorage`],
//! so [`CellState`](super::CellState) and everything above it is written once.
//!
//! - [`HeapStorage`]: plain interior-mutable buffers for single-threaded runs.
//! - [`SharedStorage`]: lock-free atomics that every worker of a parallel
//!   processor reads and writes in place.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

/// Number of state slots per cell (one per step parity).
pub const SLOT_COUNT: usize = 2;

/// Slot-level access to one cell's buffers.
///
/// All mutation goes through `&self`: neighbors flag each other active while
/// the owner writes its own slot.
pub trait StateStorage {
    /// Allocate storage with both slots holding `initial`.
    fn from_initial(initial: &[f32]) -> Self
    where
        Self: Sized;

    /// Number of values per slot.
    fn len(&self) -> usize;

    /// Copy slot `slot` into `out`, replacing its contents.
    fn read_slot(&self, slot: usize, out: &mut Vec<f32>);

    /// Overwrite slot `slot` with `values` and report whether any value differed.
    ///
    /// `values.len()` must equal [`len`](Self::len).
    fn write_slot(&self, slot: usize, values: &[f32]) -> bool;

    fn is_active(&self, slot: usize) -> bool;

    fn set_active(&self, slot: usize, active: bool);

    fn is_dirty(&self) -> bool;

    fn set_dirty(&self, dirty: bool);

    #[inline]
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Heap-backed storage for the sequential processor.
#[derive(Debug)]
pub struct HeapStorage {
    slots: [Box<[std::cell::Cell<f32>]>; SLOT_COUNT],
    active: [std::cell::Cell<bool>; SLOT_COUNT],
    dirty: std::cell::Cell<bool>,
}

impl HeapStorage {
    fn slot(initial: &[f32]) -> Box<[std::cell::Cell<f32>]> {
        initial.iter().copied().map(std::cell::Cell::new).collect()
    }
}

impl StateStorage for HeapStorage {
    fn from_initial(initial: &[f32]) -> Self {
        Self {
            slots: [Self::slot(initial), Self::slot(initial)],
            active: [std::cell::Cell::new(true), std::cell::Cell::new(true)],
            dirty: std::cell::Cell::new(true),
        }
    }

    #[inline]
    fn len(&self) -> usize {
        self.slots[0].len()
    }

    fn read_slot(&self, slot: usize, out: &mut Vec<f32>) {
        out.clear();
        out.extend(self.slots[slot].iter().map(std::cell::Cell::get));
    }

    fn write_slot(&self, slot: usize, values: &[f32]) -> bool {
        let mut changed = false;
        for (cell, &value) in self.slots[slot].iter().zip(values) {
            changed |= cell.replace(value) != value;
        }
        changed
    }

    #[inline]
    fn is_active(&self, slot: usize) -> bool {
        self.active[slot].get()
    }

    #[inline]
    fn set_active(&self, slot: usize, active: bool) {
        self.active[slot].set(active);
    }

    #[inline]
    fn is_dirty(&self) -> bool {
        self.dirty.get()
    }

    #[inline]
    fn set_dirty(&self, dirty: bool) {
        self.dirty.set(dirty);
    }
}

/// Atomic storage shared by all workers of a parallel processor.
///
/// Values are stored as `f32` bit patterns. Every access is `Relaxed`: within a
/// generation no two workers touch the same slot word, and activity flags only
/// go `false -> true`. Ordering between generations comes from the pool join.
#[derive(Debug)]
pub struct SharedStorage {
    slots: [Box<[AtomicU32]>; SLOT_COUNT],
    active: [AtomicBool; SLOT_COUNT],
    dirty: AtomicBool,
}

impl SharedStorage {
    fn slot(initial: &[f32]) -> Box<[AtomicU32]> {
        initial.iter().map(|v| AtomicU32::new(v.to_bits())).collect()
    }
}

impl StateStorage for SharedStorage {
    fn from_initial(initial: &[f32]) -> Self {
        Self {
            slots: [Self::slot(initial), Self::slot(initial)],
            active: [AtomicBool::new(true), AtomicBool::new(true)],
            dirty: AtomicBool::new(true),
        }
    }

    #[inline]
    fn len(&self) -> usize {
        self.slots[0].len()
    }

    fn read_slot(&self, slot: usize, out: &mut Vec<f32>) {
        out.clear();
        out.extend(
            self.slots[slot]
                .iter()
                .map(|word| f32::from_bits(word.load(Ordering::Relaxed))),
        );
    }

    fn write_slot(&self, slot: usize, values: &[f32]) -> bool {
        let mut changed = false;
        for (word, &value) in self.slots[slot].iter().zip(values) {
            let old = f32::from_bits(word.swap(value.to_bits(), Ordering::Relaxed));
            changed |= old != value;
        }
        changed
    }

    #[inline]
    fn is_active(&self, slot: usize) -> bool {
        self.active[slot].load(Ordering::Relaxed)
    }

    #[inline]
    fn set_active(&self, slot: usize, active: bool) {
        self.active[slot].store(active, Ordering::Relaxed);
    }

    #[inline]
    fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::Relaxed)
    }

    #[inline]
    fn set_dirty(&self, dirty: bool) {
        self.dirty.store(dirty, Ordering::Relaxed);
    }
}
