//! Processors - drive a grid through successive generations.
//!
//! Two strategies evaluate the same per-cell step:
//!
//! - [`SequentialProcessor`] visits every cell on the calling thread.
//! - [`ParallelProcessor`] splits the cell arena into one disjoint range per
//!   worker and writes results straight into shared storage; the call returns
//!   once every worker has finished the generation.

use std::any::Any;
use std::ops::Range;
use std::panic::{self, AssertUnwindSafe};

use rayon::prelude::*;

use crate::EngineError;
use crate::schema::{ConfigError, GenerationStats};

use super::cell::{EvolveScratch, Evaluation};
use super::cell_state::CellState;
use super::grid::{GridState, HeapGrid, SharedGrid};
use super::rule::Rule;
use super::storage::{HeapStorage, SharedStorage, StateStorage};

/// Common interface of the evolution strategies.
pub trait Processor {
    type Storage: StateStorage;

    /// Grid being evolved.
    fn grid(&self) -> &GridState<Self::Storage>;

    /// Advance the grid by one generation.
    fn evolve(&mut self) -> Result<(), EngineError>;

    /// Counters from the most recent successful generation.
    fn last_stats(&self) -> GenerationStats;

    /// Advance the grid by `times` generations, stopping at the first failure.
    fn evolve_x_times(&mut self, times: u64) -> Result<(), EngineError> {
        for _ in 0..times {
            self.evolve()?;
        }
        Ok(())
    }

    fn dimension(&self) -> &[usize] {
        self.grid().dimension()
    }

    /// All `(coordinate, state)` pairs, for renderers looking for dirty cells.
    fn cells(&self) -> impl Iterator<Item = (&[usize], &CellState<Self::Storage>)> {
        self.grid().cells()
    }

    fn current_step(&self) -> u64 {
        self.grid().step()
    }

    fn current_rule(&self) -> &dyn Rule {
        self.grid().rule()
    }
}

/// Evaluate the cells of `range` for `step`.
fn evolve_range<S: StateStorage>(
    grid: &GridState<S>,
    range: Range<usize>,
    step: u64,
    scratch: &mut EvolveScratch,
) -> Result<GenerationStats, EngineError> {
    let states = grid.states();
    let rule = grid.rule();
    let mut stats = GenerationStats::for_step(step);

    for cell in &grid.cell_list()[range] {
        match cell.evolve_if_ready(states, rule, step, scratch)? {
            Evaluation::Skipped => stats.skipped += 1,
            Evaluation::Unchanged => stats.evaluated += 1,
            Evaluation::Changed => {
                stats.evaluated += 1;
                stats.changed += 1;
            }
        }
    }

    Ok(stats)
}

/// Single-threaded processor over heap storage.
pub struct SequentialProcessor {
    grid: HeapGrid,
    scratch: EvolveScratch,
    stats: GenerationStats,
    halted_at: Option<u64>,
}

impl SequentialProcessor {
    pub fn new(grid: HeapGrid) -> Self {
        log::info!(
            "Sequential processor ready for {} cells {:?}",
            grid.len(),
            grid.dimension()
        );

        Self {
            grid,
            scratch: EvolveScratch::default(),
            stats: GenerationStats::default(),
            halted_at: None,
        }
    }
}

impl Processor for SequentialProcessor {
    type Storage = HeapStorage;

    fn grid(&self) -> &HeapGrid {
        &self.grid
    }

    fn evolve(&mut self) -> Result<(), EngineError> {
        if let Some(step) = self.halted_at {
            return Err(EngineError::Halted { step });
        }

        let step = self.grid.advance_step();
        match evolve_range(&self.grid, 0..self.grid.len(), step, &mut self.scratch) {
            Ok(stats) => {
                log::debug!(
                    "Step {}: evaluated {}, changed {}, skipped {}",
                    step,
                    stats.evaluated,
                    stats.changed,
                    stats.skipped
                );
                self.stats = stats;
                Ok(())
            }
            Err(err) => {
                log::error!("Step {} failed: {}", step, err);
                self.halted_at = Some(step);
                Err(err)
            }
        }
    }

    fn last_stats(&self) -> GenerationStats {
        self.stats
    }
}

/// Context owned by one worker for the lifetime of the pool.
struct WorkerContext {
    /// Arena indices this worker evaluates every generation.
    range: Range<usize>,
    scratch: EvolveScratch,
}

impl WorkerContext {
    fn run(&mut self, grid: &SharedGrid, step: u64) -> Result<GenerationStats, EngineError> {
        evolve_range(grid, self.range.clone(), step, &mut self.scratch)
    }
}

/// Split `len` cells into `parts` contiguous, balanced ranges.
fn partition(len: usize, parts: usize) -> Vec<Range<usize>> {
    (0..parts)
        .map(|i| (i * len / parts)..((i + 1) * len / parts))
        .collect()
}

/// Best-effort text of a panic payload.
fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "worker panicked".to_string()
    }
}

/// Multi-worker processor over shared storage.
///
/// Workers are threads of a dedicated rayon pool, not OS processes. They
/// mutate the atomic [`SharedStorage`] arena in place.
///
/// With a single worker no pool is started and cells are evaluated inline,
/// exactly like [`SequentialProcessor`].
pub struct ParallelProcessor {
    grid: SharedGrid,
    process_count: usize,
    pool: Option<rayon::ThreadPool>,
    workers: Vec<WorkerContext>,
    stats: GenerationStats,
    halted_at: Option<u64>,
}

impl ParallelProcessor {
    /// Create a processor with `process_count` workers.
    pub fn new(grid: SharedGrid, process_count: usize) -> Result<Self, EngineError> {
        if process_count == 0 {
            return Err(ConfigError::InvalidProcessCount.into());
        }

        let pool = if process_count > 1 {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(process_count)
                .thread_name(|i| format!("automaton-worker-{}", i))
                .build()?;
            Some(pool)
        } else {
            None
        };

        let workers = partition(grid.len(), process_count)
            .into_iter()
            .map(|range| WorkerContext {
                range,
                scratch: EvolveScratch::default(),
            })
            .collect();

        log::info!(
            "Parallel processor ready for {} cells {:?} with {} workers",
            grid.len(),
            grid.dimension(),
            process_count
        );

        Ok(Self {
            grid,
            process_count,
            pool,
            workers,
            stats: GenerationStats::default(),
            halted_at: None,
        })
    }

    /// Number of workers.
    #[inline]
    pub fn process_count(&self) -> usize {
        self.process_count
    }

    /// Evaluate `step` on every worker and wait for all of them.
    fn run_generation(&mut self, step: u64) -> Result<GenerationStats, EngineError> {
        let grid = &self.grid;
        let workers = &mut self.workers;

        let Some(pool) = &self.pool else {
            return workers
                .iter_mut()
                .try_fold(GenerationStats::for_step(step), |acc, worker| {
                    Ok(acc.merge(worker.run(grid, step)?))
                });
        };

        let joined = panic::catch_unwind(AssertUnwindSafe(|| {
            pool.install(|| {
                workers
                    .par_iter_mut()
                    .map(|worker| worker.run(grid, step))
                    .collect::<Result<Vec<_>, EngineError>>()
            })
        }));

        match joined {
            Ok(parts) => Ok(parts?
                .into_iter()
                .fold(GenerationStats::for_step(step), GenerationStats::merge)),
            Err(payload) => Err(EngineError::WorkerFailure {
                step,
                message: panic_message(payload),
            }),
        }
    }
}

impl Processor for ParallelProcessor {
    type Storage = SharedStorage;

    fn grid(&self) -> &SharedGrid {
        &self.grid
    }

    fn evolve(&mut self) -> Result<(), EngineError> {
        if let Some(step) = self.halted_at {
            return Err(EngineError::Halted { step });
        }

        // Captured once: every worker evaluates this step.
        let step = self.grid.advance_step();
        match self.run_generation(step) {
            Ok(stats) => {
                log::debug!(
                    "Step {}: evaluated {}, changed {}, skipped {} across {} workers",
                    step,
                    stats.evaluated,
                    stats.changed,
                    stats.skipped,
                    self.process_count
                );
                self.stats = stats;
                Ok(())
            }
            Err(err) => {
                log::error!("Step {} failed: {}", step, err);
                self.halted_at = Some(step);
                Err(err)
            }
        }
    }

    fn last_stats(&self) -> GenerationStats {
        self.stats
    }
}

/// Processor whose strategy was picked from an [`EngineConfig`](crate::schema::EngineConfig).
pub enum AnyProcessor {
    Sequential(SequentialProcessor),
    Parallel(ParallelProcessor),
}

impl From<SequentialProcessor> for AnyProcessor {
    fn from(processor: SequentialProcessor) -> Self {
        AnyProcessor::Sequential(processor)
    }
}

impl From<ParallelProcessor> for AnyProcessor {
    fn from(processor: ParallelProcessor) -> Self {
        AnyProcessor::Parallel(processor)
    }
}

impl AnyProcessor {
    pub fn evolve(&mut self) -> Result<(), EngineError> {
        match self {
            AnyProcessor::Sequential(p) => p.evolve(),
            AnyProcessor::Parallel(p) => p.evolve(),
        }
    }

    pub fn evolve_x_times(&mut self, times: u64) -> Result<(), EngineError> {
        match self {
            AnyProcessor::Sequential(p) => p.evolve_x_times(times),
            AnyProcessor::Parallel(p) => p.evolve_x_times(times),
        }
    }

    pub fn dimension(&self) -> &[usize] {
        match self {
            AnyProcessor::Sequential(p) => p.dimension(),
            AnyProcessor::Parallel(p) => p.dimension(),
        }
    }

    pub fn current_step(&self) -> u64 {
        match self {
            AnyProcessor::Sequential(p) => p.current_step(),
            AnyProcessor::Parallel(p) => p.current_step(),
        }
    }

    pub fn current_rule(&self) -> &dyn Rule {
        match self {
            AnyProcessor::Sequential(p) => p.current_rule(),
            AnyProcessor::Parallel(p) => p.current_rule(),
        }
    }

    pub fn last_stats(&self) -> GenerationStats {
        match self {
            AnyProcessor::Sequential(p) => p.last_stats(),
            AnyProcessor::Parallel(p) => p.last_stats(),
        }
    }

    /// Values of every cell at the current step, in arena order.
    pub fn snapshot(&self) -> Vec<Vec<f32>> {
        match self {
            AnyProcessor::Sequential(p) => p.grid().snapshot(),
            AnyProcessor::Parallel(p) => p.grid().snapshot(),
        }
    }
}
