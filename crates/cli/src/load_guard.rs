//! Discards results of superseded loads.
//!
//! Every load takes a [`LoadTicket`] before it starts fetching. A result is
//! accepted only if no newer load has already been accepted, so a response
//! that arrives late can no longer overwrite fresher output, while loads
//! that overlap (each slower than the reload interval) still get shown.

use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

#[derive(Debug, Default)]
struct Generations {
    /// Last ticket handed out.
    started: AtomicU64,
    /// Newest ticket whose result was accepted.
    shown: AtomicU64,
}

#[derive(Debug, Clone, Default)]
pub struct LoadGuard {
    generations: Arc<Generations>,
}

#[derive(Debug, Clone)]
pub struct LoadTicket {
    generation: u64,
    generations: Arc<Generations>,
}

impl LoadGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new load. Its ticket is newer than every one handed out
    /// before.
    pub fn begin(&self) -> LoadTicket {
        let generation = self.generations.started.fetch_add(1, Ordering::AcqRel) + 1;
        LoadTicket {
            generation,
            generations: Arc::clone(&self.generations),
        }
    }

    /// Makes every outstanding ticket stale without starting a load.
    pub fn invalidate(&self) {
        let generation = self.generations.started.fetch_add(1, Ordering::AcqRel) + 1;
        self.generations.shown.fetch_max(generation, Ordering::AcqRel);
    }
}

impl LoadTicket {
    /// `true` while no newer result has been accepted.
    pub fn is_current(&self) -> bool {
        self.generations.shown.load(Ordering::Acquire) < self.generation
    }

    /// Keeps `value` unless a newer load's result was already accepted.
    pub fn accept<T>(&self, value: T) -> Option<T> {
        let previous = self
            .generations
            .shown
            .fetch_max(self.generation, Ordering::AcqRel);
        if previous < self.generation {
            Some(value)
        } else {
            tracing::debug!(generation = self.generation, "discarding stale load");
            None
        }
    }
}
