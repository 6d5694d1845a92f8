use std::cell::Cell;
use std::time::Duration;
use std::time::Instant;

/// Run-scoped counters, kept as plain `Cell`s rather than atomics: this engine is
/// single-threaded and synchronous by design, so there is no contention to guard
/// against.
pub struct Progress {
    nodes: Cell<usize>,
    decisions: Cell<usize>,
    start: Instant,
}

impl Default for Progress {
    fn default() -> Self {
        Self {
            nodes: Cell::new(0),
            decisions: Cell::new(0),
            start: Instant::now(),
        }
    }
}

impl Progress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inc_nodes(&self) {
        self.nodes.set(self.nodes.get() + 1);
    }

    pub fn inc_decisions(&self) {
        self.decisions.set(self.decisions.get() + 1);
    }

    pub fn nodes(&self) -> usize {
        self.nodes.get()
    }

    pub fn decisions(&self) -> usize {
        self.decisions.get()
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}
