//! Deadline-based debouncing driven by the host clock.
//!
//! Each `trigger` pushes the deadline out to `now + window`; `poll` fires at
//! most once per burst. The wasm binding arms a `setTimeout` for the window
//! and polls when it expires; native hosts poll from their frame loop.

/// Trailing-edge debouncer over a millisecond clock.
#[derive(Debug, Clone)]
pub struct Debouncer {
    window_ms: f64,
    deadline: Option<f64>,
    /// Bumped on every trigger/cancel so stale timers can be recognised
    generation: u64,
}

impl Debouncer {
    pub fn new(window_ms: f64) -> Self {
        Self {
            window_ms,
            deadline: None,
            generation: 0,
        }
    }

    pub fn window_ms(&self) -> f64 {
        self.window_ms
    }

    /// Record an event at `now_ms`, superseding any pending one.
    /// Returns the generation the caller should poll with.
    pub fn trigger(&mut self, now_ms: f64) -> u64 {
        self.deadline = Some(now_ms + self.window_ms);
        self.generation = self.generation.wrapping_add(1);
        self.generation
    }

    /// Fire if the pending deadline has passed. Consumes the pending event.
    pub fn poll(&mut self, now_ms: f64) -> bool {
        match self.deadline {
            Some(deadline) if now_ms >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    /// True if `generation` is still the latest trigger.
    pub fn is_current(&self, generation: u64) -> bool {
        self.deadline.is_some() && self.generation == generation
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Drop any pending event; timers armed earlier become stale.
    pub fn cancel(&mut self) {
        self.deadline = None;
        self.generation = self.generation.wrapping_add(1);
    }
}
