//! Container resize observation.
//!
//! Observation batches are deferred to the next animation frame so a burst
//! of synchronous layout notifications produces one host callback per frame.

/// State of the container resize observer.
#[derive(Debug, Clone, Default)]
pub struct ResizeWatcher {
    observing: bool,
    frame_pending: bool,
}

impl ResizeWatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start observing the container.
    pub fn observe(&mut self) {
        self.observing = true;
    }

    pub fn is_observing(&self) -> bool {
        self.observing
    }

    /// Record an observer batch of `entries` size changes.
    ///
    /// Returns true when the caller must request an animation frame (i.e. no
    /// frame was already pending). Empty batches and batches arriving after
    /// disconnect are ignored.
    pub fn notify(&mut self, entries: usize) -> bool {
        if !self.observing || entries == 0 {
            return false;
        }
        let request_frame = !self.frame_pending;
        self.frame_pending = true;
        request_frame
    }

    /// Consume the pending frame. Returns true when the host must be notified.
    pub fn take_frame(&mut self) -> bool {
        let pending = self.frame_pending && self.observing;
        self.frame_pending = false;
        pending
    }

    /// Stop observing and drop any pending frame.
    pub fn disconnect(&mut self) {
        self.observing = false;
        self.frame_pending = false;
    }
}
