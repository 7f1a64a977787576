use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Coalesces render requests into at most one pass per frame. Requests made
/// while a pass runs stay pending for the next frame.
#[derive(Debug, Default)]
pub struct RenderScheduler {
    pending: AtomicBool,
    requests: AtomicU64,
}

impl RenderScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&self) {
        self.requests.fetch_add(1, Ordering::Relaxed);
        self.pending.store(true, Ordering::Release);
    }

    /// Clears the pending flag, returning whether a pass should run now.
    pub fn take(&self) -> bool {
        self.pending.swap(false, Ordering::AcqRel)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::Acquire)
    }

    /// Total requests seen, coalesced or not.
    pub fn requests(&self) -> u64 {
        self.requests.load(Ordering::Relaxed)
    }
}
