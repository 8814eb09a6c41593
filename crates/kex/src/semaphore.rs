//! Binary semaphore for signal-only handoff.
//!
//! The count is always 0 or 1. `give` never blocks and saturates at 1,
//! which makes it safe to call from restricted contexts such as a timer
//! callback. `take` parks the caller up to a bounded timeout.

use std::time::{Duration, Instant};

use crate::sync::{Arc, Condvar, Mutex};

struct SemShared {
    count: Mutex<u8>,
    available: Condvar,
}

/// 0/1 synchronization counter. Clones share the same counter.
#[derive(Clone)]
pub struct BinarySemaphore {
    shared: Arc<SemShared>,
}

impl BinarySemaphore {
    /// Creates a binary semaphore with count 0.
    pub fn new() -> Self {
        Self {
            shared: Arc::new(SemShared {
                count: Mutex::new(0),
                available: Condvar::new(),
            }),
        }
    }

    /// Releases the semaphore. Never blocks beyond the internal lock.
    ///
    /// Returns `false` if the count was already 1; the count saturates
    /// rather than overflowing, so an unconditional give from a timer
    /// callback preserves the 0/1 invariant.
    pub fn give(&self) -> bool {
        let mut count = self.shared.count.lock();
        if *count == 0 {
            *count = 1;
            drop(count);
            self.shared.available.notify_one();
            true
        } else {
            false
        }
    }

    /// Zero-timeout acquire.
    pub fn try_take(&self) -> bool {
        let mut count = self.shared.count.lock();
        if *count > 0 {
            *count = 0;
            true
        } else {
            false
        }
    }

    /// Acquires the semaphore, parking up to `timeout`. Returns whether
    /// it was acquired.
    pub fn take(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut count = self.shared.count.lock();
        loop {
            if *count > 0 {
                *count = 0;
                return true;
            }
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            let (guard, _timed_out) = self.shared.available.wait_for(count, deadline - now);
            count = guard;
        }
    }

    /// Current count; always 0 or 1.
    pub fn count(&self) -> u8 {
        *self.shared.count.lock()
    }
}

impl Default for BinarySemaphore {
    fn default() -> Self {
        Self::new()
    }
}
