//! Platform abstraction for locking primitives.
//!
//! Provides unified `Mutex` and `Condvar` types. With the default
//! `parking_lot` feature the crate uses `parking_lot` locks; without it,
//! standard library locks with panic-on-poison semantics, as poisoning
//! is not recoverable in this kind of system.

pub use std::sync::Arc;

#[cfg(feature = "parking_lot")]
pub type MutexGuard<'a, T> = parking_lot::MutexGuard<'a, T>;
#[cfg(not(feature = "parking_lot"))]
pub type MutexGuard<'a, T> = std::sync::MutexGuard<'a, T>;

/// Platform-agnostic mutex wrapper.
pub struct Mutex<T> {
    #[cfg(feature = "parking_lot")]
    inner: parking_lot::Mutex<T>,
    #[cfg(not(feature = "parking_lot"))]
    inner: std::sync::Mutex<T>,
}

impl<T> Mutex<T> {
    /// Creates a new mutex protecting the given value.
    pub fn new(value: T) -> Self {
        Self {
            #[cfg(feature = "parking_lot")]
            inner: parking_lot::Mutex::new(value),
            #[cfg(not(feature = "parking_lot"))]
            inner: std::sync::Mutex::new(value),
        }
    }

    /// Acquires the mutex, blocking until it becomes available.
    ///
    /// # Panics
    ///
    /// Without the `parking_lot` feature, panics if the mutex has been
    /// poisoned by a panicking thread.
    pub fn lock(&self) -> MutexGuard<'_, T> {
        #[cfg(feature = "parking_lot")]
        {
            self.inner.lock()
        }
        #[cfg(not(feature = "parking_lot"))]
        {
            self.inner.lock().expect("mutex poisoned")
        }
    }
}

/// Platform-agnostic condition variable wrapper.
///
/// Guards are passed by value and returned so that both backends share
/// one signature.
pub struct Condvar {
    #[cfg(feature = "parking_lot")]
    inner: parking_lot::Condvar,
    #[cfg(not(feature = "parking_lot"))]
    inner: std::sync::Condvar,
}

impl Condvar {
    pub fn new() -> Self {
        Self {
            #[cfg(feature = "parking_lot")]
            inner: parking_lot::Condvar::new(),
            #[cfg(not(feature = "parking_lot"))]
            inner: std::sync::Condvar::new(),
        }
    }

    /// Blocks until notified. Subject to spurious wakeups; callers must
    /// re-check their predicate.
    pub fn wait<'a, T>(&self, guard: MutexGuard<'a, T>) -> MutexGuard<'a, T> {
        #[cfg(feature = "parking_lot")]
        {
            let mut guard = guard;
            self.inner.wait(&mut guard);
            guard
        }
        #[cfg(not(feature = "parking_lot"))]
        {
            self.inner.wait(guard).expect("mutex poisoned")
        }
    }

    /// Blocks until notified or the timeout elapses. Returns the guard
    /// and whether the wait timed out.
    pub fn wait_for<'a, T>(
        &self,
        guard: MutexGuard<'a, T>,
        timeout: std::time::Duration,
    ) -> (MutexGuard<'a, T>, bool) {
        #[cfg(feature = "parking_lot")]
        {
            let mut guard = guard;
            let result = self.inner.wait_for(&mut guard, timeout);
            (guard, result.timed_out())
        }
        #[cfg(not(feature = "parking_lot"))]
        {
            let (guard, result) = self
                .inner
                .wait_timeout(guard, timeout)
                .expect("mutex poisoned");
            (guard, result.timed_out())
        }
    }

    pub fn notify_one(&self) {
        self.inner.notify_one();
    }

    pub fn notify_all(&self) {
        self.inner.notify_all();
    }
}

impl Default for Condvar {
    fn default() -> Self {
        Self::new()
    }
}
