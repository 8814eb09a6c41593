//! Bounded FIFO message queues for inter-unit data handoff.
//!
//! Capacity is fixed at creation. Zero-timeout operations return
//! immediately with [`SyncError::QueueFull`] or [`SyncError::QueueEmpty`]
//! rather than blocking; bounded-timeout variants park the caller on a
//! condition variable until the queue changes or the deadline passes.
//! Within one channel, enqueue order equals dequeue order.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use crate::error::{KexError, SyncError, SyncResult};
use crate::sync::{Arc, Condvar, Mutex};

struct QueueInner<T> {
    items: VecDeque<T>,
    capacity: usize,
}

struct QueueShared<T> {
    inner: Mutex<QueueInner<T>>,
    not_empty: Condvar,
    not_full: Condvar,
}

/// Bounded FIFO channel. Clones share the same underlying queue.
pub struct MsgQueue<T> {
    shared: Arc<QueueShared<T>>,
}

impl<T> MsgQueue<T> {
    /// Creates a queue holding at most `capacity` tokens.
    pub fn with_capacity(capacity: usize) -> Result<Self, KexError> {
        if capacity == 0 {
            return Err(KexError::ZeroCapacity);
        }
        Ok(Self {
            shared: Arc::new(QueueShared {
                inner: Mutex::new(QueueInner {
                    items: VecDeque::with_capacity(capacity),
                    capacity,
                }),
                not_empty: Condvar::new(),
                not_full: Condvar::new(),
            }),
        })
    }

    /// Zero-timeout enqueue. Fails with `QueueFull` instead of blocking.
    pub fn try_send(&self, item: T) -> SyncResult<()> {
        let mut inner = self.shared.inner.lock();
        if inner.items.len() >= inner.capacity {
            return Err(SyncError::QueueFull);
        }
        inner.items.push_back(item);
        drop(inner);
        self.shared.not_empty.notify_one();
        Ok(())
    }

    /// Zero-timeout dequeue. Fails with `QueueEmpty` instead of blocking.
    pub fn try_receive(&self) -> SyncResult<T> {
        let mut inner = self.shared.inner.lock();
        match inner.items.pop_front() {
            Some(item) => {
                drop(inner);
                self.shared.not_full.notify_one();
                Ok(item)
            }
            None => Err(SyncError::QueueEmpty),
        }
    }

    /// Enqueue with a bounded wait for a free slot.
    pub fn send_timeout(&self, item: T, timeout: Duration) -> SyncResult<()> {
        let deadline = Instant::now() + timeout;
        let mut inner = self.shared.inner.lock();
        while inner.items.len() >= inner.capacity {
            let now = Instant::now();
            if now >= deadline {
                return Err(SyncError::Timeout);
            }
            let (guard, _timed_out) = self.shared.not_full.wait_for(inner, deadline - now);
            inner = guard;
        }
        inner.items.push_back(item);
        drop(inner);
        self.shared.not_empty.notify_one();
        Ok(())
    }

    /// Dequeue with a bounded wait for a token.
    pub fn recv_timeout(&self, timeout: Duration) -> SyncResult<T> {
        let deadline = Instant::now() + timeout;
        let mut inner = self.shared.inner.lock();
        loop {
            if let Some(item) = inner.items.pop_front() {
                drop(inner);
                self.shared.not_full.notify_one();
                return Ok(item);
            }
            let now = Instant::now();
            if now >= deadline {
                return Err(SyncError::Timeout);
            }
            let (guard, _timed_out) = self.shared.not_empty.wait_for(inner, deadline - now);
            inner = guard;
        }
    }

    /// Non-destructive occupancy count, always in `[0, capacity]`.
    pub fn len(&self) -> usize {
        self.shared.inner.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_full(&self) -> bool {
        let inner = self.shared.inner.lock();
        inner.items.len() >= inner.capacity
    }

    pub fn capacity(&self) -> usize {
        self.shared.inner.lock().capacity
    }
}

impl<T> Clone for MsgQueue<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn zero_capacity_is_a_creation_error() {
        assert!(matches!(
            MsgQueue::<i32>::with_capacity(0),
            Err(KexError::ZeroCapacity)
        ));
    }

    #[test]
    fn bounded_send_receive() {
        let queue: MsgQueue<i32> = MsgQueue::with_capacity(5).unwrap();
        assert!(queue.is_empty());

        for n in 1..=5 {
            queue.try_send(n).expect("send within capacity");
        }
        assert!(queue.is_full());
        assert_eq!(queue.len(), 5);
        assert!(matches!(queue.try_send(6), Err(SyncError::QueueFull)));
        // The failed send must not corrupt occupancy.
        assert_eq!(queue.len(), 5);

        assert_eq!(queue.try_receive().unwrap(), 1);
        assert_eq!(queue.len(), 4);
    }

    #[test]
    fn fifo_order_within_channel() {
        let queue: MsgQueue<&str> = MsgQueue::with_capacity(3).unwrap();
        queue.try_send("first").unwrap();
        queue.try_send("second").unwrap();
        queue.try_send("third").unwrap();

        assert_eq!(queue.try_receive().unwrap(), "first");
        assert_eq!(queue.try_receive().unwrap(), "second");
        assert_eq!(queue.try_receive().unwrap(), "third");
        assert!(matches!(queue.try_receive(), Err(SyncError::QueueEmpty)));
    }

    #[test]
    fn recv_timeout_reports_timeout_on_empty_queue() {
        let queue: MsgQueue<i32> = MsgQueue::with_capacity(1).unwrap();
        let started = Instant::now();
        let result = queue.recv_timeout(Duration::from_millis(20));
        assert!(matches!(result, Err(SyncError::Timeout)));
        assert!(started.elapsed() >= Duration::from_millis(20));
    }

    #[test]
    fn recv_timeout_wakes_on_send() {
        let queue: MsgQueue<i32> = MsgQueue::with_capacity(1).unwrap();
        let receiver = {
            let queue = queue.clone();
            thread::spawn(move || queue.recv_timeout(Duration::from_secs(10)))
        };
        thread::sleep(Duration::from_millis(10));
        queue.try_send(7).unwrap();
        assert_eq!(receiver.join().unwrap().unwrap(), 7);
    }

    #[test]
    fn send_timeout_wakes_on_drain() {
        let queue: MsgQueue<i32> = MsgQueue::with_capacity(1).unwrap();
        queue.try_send(1).unwrap();

        let sender = {
            let queue = queue.clone();
            thread::spawn(move || queue.send_timeout(2, Duration::from_secs(10)))
        };
        thread::sleep(Duration::from_millis(10));
        assert_eq!(queue.try_receive().unwrap(), 1);
        sender.join().unwrap().expect("slot freed before deadline");
        assert_eq!(queue.try_receive().unwrap(), 2);
    }

    #[test]
    fn occupancy_never_exceeds_capacity_under_contention() {
        let queue: MsgQueue<i32> = MsgQueue::with_capacity(5).unwrap();
        let mut workers = Vec::new();
        for _ in 0..4 {
            let queue = queue.clone();
            workers.push(thread::spawn(move || {
                for n in 0..100 {
                    let _ = queue.try_send(n);
                    let _ = queue.try_receive();
                    assert!(queue.len() <= queue.capacity());
                }
            }));
        }
        for worker in workers {
            worker.join().unwrap();
        }
        assert!(queue.len() <= 5);
    }
}
