//! Scheduled units and their lifecycle.
//!
//! A scheduled unit is an independently running piece of logic with a
//! name, an ordered priority, and a coarse execution state. Units are
//! created once at bootstrap, run forever in production, and are joined
//! only through the shutdown path.
//!
//! On this port each unit is backed by an OS thread. The priority is
//! ordered metadata that is recorded and logged; actual preemption
//! order is the OS scheduler's business.

use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use log::{debug, error, info};

use crate::error::KexError;
use crate::sync::{Arc, Condvar, Mutex};

/// Unique identifier assigned to a unit at spawn time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskId(pub u8);

/// Ordered unit priority; higher wins on contention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskPriority(pub u8);

/// Coarse execution state of a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    /// Registered but the backing thread has not entered the entry yet.
    Ready,
    /// Executing its loop body.
    Running,
    /// Waiting inside a bounded sleep.
    Blocked,
    /// Parked on a suspend gate until resumed.
    Suspended,
    /// Entry function returned.
    Terminated,
}

/// Shared, observable state slot for one unit.
#[derive(Clone)]
pub(crate) struct StateCell {
    inner: Arc<Mutex<TaskState>>,
}

impl StateCell {
    fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(TaskState::Ready)),
        }
    }

    pub(crate) fn get(&self) -> TaskState {
        *self.inner.lock()
    }

    pub(crate) fn set(&self, state: TaskState) {
        *self.inner.lock() = state;
    }
}

/// Configuration for creating a scheduled unit.
#[derive(Debug, Clone)]
pub struct TaskConfig {
    pub name: String,
    pub priority: TaskPriority,
}

impl TaskConfig {
    pub fn new(name: impl Into<String>, priority: TaskPriority) -> Self {
        Self {
            name: name.into(),
            priority,
        }
    }
}

/// Cooperative stop signal shared by every unit of a [`TaskSet`].
///
/// Production loops never terminate on their own; each blocking point
/// goes through this token so tests (and the binary's bounded-run mode)
/// can stop and join the whole set.
#[derive(Clone)]
pub struct ShutdownToken {
    shared: Arc<ShutdownShared>,
}

struct ShutdownShared {
    triggered: Mutex<bool>,
    cond: Condvar,
}

impl ShutdownToken {
    pub fn new() -> Self {
        Self {
            shared: Arc::new(ShutdownShared {
                triggered: Mutex::new(false),
                cond: Condvar::new(),
            }),
        }
    }

    /// Requests shutdown and wakes every sleeper on this token.
    pub fn trigger(&self) {
        let mut triggered = self.shared.triggered.lock();
        if !*triggered {
            *triggered = true;
            self.shared.cond.notify_all();
        }
    }

    pub fn is_triggered(&self) -> bool {
        *self.shared.triggered.lock()
    }

    /// Sleeps for at least `duration` unless shutdown is requested
    /// first. Returns `true` if shutdown was observed.
    pub fn sleep_for(&self, duration: Duration) -> bool {
        let deadline = Instant::now() + duration;
        let mut triggered = self.shared.triggered.lock();
        loop {
            if *triggered {
                return true;
            }
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            let (guard, _timed_out) = self.shared.cond.wait_for(triggered, deadline - now);
            triggered = guard;
        }
    }

    /// Blocks until shutdown is requested.
    pub fn wait(&self) {
        let mut triggered = self.shared.triggered.lock();
        while !*triggered {
            triggered = self.shared.cond.wait(triggered);
        }
    }
}

impl Default for ShutdownToken {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-unit context handed to the entry function.
///
/// Carries the unit's identity and the shared shutdown token, and keeps
/// the observable [`TaskState`] honest across blocking points.
pub struct TaskCtx {
    id: TaskId,
    name: String,
    priority: TaskPriority,
    stop: ShutdownToken,
    state: StateCell,
}

impl TaskCtx {
    pub fn id(&self) -> TaskId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn priority(&self) -> TaskPriority {
        self.priority
    }

    pub fn stop(&self) -> &ShutdownToken {
        &self.stop
    }

    /// Periodic sleep; the unit reads as `Blocked` for the duration.
    /// Returns `true` if shutdown was observed.
    pub fn sleep(&self, duration: Duration) -> bool {
        self.state.set(TaskState::Blocked);
        let stopped = self.stop.sleep_for(duration);
        self.state.set(TaskState::Running);
        stopped
    }

    /// Parks on the given gate; the unit reads as `Suspended` until the
    /// gate wakes it.
    pub fn suspend(&self, gate: &crate::suspend::SuspendGate) -> crate::suspend::Wake {
        self.state.set(TaskState::Suspended);
        let wake = gate.suspend(&self.stop);
        self.state.set(TaskState::Running);
        wake
    }
}

struct TaskRecord {
    id: TaskId,
    name: String,
    priority: TaskPriority,
    state: StateCell,
    join: Option<JoinHandle<()>>,
}

#[derive(Default)]
struct TaskSetInner {
    records: Vec<TaskRecord>,
    next_id: u8,
}

/// Owner of a group of scheduled units sharing one shutdown token.
pub struct TaskSet {
    stop: ShutdownToken,
    inner: Mutex<TaskSetInner>,
}

impl TaskSet {
    pub fn new() -> Self {
        Self {
            stop: ShutdownToken::new(),
            inner: Mutex::new(TaskSetInner::default()),
        }
    }

    /// The shutdown token shared by all units of this set.
    pub fn shutdown_token(&self) -> ShutdownToken {
        self.stop.clone()
    }

    /// Spawns a new unit. Never blocks the caller.
    ///
    /// Duplicate names and spawning after shutdown are bootstrap errors.
    pub fn spawn<F>(&self, config: TaskConfig, entry: F) -> Result<TaskId, KexError>
    where
        F: FnOnce(&TaskCtx) + Send + 'static,
    {
        if self.stop.is_triggered() {
            return Err(KexError::ShuttingDown(config.name));
        }

        let mut inner = self.inner.lock();
        if inner.records.iter().any(|r| r.name == config.name) {
            return Err(KexError::DuplicateTask(config.name));
        }

        let id = TaskId(inner.next_id);
        inner.next_id = inner.next_id.wrapping_add(1);

        let state = StateCell::new();
        let ctx = TaskCtx {
            id,
            name: config.name.clone(),
            priority: config.priority,
            stop: self.stop.clone(),
            state: state.clone(),
        };

        let join = thread::Builder::new()
            .name(config.name.clone())
            .spawn(move || {
                ctx.state.set(TaskState::Running);
                debug!("task `{}` entered (priority {})", ctx.name, ctx.priority.0);
                entry(&ctx);
                ctx.state.set(TaskState::Terminated);
                debug!("task `{}` exited", ctx.name);
            })
            .map_err(|source| KexError::Spawn {
                name: config.name.clone(),
                source,
            })?;

        info!(
            "spawned task `{}` with priority {}",
            config.name, config.priority.0
        );
        inner.records.push(TaskRecord {
            id,
            name: config.name,
            priority: config.priority,
            state,
            join: Some(join),
        });
        Ok(id)
    }

    /// Observable state of a unit, by name.
    pub fn state_of(&self, name: &str) -> Option<TaskState> {
        let inner = self.inner.lock();
        inner
            .records
            .iter()
            .find(|r| r.name == name)
            .map(|r| r.state.get())
    }

    /// Priority recorded for a unit, by name.
    pub fn priority_of(&self, name: &str) -> Option<TaskPriority> {
        let inner = self.inner.lock();
        inner
            .records
            .iter()
            .find(|r| r.name == name)
            .map(|r| r.priority)
    }

    pub fn len(&self) -> usize {
        self.inner.lock().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().records.is_empty()
    }

    /// Hands control to the units until shutdown is requested from
    /// elsewhere, then joins them all. Does not return in normal
    /// production operation.
    pub fn run_until_shutdown(&self) {
        self.stop.wait();
        self.join_all();
    }

    /// Requests shutdown and joins every unit.
    pub fn shutdown(&self) {
        self.stop.trigger();
        self.join_all();
    }

    fn join_all(&self) {
        let handles: Vec<(String, JoinHandle<()>)> = {
            let mut inner = self.inner.lock();
            inner
                .records
                .iter_mut()
                .filter_map(|r| r.join.take().map(|j| (r.name.clone(), j)))
                .collect()
        };
        for (name, handle) in handles {
            if handle.join().is_err() {
                error!("task `{name}` panicked");
            }
        }
    }
}

impl Default for TaskSet {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for TaskSet {
    fn drop(&mut self) {
        self.stop.trigger();
        self.join_all();
    }
}
