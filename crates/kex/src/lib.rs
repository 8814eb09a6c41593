//! # kex - Kernel Executive Primitives
//!
//! A host-side (std) port of the four coordination services that a
//! preemptive RTOS kernel provides to application tasks:
//!
//! - **Scheduled units**: long-lived tasks with a name, an ordered
//!   priority, and a coarse execution state, spawned and joined through
//!   a [`TaskSet`].
//! - **Message queues**: bounded FIFO channels with non-blocking
//!   (zero-timeout) and bounded-timeout send/receive.
//! - **Binary semaphores**: 0/1 signal counters whose release path
//!   never blocks, so it is safe from timer-callback context.
//! - **Software timers**: auto-reloading periodic callback triggers.
//!
//! Units never share mutable memory directly; every handoff goes
//! through one of these primitives. All waits carry an explicit bounded
//! timeout, and every unit observes a [`ShutdownToken`] so the whole
//! set can be stopped and joined deterministically even though
//! production loops run forever.
//!
//! On this port a scheduled unit maps to an OS thread. [`TaskPriority`]
//! is recorded and logged but actual preemption order belongs to the
//! OS scheduler.
//!
//! ## Module Overview
//!
//! - [`task`] - Task identity, spawn/join lifecycle, shutdown tokens
//! - [`suspend`] - Suspend/resume gate with a non-owning resume capability
//! - [`queue`] - Bounded FIFO message queues
//! - [`semaphore`] - Binary semaphore
//! - [`timer`] - Periodic software timers

pub mod error;
pub mod queue;
pub mod semaphore;
pub mod suspend;
mod sync;
pub mod task;
pub mod timer;

pub use error::{KexError, SyncError, SyncResult};
pub use queue::MsgQueue;
pub use semaphore::BinarySemaphore;
pub use suspend::{ResumeToken, SuspendGate, Wake};
pub use task::{ShutdownToken, TaskConfig, TaskCtx, TaskId, TaskPriority, TaskSet, TaskState};
pub use timer::{PeriodicTimer, TimerConfig};
