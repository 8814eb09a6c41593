//! Error taxonomy for the kernel executive.
//!
//! Two tiers, matching how failures are handled:
//!
//! - [`KexError`]: bootstrap/creation failures. Callers must check these
//!   and skip starting dependent units rather than running against a
//!   missing resource.
//! - [`SyncError`]: expected runtime exhaustion (full queue, empty
//!   queue, timed-out wait). Logged at the point of detection and
//!   resolved by the next cycle; never propagated upward.

use thiserror::Error;

/// Bootstrap and resource-creation errors.
#[derive(Debug, Error)]
pub enum KexError {
    /// A task with the same name is already registered.
    #[error("task `{0}` already registered")]
    DuplicateTask(String),
    /// The task set is shutting down; no new units may start.
    #[error("task set is shutting down; `{0}` not spawned")]
    ShuttingDown(String),
    /// Queue capacity must be at least one token.
    #[error("queue capacity must be nonzero")]
    ZeroCapacity,
    /// Timer period must be nonzero.
    #[error("timer period must be nonzero")]
    ZeroPeriod,
    /// The OS refused to create the backing thread.
    #[error("failed to spawn OS thread for `{name}`")]
    Spawn {
        name: String,
        #[source]
        source: std::io::Error,
    },
}

/// Expected, recoverable synchronization failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SyncError {
    /// Bounded wait elapsed before the resource became available.
    #[error("operation timed out")]
    Timeout,
    /// Non-blocking send against a queue at capacity.
    #[error("message queue is full")]
    QueueFull,
    /// Non-blocking receive against an empty queue.
    #[error("message queue is empty")]
    QueueEmpty,
}

pub type SyncResult<T> = Result<T, SyncError>;
