//! Suspend/resume gate between two scheduled units.
//!
//! [`SuspendGate::new`] returns a pair: the gate itself, which the
//! target unit parks on, and a [`ResumeToken`] for the controlling
//! unit. The token is a non-owning back-reference: it only permits
//! waking the target, never destroying it.

use std::time::Duration;

use crate::sync::{Arc, Condvar, Mutex};
use crate::task::ShutdownToken;

/// How often a parked unit re-checks the shutdown token.
const SHUTDOWN_POLL: Duration = Duration::from_millis(50);

/// Why a suspended unit woke up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wake {
    /// A controller called [`ResumeToken::resume`].
    Resumed,
    /// The shutdown token was triggered while parked.
    Shutdown,
}

struct GateState {
    suspended: bool,
    pending_resume: bool,
}

struct GateShared {
    state: Mutex<GateState>,
    cond: Condvar,
}

/// The target side of the relation: the unit parks itself here.
#[derive(Clone)]
pub struct SuspendGate {
    shared: Arc<GateShared>,
}

/// The controller side: a capability that only permits `resume`.
#[derive(Clone)]
pub struct ResumeToken {
    shared: Arc<GateShared>,
}

impl SuspendGate {
    pub fn new() -> (SuspendGate, ResumeToken) {
        let shared = Arc::new(GateShared {
            state: Mutex::new(GateState {
                suspended: false,
                pending_resume: false,
            }),
            cond: Condvar::new(),
        });
        (
            SuspendGate {
                shared: Arc::clone(&shared),
            },
            ResumeToken { shared },
        )
    }

    /// Parks the calling unit until resumed or shutdown.
    ///
    /// A resume issued while the unit is not parked is not latched; the
    /// unit stays parked until the next resume arrives.
    pub fn suspend(&self, stop: &ShutdownToken) -> Wake {
        let mut state = self.shared.state.lock();
        state.suspended = true;
        loop {
            if state.pending_resume {
                state.pending_resume = false;
                state.suspended = false;
                return Wake::Resumed;
            }
            if stop.is_triggered() {
                state.suspended = false;
                return Wake::Shutdown;
            }
            let (guard, _timed_out) = self.shared.cond.wait_for(state, SHUTDOWN_POLL);
            state = guard;
        }
    }

    /// Whether the target is currently parked on this gate.
    pub fn is_suspended(&self) -> bool {
        self.shared.state.lock().suspended
    }
}

impl ResumeToken {
    /// Wakes the parked target. Returns `false` (a no-op) if the target
    /// is not parked; calling resume on a running unit can never
    /// corrupt the gate.
    pub fn resume(&self) -> bool {
        let mut state = self.shared.state.lock();
        if state.suspended && !state.pending_resume {
            state.pending_resume = true;
            self.shared.cond.notify_one();
            true
        } else {
            false
        }
    }
}
