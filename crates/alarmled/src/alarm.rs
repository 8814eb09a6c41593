//! Alarm-snooze subsystem.
//!
//! Three scheduled units coordinated purely through suspend/resume
//! signaling; no data crosses between them.
//!
//! - **Sleeper**: logs a fixed line once per period. Demonstrates
//!   baseline scheduling fairness alongside the other units.
//! - **Snoozer**: parks itself on a [`SuspendGate`] as its very first
//!   action, does one snooze cycle per resume, and unconditionally
//!   re-parks.
//! - **Ringer**: rings once per period and wakes the snoozer through a
//!   [`ResumeToken`], a capability that permits resume only and grants
//!   no control over the snoozer's lifetime.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use log::{debug, info};

use kex::{ResumeToken, SuspendGate, TaskConfig, TaskPriority, TaskSet, Wake};

use crate::config::AlarmConfig;
use crate::error::StartError;

pub const SLEEP_MSG: &str = "zzzzzzz";
pub const RING_MSG: &str = "ring! ring! ring!";
pub const SNOOZE_MSG: &str = "five more minutes...";

const SLEEPER_PRIORITY: TaskPriority = TaskPriority(6);
const SNOOZER_PRIORITY: TaskPriority = TaskPriority(5);
const RINGER_PRIORITY: TaskPriority = TaskPriority(4);

/// Observable counters for the subsystem. Incremented by the units,
/// read by tests and the shutdown summary.
#[derive(Default)]
pub struct AlarmStats {
    sleeps: AtomicU32,
    rings: AtomicU32,
    snoozes: AtomicU32,
}

impl AlarmStats {
    /// Completed sleeper cycles.
    pub fn sleeps(&self) -> u32 {
        self.sleeps.load(Ordering::Relaxed)
    }

    /// Alarm rings issued.
    pub fn rings(&self) -> u32 {
        self.rings.load(Ordering::Relaxed)
    }

    /// Snooze cycles completed. Never exceeds `rings`: each cycle
    /// requires a resume, and each resume follows a ring.
    pub fn snoozes(&self) -> u32 {
        self.snoozes.load(Ordering::Relaxed)
    }
}

/// Handle to the running subsystem.
pub struct AlarmSubsystem {
    stats: Arc<AlarmStats>,
    gate: SuspendGate,
    resume: ResumeToken,
}

impl AlarmSubsystem {
    /// Spawns the three units onto `tasks`. The snoozer is spawned
    /// first so it is parked before the first ring can arrive.
    pub fn start(config: &AlarmConfig, tasks: &TaskSet) -> Result<Self, StartError> {
        config.validate()?;

        let stats = Arc::new(AlarmStats::default());
        let (gate, resume) = SuspendGate::new();

        {
            let gate = gate.clone();
            let stats = Arc::clone(&stats);
            tasks.spawn(TaskConfig::new("snoozer", SNOOZER_PRIORITY), move |ctx| {
                loop {
                    match ctx.suspend(&gate) {
                        Wake::Shutdown => break,
                        Wake::Resumed => {
                            info!("{SNOOZE_MSG}");
                            stats.snoozes.fetch_add(1, Ordering::Relaxed);
                        }
                    }
                }
            })?;
        }

        {
            let period = config.sleeper_period;
            let stats = Arc::clone(&stats);
            tasks.spawn(TaskConfig::new("sleeper", SLEEPER_PRIORITY), move |ctx| {
                loop {
                    if ctx.sleep(period) {
                        break;
                    }
                    info!("{SLEEP_MSG}");
                    stats.sleeps.fetch_add(1, Ordering::Relaxed);
                }
            })?;
        }

        {
            let period = config.ring_period;
            let stats = Arc::clone(&stats);
            let resume = resume.clone();
            tasks.spawn(TaskConfig::new("ringer", RINGER_PRIORITY), move |ctx| {
                loop {
                    if ctx.sleep(period) {
                        break;
                    }
                    info!("{RING_MSG}");
                    stats.rings.fetch_add(1, Ordering::Relaxed);
                    if !resume.resume() {
                        // Snoozer was mid-cycle; resume on a running
                        // unit is a no-op by contract.
                        debug!("ring arrived while snoozer was awake");
                    }
                }
            })?;
        }

        Ok(Self {
            stats,
            gate,
            resume,
        })
    }

    pub fn stats(&self) -> &AlarmStats {
        &self.stats
    }

    /// Whether the snoozer is currently parked.
    pub fn snoozer_suspended(&self) -> bool {
        self.gate.is_suspended()
    }

    /// A clone of the ringer's capability, for driving the snoozer
    /// manually.
    pub fn resume_token(&self) -> ResumeToken {
        self.resume.clone()
    }
}
