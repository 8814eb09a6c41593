//! Periodic software timers.
//!
//! A timer fires a callback on a fixed period from a dedicated thread.
//! Auto-reload timers fire until stopped; one-shot timers fire once.
//! The callback runs outside any unit's context and must only do
//! non-blocking work, such as releasing a [`BinarySemaphore`].
//!
//! [`BinarySemaphore`]: crate::semaphore::BinarySemaphore

use std::sync::atomic::{AtomicU64, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use log::{debug, error};

use crate::error::KexError;
use crate::sync::Arc;
use crate::task::ShutdownToken;

/// Timer period and reload behavior.
#[derive(Debug, Clone, Copy)]
pub struct TimerConfig {
    pub period: Duration,
    pub auto_reload: bool,
}

impl TimerConfig {
    /// Auto-reloading timer firing every `period`.
    pub fn periodic(period: Duration) -> Self {
        Self {
            period,
            auto_reload: true,
        }
    }

    /// Timer firing once after `period`.
    pub fn one_shot(period: Duration) -> Self {
        Self {
            period,
            auto_reload: false,
        }
    }
}

/// A started software timer. Stopping (or dropping) joins the timer
/// thread.
pub struct PeriodicTimer {
    name: String,
    stop: ShutdownToken,
    fires: Arc<AtomicU64>,
    join: Option<JoinHandle<()>>,
}

impl PeriodicTimer {
    /// Creates and starts a timer. Fires `callback` every
    /// `config.period` from its own thread.
    pub fn spawn<F>(name: &str, config: TimerConfig, callback: F) -> Result<Self, KexError>
    where
        F: Fn() + Send + 'static,
    {
        if config.period.is_zero() {
            return Err(KexError::ZeroPeriod);
        }

        let stop = ShutdownToken::new();
        let fires = Arc::new(AtomicU64::new(0));

        let thread_stop = stop.clone();
        let thread_fires = Arc::clone(&fires);
        let thread_name = name.to_owned();
        let join = thread::Builder::new()
            .name(format!("timer-{name}"))
            .spawn(move || {
                // Deadline-based schedule so the cadence does not drift
                // by the callback's own runtime.
                let mut next = Instant::now() + config.period;
                loop {
                    let now = Instant::now();
                    if next > now && thread_stop.sleep_for(next - now) {
                        break;
                    }
                    if thread_stop.is_triggered() {
                        break;
                    }
                    callback();
                    thread_fires.fetch_add(1, Ordering::Relaxed);
                    if !config.auto_reload {
                        break;
                    }
                    next += config.period;
                }
                debug!("timer `{thread_name}` stopped");
            })
            .map_err(|source| KexError::Spawn {
                name: format!("timer-{name}"),
                source,
            })?;

        debug!("timer `{}` started with period {:?}", name, config.period);
        Ok(Self {
            name: name.to_owned(),
            stop,
            fires,
            join: Some(join),
        })
    }

    /// Number of times the callback has fired.
    pub fn fire_count(&self) -> u64 {
        self.fires.load(Ordering::Relaxed)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Stops the timer and joins its thread. Idempotent.
    pub fn stop(&mut self) {
        self.stop.trigger();
        if let Some(handle) = self.join.take() {
            if handle.join().is_err() {
                error!("timer `{}` panicked", self.name);
            }
        }
    }
}

impl Drop for PeriodicTimer {
    fn drop(&mut self) {
        self.stop();
    }
}
