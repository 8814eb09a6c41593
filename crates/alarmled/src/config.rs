//! Bootstrap configuration for both subsystems.
//!
//! Defaults reproduce the reference timing: the sleeper logs every
//! second, the alarm rings every five seconds, the producer enqueues
//! every second, the blink timer fires every three seconds, and the
//! handler/reporter cycle once per second over channels of capacity 5.

use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be nonzero")]
    ZeroPeriod(&'static str),
    #[error("queue capacity must be nonzero")]
    ZeroCapacity,
}

/// Timing for the alarm-snooze subsystem.
#[derive(Debug, Clone)]
pub struct AlarmConfig {
    /// Sleeper log interval.
    pub sleeper_period: Duration,
    /// Ringer interval; intentionally not an integer multiple of the
    /// snoozer's re-suspend latency.
    pub ring_period: Duration,
}

impl Default for AlarmConfig {
    fn default() -> Self {
        Self {
            sleeper_period: Duration::from_millis(1000),
            ring_period: Duration::from_millis(5000),
        }
    }
}

impl AlarmConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sleeper_period.is_zero() {
            return Err(ConfigError::ZeroPeriod("sleeper period"));
        }
        if self.ring_period.is_zero() {
            return Err(ConfigError::ZeroPeriod("ring period"));
        }
        Ok(())
    }
}

/// Timing and sizing for the LED-status pipeline.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Producer enqueue interval for channel 1.
    pub producer_period: Duration,
    /// Blink timer period; each fire releases the semaphore once.
    pub timer_period: Duration,
    /// Handler's bounded semaphore wait per attempt.
    pub handler_timeout: Duration,
    /// Status reporter cycle interval.
    pub report_period: Duration,
    /// Capacity of both channels.
    pub queue_capacity: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            producer_period: Duration::from_millis(1000),
            timer_period: Duration::from_millis(3000),
            handler_timeout: Duration::from_millis(1000),
            report_period: Duration::from_millis(1000),
            queue_capacity: 5,
        }
    }
}

impl PipelineConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.producer_period.is_zero() {
            return Err(ConfigError::ZeroPeriod("producer period"));
        }
        if self.timer_period.is_zero() {
            return Err(ConfigError::ZeroPeriod("timer period"));
        }
        if self.handler_timeout.is_zero() {
            return Err(ConfigError::ZeroPeriod("handler timeout"));
        }
        if self.report_period.is_zero() {
            return Err(ConfigError::ZeroPeriod("report period"));
        }
        if self.queue_capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        Ok(())
    }
}
