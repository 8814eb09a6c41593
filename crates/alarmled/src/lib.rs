//! # alarmled - Task-Coordination Demos
//!
//! Two independent subsystems scheduled concurrently over the same
//! kernel primitives from [`kex`]:
//!
//! - **Alarm-Snooze** ([`alarm`]): three units coordinated purely by
//!   suspend/resume signaling, with no shared data. A periodic sleeper,
//!   a periodic ringer, and a snoozer that parks itself and does one
//!   unit of work per ring.
//! - **LED-Status pipeline** ([`pipeline`]): a producer feeding a
//!   bounded channel, a periodic timer releasing a binary semaphore, a
//!   handler bridging the semaphore to a second channel, and a status
//!   reporter sampling both channels once per cycle.
//!
//! The subsystems never interact. Each is started from an explicit
//! configuration struct ([`config`]) onto a shared
//! [`TaskSet`](kex::TaskSet); there are no ambient globals. All
//! observable output is log lines plus per-subsystem stats probes used
//! by the integration tests.

pub mod alarm;
pub mod config;
pub mod error;
pub mod pipeline;

pub use alarm::{AlarmStats, AlarmSubsystem};
pub use config::{AlarmConfig, ConfigError, PipelineConfig};
pub use error::StartError;
pub use pipeline::{ChannelState, PipelineStats, PipelineSubsystem, StatusReport};
