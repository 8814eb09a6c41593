//! LED-status pipeline.
//!
//! Four cooperating parts over two bounded channels and one binary
//! semaphore:
//!
//! - **Producer**: periodic non-blocking send of a fixed token onto
//!   channel 1; a full channel drops the token and the next cycle is
//!   the retry.
//! - **Blink timer**: periodic callback doing exactly one non-blocking
//!   semaphore give and one log line.
//! - **Handler**: bounded semaphore wait; on success forwards one token
//!   to channel 2, on timeout logs and skips the cycle. The wait bound
//!   is shorter than the timer period, so most attempts time out; that
//!   is the expected idle rhythm, not a fault.
//! - **Status reporter**: once per cycle logs both channel depths, then
//!   makes exactly one non-blocking dequeue per channel and reports ON
//!   iff that single attempt returned a token. This is an edge sample
//!   of occupancy, not a level signal: buffered backlog drains one
//!   token per cycle and is visible only in the depth figures, and
//!   channel 2 legitimately reads OFF on most cycles while healthy.

use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use log::{debug, info, warn};
use parking_lot::Mutex;

use kex::{
    BinarySemaphore, MsgQueue, PeriodicTimer, TaskConfig, TaskPriority, TaskSet, TimerConfig,
};

use crate::config::PipelineConfig;
use crate::error::StartError;

/// The fixed token both feeders enqueue.
pub const LED_TOKEN: i32 = 1;

const HANDLER_PRIORITY: TaskPriority = TaskPriority(5);
const PRODUCER_PRIORITY: TaskPriority = TaskPriority(3);
const REPORTER_PRIORITY: TaskPriority = TaskPriority(2);

/// One channel's sampled state for a reporter cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelState {
    /// This cycle's single dequeue attempt returned a token.
    On,
    /// It did not.
    Off,
}

impl fmt::Display for ChannelState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::On => write!(f, "ON"),
            Self::Off => write!(f, "OFF"),
        }
    }
}

/// One reporter cycle: depths observed before the dequeue attempts,
/// then the sampled states.
#[derive(Debug, Clone, Copy)]
pub struct StatusReport {
    pub cycle: u64,
    pub depths: [usize; 2],
    pub leds: [ChannelState; 2],
}

/// Observable counters and the reporter's trace.
#[derive(Default)]
pub struct PipelineStats {
    produced: AtomicU32,
    dropped: AtomicU32,
    timer_gives: AtomicU32,
    forwarded: AtomicU32,
    forward_drops: AtomicU32,
    handler_timeouts: AtomicU32,
    reports: Mutex<Vec<StatusReport>>,
}

impl PipelineStats {
    /// Tokens the producer queued onto channel 1.
    pub fn produced(&self) -> u32 {
        self.produced.load(Ordering::Relaxed)
    }

    /// Producer sends that failed on a full channel.
    pub fn dropped(&self) -> u32 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Timer callback fires (each attempts one semaphore give).
    pub fn timer_gives(&self) -> u32 {
        self.timer_gives.load(Ordering::Relaxed)
    }

    /// Tokens the handler forwarded to channel 2. Never exceeds
    /// `timer_gives`: each forward consumes one give.
    pub fn forwarded(&self) -> u32 {
        self.forwarded.load(Ordering::Relaxed)
    }

    /// Handler forwards that failed on a full channel 2.
    pub fn forward_drops(&self) -> u32 {
        self.forward_drops.load(Ordering::Relaxed)
    }

    /// Handler waits that elapsed without a signal; expected on most
    /// cycles under the default periods.
    pub fn handler_timeouts(&self) -> u32 {
        self.handler_timeouts.load(Ordering::Relaxed)
    }

    /// Snapshot of every reporter cycle so far.
    pub fn reports(&self) -> Vec<StatusReport> {
        self.reports.lock().clone()
    }
}

/// Handle to the running pipeline. Dropping it stops the blink timer.
pub struct PipelineSubsystem {
    stats: Arc<PipelineStats>,
    channel1: MsgQueue<i32>,
    channel2: MsgQueue<i32>,
    semaphore: BinarySemaphore,
    timer: PeriodicTimer,
}

impl PipelineSubsystem {
    /// Creates every primitive, then spawns the units. Creation happens
    /// first and propagates failure, so no unit ever starts against a
    /// missing resource.
    pub fn start(config: &PipelineConfig, tasks: &TaskSet) -> Result<Self, StartError> {
        config.validate()?;

        let channel1: MsgQueue<i32> = MsgQueue::with_capacity(config.queue_capacity)?;
        let channel2: MsgQueue<i32> = MsgQueue::with_capacity(config.queue_capacity)?;
        let semaphore = BinarySemaphore::new();
        let stats = Arc::new(PipelineStats::default());

        let timer = {
            let semaphore = semaphore.clone();
            let stats = Arc::clone(&stats);
            PeriodicTimer::spawn(
                "blink",
                TimerConfig::periodic(config.timer_period),
                move || {
                    // Restricted context: one non-blocking give, one log.
                    let fresh = semaphore.give();
                    stats.timer_gives.fetch_add(1, Ordering::Relaxed);
                    if fresh {
                        debug!("blink timer: signal released");
                    } else {
                        debug!("blink timer: signal still pending");
                    }
                },
            )?
        };

        {
            let period = config.producer_period;
            let channel1 = channel1.clone();
            let stats = Arc::clone(&stats);
            tasks.spawn(
                TaskConfig::new("led-producer", PRODUCER_PRIORITY),
                move |ctx| {
                    loop {
                        if ctx.sleep(period) {
                            break;
                        }
                        match channel1.try_send(LED_TOKEN) {
                            Ok(()) => {
                                stats.produced.fetch_add(1, Ordering::Relaxed);
                                info!("producer: status token queued on channel 1");
                            }
                            Err(err) => {
                                stats.dropped.fetch_add(1, Ordering::Relaxed);
                                warn!("producer: channel 1 send failed ({err}); next cycle retries");
                            }
                        }
                    }
                },
            )?;
        }

        {
            let timeout = config.handler_timeout;
            let semaphore = semaphore.clone();
            let channel2 = channel2.clone();
            let stats = Arc::clone(&stats);
            tasks.spawn(
                TaskConfig::new("led-handler", HANDLER_PRIORITY),
                move |ctx| {
                    while !ctx.stop().is_triggered() {
                        if semaphore.take(timeout) {
                            match channel2.try_send(LED_TOKEN) {
                                Ok(()) => {
                                    stats.forwarded.fetch_add(1, Ordering::Relaxed);
                                    info!("handler: blink signal forwarded to channel 2");
                                }
                                Err(err) => {
                                    stats.forward_drops.fetch_add(1, Ordering::Relaxed);
                                    warn!("handler: channel 2 send failed ({err})");
                                }
                            }
                        } else {
                            stats.handler_timeouts.fetch_add(1, Ordering::Relaxed);
                            debug!("handler: no blink signal within {timeout:?}");
                        }
                    }
                },
            )?;
        }

        {
            let period = config.report_period;
            let channel1 = channel1.clone();
            let channel2 = channel2.clone();
            let stats = Arc::clone(&stats);
            tasks.spawn(
                TaskConfig::new("status-reporter", REPORTER_PRIORITY),
                move |ctx| {
                    let mut cycle: u64 = 0;
                    loop {
                        if ctx.sleep(period) {
                            break;
                        }
                        cycle += 1;
                        let depths = [channel1.len(), channel2.len()];
                        info!("reporter: channel depths {}/{}", depths[0], depths[1]);

                        // Exactly one non-blocking dequeue per channel
                        // per cycle; ON is an edge sample, not a level.
                        let leds = [
                            sample(&channel1),
                            sample(&channel2),
                        ];
                        info!("reporter: LED1 {} LED2 {}", leds[0], leds[1]);
                        stats.reports.lock().push(StatusReport {
                            cycle,
                            depths,
                            leds,
                        });
                    }
                },
            )?;
        }

        Ok(Self {
            stats,
            channel1,
            channel2,
            semaphore,
            timer,
        })
    }

    pub fn stats(&self) -> &PipelineStats {
        &self.stats
    }

    /// Current occupancy of both channels.
    pub fn channel_depths(&self) -> [usize; 2] {
        [self.channel1.len(), self.channel2.len()]
    }

    /// Current semaphore count; always 0 or 1.
    pub fn semaphore_count(&self) -> u8 {
        self.semaphore.count()
    }

    /// Blink timer fires so far.
    pub fn timer_fires(&self) -> u64 {
        self.timer.fire_count()
    }

    /// Stops the blink timer. Also happens on drop.
    pub fn stop_timer(&mut self) {
        self.timer.stop();
    }
}

fn sample(channel: &MsgQueue<i32>) -> ChannelState {
    match channel.try_receive() {
        Ok(_) => ChannelState::On,
        Err(_) => ChannelState::Off,
    }
}
