//! Demo binary: runs the alarm-snooze subsystem and the LED-status
//! pipeline concurrently on one task set.
//!
//! By default the units run forever, like the firmware they model.
//! `--run-for` bounds the run and exercises the clean shutdown path,
//! printing a stats summary on exit.

use std::time::Duration;

use clap::Parser;
use log::info;

use alarmled::{AlarmConfig, AlarmSubsystem, PipelineConfig, PipelineSubsystem};
use kex::TaskSet;

#[derive(Parser, Debug)]
#[command(
    name = "alarmled",
    about = "Alarm-snooze and LED-status task coordination demo"
)]
struct Cli {
    /// Sleeper log period in milliseconds
    #[arg(long, default_value_t = 1000)]
    sleep_period_ms: u64,

    /// Alarm ring period in milliseconds
    #[arg(long, default_value_t = 5000)]
    ring_period_ms: u64,

    /// Producer enqueue period in milliseconds
    #[arg(long, default_value_t = 1000)]
    producer_period_ms: u64,

    /// Blink timer period in milliseconds
    #[arg(long, default_value_t = 3000)]
    blink_period_ms: u64,

    /// Handler semaphore wait bound in milliseconds
    #[arg(long, default_value_t = 1000)]
    handler_timeout_ms: u64,

    /// Status report period in milliseconds
    #[arg(long, default_value_t = 1000)]
    report_period_ms: u64,

    /// Capacity of both status channels
    #[arg(long, default_value_t = 5)]
    queue_capacity: usize,

    /// Run for this many seconds, then shut down cleanly
    /// (default: run forever)
    #[arg(long)]
    run_for: Option<u64>,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let alarm_config = AlarmConfig {
        sleeper_period: Duration::from_millis(cli.sleep_period_ms),
        ring_period: Duration::from_millis(cli.ring_period_ms),
    };
    let pipeline_config = PipelineConfig {
        producer_period: Duration::from_millis(cli.producer_period_ms),
        timer_period: Duration::from_millis(cli.blink_period_ms),
        handler_timeout: Duration::from_millis(cli.handler_timeout_ms),
        report_period: Duration::from_millis(cli.report_period_ms),
        queue_capacity: cli.queue_capacity,
    };

    let tasks = TaskSet::new();
    let alarm = AlarmSubsystem::start(&alarm_config, &tasks)?;
    let mut pipeline = PipelineSubsystem::start(&pipeline_config, &tasks)?;
    info!("all units started");

    match cli.run_for {
        Some(secs) => {
            tasks.shutdown_token().sleep_for(Duration::from_secs(secs));
            tasks.shutdown();
            pipeline.stop_timer();
            let alarm_stats = alarm.stats();
            let pipe_stats = pipeline.stats();
            info!(
                "alarm: {} sleeps, {} rings, {} snoozes",
                alarm_stats.sleeps(),
                alarm_stats.rings(),
                alarm_stats.snoozes()
            );
            info!(
                "pipeline: {} produced ({} dropped), {} forwarded, {} handler timeouts, {} reports",
                pipe_stats.produced(),
                pipe_stats.dropped(),
                pipe_stats.forwarded(),
                pipe_stats.handler_timeouts(),
                pipe_stats.reports().len()
            );
        }
        None => {
            // Production mode: hand control to the units permanently.
            tasks.run_until_shutdown();
        }
    }
    Ok(())
}
