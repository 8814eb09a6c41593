//! Scenario tests for the LED-status pipeline, run with scaled-down
//! periods. Counting invariants are exact; timing assertions use wide
//! bands.

use std::time::{Duration, Instant};

use once_cell::sync::Lazy;

use alarmled::{ChannelState, ConfigError, PipelineConfig, PipelineSubsystem, StartError};
use kex::TaskSet;

static LOGGER: Lazy<()> = Lazy::new(|| {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .is_test(true)
        .try_init();
});

fn init_logs() {
    Lazy::force(&LOGGER);
}

fn scaled_config() -> PipelineConfig {
    PipelineConfig {
        producer_period: Duration::from_millis(20),
        timer_period: Duration::from_millis(60),
        handler_timeout: Duration::from_millis(20),
        report_period: Duration::from_millis(20),
        queue_capacity: 5,
    }
}

#[test]
fn healthy_pipeline_samples_channel_1_on() {
    init_logs();
    let tasks = TaskSet::new();
    let mut pipeline = PipelineSubsystem::start(&scaled_config(), &tasks).expect("start pipeline");

    std::thread::sleep(Duration::from_millis(250));
    tasks.shutdown();
    pipeline.stop_timer();

    let stats = pipeline.stats();
    assert!(stats.produced() >= 5, "producer starved: {}", stats.produced());

    let reports = stats.reports();
    assert!(!reports.is_empty(), "reporter never cycled");
    // Production rate matches the reporter's drain rate, so channel 1
    // reads ON on at least some cycles.
    let on_cycles = reports
        .iter()
        .filter(|r| r.leds[0] == ChannelState::On)
        .count();
    assert!(on_cycles >= 1, "channel 1 never sampled ON");

    // Occupancy invariant, at every observed instant.
    for report in &reports {
        assert!(report.depths[0] <= 5, "channel 1 depth {}", report.depths[0]);
        assert!(report.depths[1] <= 5, "channel 2 depth {}", report.depths[1]);
    }
}

#[test]
fn channel_2_stays_off_before_first_timer_fire() {
    init_logs();
    let config = PipelineConfig {
        // Far beyond the test window: the blink timer never fires.
        timer_period: Duration::from_secs(3600),
        ..scaled_config()
    };
    let tasks = TaskSet::new();
    let mut pipeline = PipelineSubsystem::start(&config, &tasks).expect("start pipeline");

    std::thread::sleep(Duration::from_millis(200));
    tasks.shutdown();
    pipeline.stop_timer();

    let stats = pipeline.stats();
    assert_eq!(stats.timer_gives(), 0);
    assert_eq!(stats.forwarded(), 0, "forward without a timer fire");
    assert!(
        stats.handler_timeouts() >= 1,
        "handler never timed out while unsignaled"
    );
    for report in stats.reports() {
        assert_eq!(
            report.leds[1],
            ChannelState::Off,
            "channel 2 ON at cycle {} without a timer fire",
            report.cycle
        );
    }
}

#[test]
fn handler_cannot_outrun_the_timer() {
    init_logs();
    let tasks = TaskSet::new();
    let mut pipeline = PipelineSubsystem::start(&scaled_config(), &tasks).expect("start pipeline");

    std::thread::sleep(Duration::from_millis(250));
    tasks.shutdown();
    pipeline.stop_timer();

    let stats = pipeline.stats();
    // The binary semaphore holds at most one pending signal, so each
    // forward consumes a distinct give.
    assert!(
        stats.forwarded() <= stats.timer_gives(),
        "{} forwards for {} gives",
        stats.forwarded(),
        stats.timer_gives()
    );
    // Channel-2 ON samples each consume a forwarded token.
    let on_cycles = stats
        .reports()
        .iter()
        .filter(|r| r.leds[1] == ChannelState::On)
        .count() as u32;
    assert!(
        on_cycles <= stats.forwarded(),
        "{on_cycles} ON samples for {} forwards",
        stats.forwarded()
    );
    assert!(pipeline.semaphore_count() <= 1);
}

#[test]
fn overloaded_producer_drops_sends_without_corruption() {
    init_logs();
    let config = PipelineConfig {
        producer_period: Duration::from_millis(5),
        // Reporter drains far slower than the producer fills.
        report_period: Duration::from_millis(300),
        timer_period: Duration::from_secs(3600),
        handler_timeout: Duration::from_millis(20),
        queue_capacity: 5,
    };
    let tasks = TaskSet::new();
    let mut pipeline = PipelineSubsystem::start(&config, &tasks).expect("start pipeline");

    std::thread::sleep(Duration::from_millis(300));

    // Five buffered tokens accumulate, then sends start failing.
    let depths = pipeline.channel_depths();
    assert!(depths[0] <= 5, "channel 1 over capacity: {}", depths[0]);

    tasks.shutdown();
    pipeline.stop_timer();

    let stats = pipeline.stats();
    assert!(
        stats.dropped() >= 1,
        "no failed send despite sustained overload"
    );
    // Failed sends leave the queue intact.
    assert!(pipeline.channel_depths()[0] <= 5);
    assert!(stats.produced() >= 5);
}

#[test]
fn invalid_configuration_starts_no_units() {
    init_logs();
    let config = PipelineConfig {
        queue_capacity: 0,
        ..scaled_config()
    };
    let tasks = TaskSet::new();
    let result = PipelineSubsystem::start(&config, &tasks);
    assert!(matches!(
        result,
        Err(StartError::Config(ConfigError::ZeroCapacity))
    ));
    // Dependent units were skipped, not started against a null resource.
    assert!(tasks.is_empty());
    tasks.shutdown();
}

#[test]
fn shutdown_joins_all_pipeline_units_promptly() {
    init_logs();
    let tasks = TaskSet::new();
    let mut pipeline =
        PipelineSubsystem::start(&PipelineConfig::default(), &tasks).expect("start pipeline");

    let started = Instant::now();
    tasks.shutdown();
    pipeline.stop_timer();
    assert!(started.elapsed() < Duration::from_secs(5));
}
