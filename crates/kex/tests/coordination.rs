//! Integration tests: scheduled units coordinating through queues,
//! semaphores, and suspend gates, with deterministic shutdown.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use kex::{
    BinarySemaphore, MsgQueue, PeriodicTimer, SuspendGate, TaskConfig, TaskPriority, TaskSet,
    TimerConfig, Wake,
};

#[test]
fn producer_and_consumer_hand_off_through_queue() {
    let queue: MsgQueue<u32> = MsgQueue::with_capacity(5).unwrap();
    let consumed = Arc::new(AtomicU32::new(0));

    let tasks = TaskSet::new();
    {
        let queue = queue.clone();
        tasks
            .spawn(TaskConfig::new("producer", TaskPriority(4)), move |ctx| {
                for n in 0..20 {
                    if ctx.stop().is_triggered() {
                        break;
                    }
                    // Bounded send: the consumer drains concurrently.
                    queue
                        .send_timeout(n, Duration::from_secs(5))
                        .expect("consumer keeps draining");
                }
            })
            .unwrap();
    }
    {
        let queue = queue.clone();
        let consumed = Arc::clone(&consumed);
        tasks
            .spawn(TaskConfig::new("consumer", TaskPriority(3)), move |ctx| {
                let mut expected = 0;
                while expected < 20 {
                    if ctx.stop().is_triggered() {
                        break;
                    }
                    if let Ok(n) = queue.recv_timeout(Duration::from_secs(5)) {
                        // FIFO order holds end to end.
                        assert_eq!(n, expected);
                        expected += 1;
                        consumed.fetch_add(1, Ordering::Relaxed);
                    }
                }
            })
            .unwrap();
    }

    // Give the pair time to finish, then join.
    let deadline = std::time::Instant::now() + Duration::from_secs(10);
    while consumed.load(Ordering::Relaxed) < 20 && std::time::Instant::now() < deadline {
        std::thread::sleep(Duration::from_millis(5));
    }
    tasks.shutdown();
    assert_eq!(consumed.load(Ordering::Relaxed), 20);
}

#[test]
fn timer_gated_handler_forwards_at_timer_cadence() {
    let sem = BinarySemaphore::new();
    let queue: MsgQueue<i32> = MsgQueue::with_capacity(5).unwrap();

    let timer = {
        let sem = sem.clone();
        PeriodicTimer::spawn("gate", TimerConfig::periodic(Duration::from_millis(20)), {
            move || {
                sem.give();
            }
        })
        .unwrap()
    };

    let tasks = TaskSet::new();
    {
        let sem = sem.clone();
        let queue = queue.clone();
        tasks
            .spawn(TaskConfig::new("handler", TaskPriority(5)), move |ctx| {
                while !ctx.stop().is_triggered() {
                    if sem.take(Duration::from_millis(10)) {
                        let _ = queue.try_send(1);
                    }
                }
            })
            .unwrap();
    }

    std::thread::sleep(Duration::from_millis(110));
    tasks.shutdown();
    drop(timer);

    // Each forwarded token consumed one give; the handler can never
    // outrun the timer.
    let forwarded = {
        let mut n = 0;
        while queue.try_receive().is_ok() {
            n += 1;
        }
        n
    };
    assert!(forwarded >= 1, "timer fired but nothing was forwarded");
    assert!(
        forwarded <= 8,
        "handler forwarded {forwarded} tokens in ~5 timer periods"
    );
}

#[test]
fn suspended_unit_does_one_cycle_per_resume() {
    let (gate, token) = SuspendGate::new();
    let cycles = Arc::new(AtomicU32::new(0));

    let tasks = TaskSet::new();
    {
        let gate = gate.clone();
        let cycles = Arc::clone(&cycles);
        tasks
            .spawn(TaskConfig::new("snoozer", TaskPriority(5)), move |ctx| {
                loop {
                    match ctx.suspend(&gate) {
                        Wake::Shutdown => break,
                        Wake::Resumed => {
                            cycles.fetch_add(1, Ordering::Relaxed);
                        }
                    }
                }
            })
            .unwrap();
    }

    // Resume three times, waiting for the unit to park again between
    // rings.
    for expected in 1..=3u32 {
        while !gate.is_suspended() {
            std::thread::yield_now();
        }
        assert!(token.resume());
        let deadline = std::time::Instant::now() + Duration::from_secs(5);
        while cycles.load(Ordering::Relaxed) < expected
            && std::time::Instant::now() < deadline
        {
            std::thread::sleep(Duration::from_millis(1));
        }
        assert_eq!(cycles.load(Ordering::Relaxed), expected);
    }

    tasks.shutdown();
    assert_eq!(cycles.load(Ordering::Relaxed), 3);
}
