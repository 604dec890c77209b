use strand::task::{self, TaskState};
use strand::time::{sleep, sleep_ms};
use strand::{FailureKind, RuntimeBuilder};

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

#[derive(Debug, thiserror::Error)]
#[error("invalid: {0}")]
struct Invalid(&'static str);

#[test]
fn abandoned_timer_does_not_hold_up_teardown() {
    let runtime = RuntimeBuilder::new()
        .shutdown_grace(Duration::from_millis(50))
        .build()
        .unwrap();

    let handle = runtime.spawn(async {
        sleep(Duration::from_secs(10)).await;
    });
    runtime.block_on(sleep_ms(10));
    drop(handle);

    let start = Instant::now();
    let report = runtime.shutdown();

    assert!(start.elapsed() < Duration::from_secs(2));
    assert!(!report.drained);
    assert_eq!(report.aborted, 1);
    assert!(report.unobserved.is_empty());
}

#[test]
fn dropping_the_runtime_is_bounded() {
    let runtime = RuntimeBuilder::new()
        .shutdown_grace(Duration::from_millis(20))
        .build()
        .unwrap();

    for _ in 0..3 {
        runtime.spawn(sleep(Duration::from_secs(10)));
    }

    let start = Instant::now();
    drop(runtime);

    assert!(start.elapsed() < Duration::from_secs(2));
}

#[test]
fn grace_period_lets_short_tasks_finish() {
    let runtime = RuntimeBuilder::new().build().unwrap();
    let finished = Arc::new(AtomicUsize::new(0));

    for _ in 0..3 {
        let finished = finished.clone();
        runtime.spawn(async move {
            sleep_ms(20).await;
            finished.fetch_add(1, Ordering::SeqCst);
        });
    }

    let report = runtime.shutdown_timeout(Duration::from_secs(1));

    assert!(report.is_clean());
    assert_eq!(finished.load(Ordering::SeqCst), 3);
}

#[test]
fn live_handle_observes_the_shutdown() {
    let runtime = RuntimeBuilder::new().build().unwrap();

    let handle = runtime.spawn(async {
        sleep_ms(10_000).await;
        1
    });

    let report = runtime.shutdown_timeout(Duration::from_millis(20));

    assert_eq!(report.aborted, 1);
    assert_eq!(handle.state(), TaskState::Failed);

    let observer = RuntimeBuilder::new().build().unwrap();
    let failure = observer.block_on(handle).unwrap_err();

    assert_eq!(failure.kind(), FailureKind::Shutdown);
}

#[test]
fn spawn_after_shutdown_fails_immediately() {
    let runtime = RuntimeBuilder::new().build().unwrap();
    let handle = runtime.handle().clone();

    runtime.shutdown();

    let late = handle.spawn(async { 1 });
    assert!(late.is_finished());

    let observer = RuntimeBuilder::new().build().unwrap();
    let failure = observer.block_on(late).unwrap_err();

    assert_eq!(failure.kind(), FailureKind::Shutdown);
}

#[test]
fn unobserved_failures_are_reported() {
    let runtime = RuntimeBuilder::new().build().unwrap();

    runtime.block_on(async {
        // Nobody awaits these two.
        drop(task::try_spawn(async { Err::<(), _>(Invalid("nobody listens")) }));
        drop(task::spawn(async {
            sleep_ms(5).await;
            panic!("unheard");
        }));

        // Observed failures and detached successes are not reported.
        let observed = task::try_spawn(async { Err::<(), _>(Invalid("seen")) });
        assert!(observed.await.is_err());
        drop(task::spawn(async { 3 }));

        sleep_ms(30).await;
    });

    let report = runtime.shutdown();

    assert!(report.drained);
    assert_eq!(report.aborted, 0);

    let mut messages: Vec<_> = report.unobserved.iter().map(|f| f.message()).collect();
    messages.sort_unstable();
    assert_eq!(messages, ["invalid: nobody listens", "unheard"]);
}

#[test]
fn run_until_idle_drives_detached_tasks() {
    let runtime = RuntimeBuilder::new().build().unwrap();
    let done = Arc::new(AtomicUsize::new(0));

    for delay in [10, 20, 30] {
        let done = done.clone();
        runtime.spawn(async move {
            sleep_ms(delay).await;
            done.fetch_add(1, Ordering::SeqCst);
        });
    }

    runtime.run_until_idle();

    assert_eq!(done.load(Ordering::SeqCst), 3);
}

#[test]
fn tasks_survive_between_block_on_calls() {
    let runtime = RuntimeBuilder::new().build().unwrap();

    let handle = runtime.spawn(async {
        sleep_ms(50).await;
        "resumed"
    });

    runtime.block_on(sleep_ms(5));
    assert!(!handle.is_finished());

    assert_eq!(runtime.block_on(handle).unwrap(), "resumed");
}

#[test]
fn failure_seen_by_nobody_before_the_drop_is_reported() {
    let runtime = RuntimeBuilder::new().build().unwrap();

    runtime.block_on(async {
        let handle = task::spawn(async {
            panic!("late drop");
        });

        while !handle.is_finished() {
            sleep_ms(1).await;
        }

        // The failure is already stored; dropping the handle discards it.
        drop(handle);
    });

    let report = runtime.shutdown();

    assert_eq!(report.unobserved.len(), 1);
    assert_eq!(report.unobserved[0].kind(), FailureKind::Panic);
    assert_eq!(report.unobserved[0].message(), "late drop");
}

#[test]
fn observed_failure_is_not_reported_after_the_drop() {
    let runtime = RuntimeBuilder::new().build().unwrap();

    runtime.block_on(async {
        let handle = task::try_spawn(async { Err::<u8, _>(Invalid("joined")) });

        assert!(handle.join().await.is_err());
        drop(handle);
    });

    assert!(runtime.shutdown().unobserved.is_empty());
}

#[test]
fn spawns_racing_the_teardown_all_finish() {
    for _ in 0..20 {
        let runtime = RuntimeBuilder::new()
            .shutdown_grace(Duration::from_millis(1))
            .build()
            .unwrap();
        let handle = runtime.handle().clone();

        let spawner = std::thread::spawn(move || {
            (0..200)
                .map(|i| handle.spawn(async move { i }))
                .collect::<Vec<_>>()
        });

        runtime.shutdown();
        let handles = spawner.join().unwrap();

        assert!(handles.iter().all(|handle| handle.is_finished()));
    }
}
