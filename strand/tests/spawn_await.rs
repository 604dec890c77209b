use strand::task::{self, TaskState, yield_now};
use strand::time::sleep_ms;
use strand::{FailureKind, Handle, RuntimeBuilder};

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

#[derive(Debug, thiserror::Error)]
#[error("invalid: {0}")]
struct Invalid(&'static str);

#[strand::test]
async fn await_returns_the_task_value() {
    let handle = task::spawn(async {
        sleep_ms(10).await;
        21 * 2
    });

    assert_eq!(handle.await.unwrap(), 42);
}

#[strand::test]
async fn returned_error_is_raised_to_the_awaiter() {
    let handle = task::try_spawn(async {
        sleep_ms(10).await;
        Err::<u32, _>(Invalid("negative input"))
    });

    let failure = handle.await.unwrap_err();

    assert_eq!(failure.kind(), FailureKind::Error);
    assert_eq!(failure.message(), "invalid: negative input");
    assert!(failure.downcast_ref::<Invalid>().is_some());
}

#[strand::test]
async fn panic_is_captured_as_a_failure() {
    let handle = task::spawn(async {
        sleep_ms(5).await;
        if true {
            panic!("kaboom");
        }
        1
    });

    let failure = handle.await.unwrap_err();

    assert!(failure.is_panic());
    assert_eq!(failure.message(), "kaboom");
}

#[strand::test]
async fn failing_task_does_not_affect_its_siblings() {
    let failing = task::spawn(async {
        panic!("first task gives up");
    });
    let sibling = task::spawn(async {
        sleep_ms(20).await;
        "still here"
    });

    assert!(failing.await.is_err());
    assert_eq!(sibling.await.unwrap(), "still here");
}

#[strand::test]
async fn join_is_idempotent() {
    let runs = Arc::new(AtomicUsize::new(0));
    let counter = runs.clone();

    let handle = task::spawn(async move {
        counter.fetch_add(1, Ordering::SeqCst);
        sleep_ms(10).await;
        String::from("done")
    });

    let first = handle.join().await.unwrap();
    let second = handle.join().await.unwrap();

    assert_eq!(first, "done");
    assert_eq!(first, second);
    assert_eq!(runs.load(Ordering::SeqCst), 1);

    // The cached outcome can still be moved out afterwards.
    assert_eq!(handle.await.unwrap(), "done");
}

#[strand::test]
async fn join_returns_the_same_failure_twice() {
    let handle = task::try_spawn(async { Err::<u8, _>(Invalid("once")) });

    let first = handle.join().await.unwrap_err();
    let second = handle.join().await.unwrap_err();

    assert_eq!(first.task(), handle.id());
    assert_eq!(first.task(), second.task());
    assert_eq!(first.message(), second.message());
}

#[test]
fn state_only_moves_forward() {
    let runtime = RuntimeBuilder::new().build().unwrap();

    let handle = runtime.spawn(async {
        sleep_ms(300).await;
        5
    });
    assert_eq!(handle.state(), TaskState::Pending);

    runtime.block_on(sleep_ms(5));
    assert_eq!(handle.state(), TaskState::Suspended);
    assert!(!handle.is_finished());

    runtime.run_until_idle();
    assert_eq!(handle.state(), TaskState::Completed);
    assert!(handle.is_finished());

    assert_eq!(runtime.block_on(handle).unwrap(), 5);
}

#[strand::test]
async fn yield_now_lets_other_tasks_run() {
    let log = Arc::new(Mutex::new(Vec::new()));

    let spawn_logger = |name: &'static str| {
        let log = log.clone();
        task::spawn(async move {
            log.lock().unwrap().push(format!("{name}1"));
            yield_now().await;
            log.lock().unwrap().push(format!("{name}2"));
        })
    };

    let a = spawn_logger("a");
    let b = spawn_logger("b");

    a.await.unwrap();
    b.await.unwrap();

    assert_eq!(*log.lock().unwrap(), ["a1", "b1", "a2", "b2"]);
}

#[strand::test]
async fn abort_cancels_a_sleeping_task() {
    let reached = Arc::new(AtomicBool::new(false));
    let flag = reached.clone();

    let handle = task::spawn(async move {
        sleep_ms(5_000).await;
        flag.store(true, Ordering::SeqCst);
    });

    sleep_ms(10).await;
    handle.abort();

    let start = Instant::now();
    let failure = handle.await.unwrap_err();

    assert!(failure.is_cancelled());
    assert!(start.elapsed() < Duration::from_secs(1));
    assert!(!reached.load(Ordering::SeqCst));
}

#[strand::test]
async fn abort_after_completion_keeps_the_value() {
    let handle = task::spawn(async { 9 });

    handle.join().await.unwrap();
    handle.abort();

    assert_eq!(handle.state(), TaskState::Completed);
    assert_eq!(handle.await.unwrap(), 9);
}

#[strand::test]
async fn current_handle_spawns_on_the_same_runtime() {
    let handle = Handle::current();
    let joined = handle.spawn(async { "inner" });

    assert_eq!(joined.await.unwrap(), "inner");
    assert!(Handle::try_current().is_some());
}

#[test]
fn no_current_handle_outside_a_runtime() {
    assert!(Handle::try_current().is_none());
}

#[test]
fn spawn_from_another_thread() {
    let runtime = RuntimeBuilder::new().build().unwrap();
    let handle = runtime.handle().clone();

    let value = runtime.block_on(async move {
        let joined = std::thread::spawn(move || handle.spawn(async { 7 }))
            .join()
            .unwrap();

        joined.await.unwrap()
    });

    assert_eq!(value, 7);
}

#[test]
#[should_panic(expected = "from within a strand runtime")]
fn block_on_inside_a_runtime_panics() {
    let outer = RuntimeBuilder::new().build().unwrap();
    let inner = RuntimeBuilder::new().build().unwrap();

    outer.block_on(async {
        inner.block_on(async {});
    });
}
