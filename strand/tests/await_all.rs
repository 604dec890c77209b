use strand::task::{self, JoinHandle, TaskId};
use strand::time::sleep_ms;
use strand::FailureKind;

use std::time::{Duration, Instant};

#[derive(Debug, thiserror::Error)]
#[error("invalid: {0}")]
struct Invalid(&'static str);

fn explode(message: &str) -> u32 {
    panic!("{message}")
}

#[strand::test]
async fn results_follow_submission_order() {
    // Later tasks finish first.
    let handles: Vec<_> = [60, 40, 20]
        .into_iter()
        .enumerate()
        .map(|(i, delay)| {
            task::spawn(async move {
                sleep_ms(delay).await;
                i
            })
        })
        .collect();

    let (results, failures) = task::await_all(handles).await;

    assert_eq!(results, vec![0, 1, 2]);
    assert!(failures.is_empty());
}

#[strand::test]
async fn partial_failure_does_not_cancel_siblings() {
    let start = Instant::now();

    let handles: Vec<_> = (1..=5)
        .map(|i| {
            task::try_spawn(async move {
                if i == 3 {
                    return Err(Invalid("task 3 failed"));
                }

                sleep_ms(200).await;
                Ok::<_, Invalid>(format!("marker-{i}"))
            })
        })
        .collect();
    let ids: Vec<TaskId> = handles.iter().map(JoinHandle::id).collect();

    let (results, failures) = task::await_all(handles).await;
    let elapsed = start.elapsed();

    assert_eq!(results, ["marker-1", "marker-2", "marker-4", "marker-5"]);
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].task(), ids[2]);
    assert_eq!(failures[0].message(), "invalid: task 3 failed");

    assert!(elapsed >= Duration::from_millis(200));
    assert!(
        elapsed < Duration::from_millis(800),
        "tasks should sleep concurrently, took {elapsed:?}"
    );
}

#[strand::test]
async fn parallel_sleeps_do_not_serialize() {
    const TASKS: u64 = 10;
    const DELAY_MS: u64 = 100;

    let start = Instant::now();

    let handles: Vec<_> = (0..TASKS)
        .map(|_| task::spawn(sleep_ms(DELAY_MS)))
        .collect();
    let (results, failures) = task::await_all(handles).await;

    let elapsed = start.elapsed();

    assert_eq!(results.len(), TASKS as usize);
    assert!(failures.is_empty());
    assert!(elapsed >= Duration::from_millis(DELAY_MS));
    assert!(
        elapsed < Duration::from_millis(TASKS * DELAY_MS / 2),
        "{TASKS} sleeps of {DELAY_MS}ms took {elapsed:?}"
    );
}

#[strand::test]
async fn failures_keep_submission_order_across_kinds() {
    let handles = vec![
        task::spawn(async {
            sleep_ms(30).await;
            explode("late panic")
        }),
        task::spawn(async { 1 }),
        task::spawn(async { explode("early panic") }),
    ];

    let (results, failures) = task::await_all(handles).await;

    assert_eq!(results, vec![1]);

    let messages: Vec<_> = failures.iter().map(|f| f.message()).collect();
    assert_eq!(messages, ["late panic", "early panic"]);
    assert!(failures.iter().all(|f| f.kind() == FailureKind::Panic));
}

#[strand::test]
async fn nothing_to_await() {
    let (results, failures) = task::await_all(Vec::<JoinHandle<u8>>::new()).await;

    assert!(results.is_empty());
    assert!(failures.is_empty());
}
