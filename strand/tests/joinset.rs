use strand::task::JoinSet;
use strand::time::sleep;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
#[error("lookup failed for {0}")]
struct LookupFailed(u32);

#[strand::test]
async fn joinset_abort_all() {
    let mut set = JoinSet::new();

    // Spawn a task that would take a long time
    set.spawn(async move {
        sleep(Duration::from_millis(500)).await;
        "should be cancelled"
    });

    // Immediately abort everything
    set.abort_all();

    assert!(set.is_empty(), "Set should be empty after abort_all");

    // join_next should return None immediately because handles were cleared
    assert!(set.join_next().await.is_none());
}

#[strand::test]
async fn joinset_race_condition() {
    let mut set = JoinSet::new();

    // Task 1: Fast
    set.spawn(async move {
        sleep(Duration::from_millis(10)).await;
        "winner"
    });

    // Task 2: Slow
    set.spawn(async move {
        sleep(Duration::from_millis(200)).await;
        "loser"
    });

    // Race should complete after the first one finishes
    let result = set.race().await;

    assert_eq!(result.unwrap().unwrap(), "winner");
    assert!(set.is_empty(), "Remaining tasks should have been aborted");
}

#[strand::test]
async fn joinset_race_on_empty_set() {
    let mut set = JoinSet::<u8>::new();

    assert!(set.race().await.is_none());
}

#[strand::test]
async fn joinset_drop_cancels_tasks() {
    let flag = Arc::new(AtomicBool::new(false));
    let flag_clone = flag.clone();

    {
        let mut set = JoinSet::new();
        set.spawn(async move {
            sleep(Duration::from_millis(100)).await;
            flag_clone.store(true, Ordering::SeqCst);
        });
        // Set is dropped here
    }

    sleep(Duration::from_millis(150)).await;

    assert!(
        !flag.load(Ordering::SeqCst),
        "Task should have been cancelled on drop"
    );
}

#[strand::test]
async fn joinset_is_empty_and_len() {
    let mut set = JoinSet::new();
    assert!(set.is_empty());
    assert_eq!(set.len(), 0);

    set.spawn(async move { sleep(Duration::from_millis(10)).await });
    set.spawn(async move { sleep(Duration::from_millis(10)).await });

    assert!(!set.is_empty());
    assert_eq!(set.len(), 2);

    set.join_next().await;
    assert_eq!(set.len(), 1);

    set.join_next().await;
    assert!(set.is_empty());
}

#[strand::test]
async fn joinset_join_next_reports_completion_order_with_index() {
    let mut set = JoinSet::new();

    for delay in [60, 10, 30] {
        set.spawn(async move {
            sleep(Duration::from_millis(delay)).await;
            delay
        });
    }

    let mut order = Vec::new();
    while let Some((index, outcome)) = set.join_next().await {
        order.push((index, outcome.unwrap()));
    }

    assert_eq!(order, vec![(1, 10), (2, 30), (0, 60)]);
}

#[strand::test]
async fn joinset_slots_keep_positions() {
    let mut set = JoinSet::new();

    for id in 0..4u32 {
        set.try_spawn(async move {
            sleep(Duration::from_millis(u64::from(4 - id) * 10)).await;
            if id % 2 == 1 {
                return Err(LookupFailed(id));
            }
            Ok(id * 100)
        });
    }

    let slots = set.join_slots().await;

    assert_eq!(slots.len(), 4);
    assert_eq!(slots[0].as_ref().unwrap(), &0);
    assert_eq!(slots[2].as_ref().unwrap(), &200);
    assert_eq!(
        slots[1].as_ref().unwrap_err().message(),
        "lookup failed for 1"
    );
    assert_eq!(
        slots[3]
            .as_ref()
            .unwrap_err()
            .downcast_ref::<LookupFailed>()
            .map(|e| e.0),
        Some(3)
    );
    assert!(set.is_empty());
}

#[strand::test]
async fn joinset_join_all_partitions() {
    let mut set: JoinSet<u32> = (0..3)
        .map(|i| strand::task::spawn(async move { i }))
        .collect();

    set.try_spawn(async { Err::<u32, _>(LookupFailed(7)) });

    let partitioned = set.join_all().await;

    assert!(!partitioned.is_success());
    assert_eq!(partitioned.results, vec![0, 1, 2]);
    assert_eq!(partitioned.failures.len(), 1);
}
