use strand::io::{self, IoErrorCode, IoFailure, perform_io};
use strand::task;
use strand::time::{sleep_ms, timeout};
use strand::FailureKind;

use std::thread;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

#[strand::test]
async fn operation_result_is_returned() {
    let bytes = perform_io(|| Ok(b"payload".to_vec())).await.unwrap();

    assert_eq!(bytes, b"payload");
}

#[strand::test]
async fn operation_failure_carries_its_code() {
    let err = perform_io(|| Err::<(), _>(IoFailure::status(503, "unavailable")))
        .await
        .unwrap_err();

    assert_eq!(err.code, IoErrorCode::Status(503));
    assert_eq!(err.message, "unavailable");
}

#[strand::test]
async fn panicking_operation_becomes_a_transport_failure() {
    let err = perform_io(|| -> Result<(), IoFailure> { panic!("driver exploded") })
        .await
        .unwrap_err();

    assert_eq!(err.code, IoErrorCode::Transport);
}

#[strand::test]
async fn io_failure_of_a_task_is_classified_as_io() {
    let handle = task::try_spawn(perform_io(|| {
        Err::<(), _>(IoFailure::timeout("peer too slow"))
    }));

    let failure = handle.await.unwrap_err();

    assert_eq!(failure.kind(), FailureKind::Io);
    assert!(failure.downcast_ref::<IoFailure>().unwrap().is_timeout());
}

#[strand::test(blocking_threads = 4)]
async fn blocking_operations_run_in_parallel() {
    let start = Instant::now();

    let handles: Vec<_> = (0..4)
        .map(|i| {
            task::try_spawn(perform_io(move || {
                thread::sleep(Duration::from_millis(150));
                Ok(i)
            }))
        })
        .collect();

    let (results, failures) = task::await_all(handles).await;
    let elapsed = start.elapsed();

    assert_eq!(results, vec![0, 1, 2, 3]);
    assert!(failures.is_empty());
    assert!(
        elapsed < Duration::from_millis(450),
        "four 150ms operations on four threads took {elapsed:?}"
    );
}

#[strand::test]
async fn other_tasks_progress_during_io() {
    let ticker = task::spawn(async {
        let mut ticks = 0;
        for _ in 0..5 {
            sleep_ms(10).await;
            ticks += 1;
        }
        ticks
    });

    perform_io(|| {
        thread::sleep(Duration::from_millis(200));
        Ok(())
    })
    .await
    .unwrap();

    assert!(ticker.is_finished());
    assert_eq!(ticker.await.unwrap(), 5);
}

#[strand::test]
async fn abandoned_operation_is_discarded() {
    let slow = perform_io(|| {
        thread::sleep(Duration::from_millis(200));
        Ok("too late")
    });

    assert!(timeout(Duration::from_millis(20), slow).await.is_err());

    // The runtime keeps working after the registration was dropped.
    let value = perform_io(|| Ok(1)).await.unwrap();
    assert_eq!(value, 1);
}

#[strand::test]
async fn file_helpers_round_trip() {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let path = std::env::temp_dir().join(format!(
        "strand-io-{}-{}.tmp",
        std::process::id(),
        nanos
    ));

    io::write(&path, "hello world").await.unwrap();

    assert_eq!(io::read_to_string(&path).await.unwrap(), "hello world");
    assert_eq!(io::read(&path).await.unwrap(), b"hello world");

    let _ = std::fs::remove_file(&path);
}

#[strand::test]
async fn missing_file_is_an_io_failure() {
    let path = std::env::temp_dir().join("strand-io-this-file-does-not-exist");

    assert!(io::read(&path).await.is_err());
}
