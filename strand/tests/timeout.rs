use strand::task;
use strand::time::{sleep, timeout};
use std::time::{Duration, Instant};

#[strand::test]
async fn test_timeout_completes_before_deadline() {
    let handle = task::spawn(async {
        sleep(Duration::from_millis(10)).await;
        123
    });

    let result = timeout(Duration::from_millis(50), handle).await;

    assert!(
        matches!(result, Ok(Ok(v)) if v == 123),
        "Timeout should return Ok(Ok(123))"
    );
}

#[strand::test]
async fn test_timeout_expires() {
    let handle = task::spawn(async {
        sleep(Duration::from_millis(100)).await;
        456
    });
    let result = timeout(Duration::from_millis(20), handle).await;

    assert!(
        result.is_err(),
        "Timeout should return an error when deadline is exceeded"
    );
}

#[strand::test]
async fn test_timeout_drops_the_inner_sleep() {
    let start = Instant::now();
    let result = timeout(Duration::from_millis(20), sleep(Duration::from_secs(5))).await;

    assert!(result.is_err());
    assert!(start.elapsed() < Duration::from_secs(1));
    assert_eq!(result.unwrap_err().to_string(), "deadline elapsed");
}
