use crate::fetch;
use crate::report::millis;

use anyhow::Result;
use std::time::{Duration, Instant};
use strand::task;
use strand::time::{instrumented, sleep_ms};

#[derive(Debug, thiserror::Error)]
#[error("{0}")]
struct DemoError(&'static str);

pub(crate) async fn run(url: String) -> Result<()> {
    println!("=== Basic Test ===\n");

    println!("Test 1: Simple spawn and await");
    let start = Instant::now();
    let handle = task::spawn(async {
        sleep_ms(500).await;
        "Hello, strand!"
    });

    let greeting = handle.await?;
    println!("Result: {greeting}");
    println!("Duration: {}ms\n", millis(start.elapsed()));

    println!("Test 2: Parallel execution");
    let start = Instant::now();
    let handles: Vec<_> = (1..=3)
        .map(|i| {
            task::spawn(async move {
                let ((), elapsed) = instrumented(sleep_ms(1000)).await;
                format!("Task {i} completed in {}ms", millis(elapsed))
            })
        })
        .collect();

    let (results, _) = task::await_all(handles).await;
    println!("Results:");
    for result in &results {
        println!("  - {result}");
    }
    println!(
        "Total duration: {}ms (should be ~1000ms, not 3000ms)\n",
        millis(start.elapsed())
    );

    println!("Test 3: Error handling");
    let ok = task::try_spawn(async {
        sleep_ms(100).await;
        Ok::<_, DemoError>("Success!")
    });
    match ok.await {
        Ok(_) => println!("✓ No error case works"),
        Err(failure) => println!("✗ Unexpected error: {}", failure.message()),
    }

    let failing = task::try_spawn(async {
        sleep_ms(100).await;
        Err::<&str, _>(DemoError("Intentional error"))
    });
    match failing.await {
        Ok(_) => println!("✗ Error case didn't fail"),
        Err(failure) => println!("✓ Error handling works: {}", failure.message()),
    }

    println!("\nTest 4: Blocking I/O ({url})");
    let client = fetch::client(Duration::from_secs(10))?;
    let handle = task::try_spawn(async move {
        let page = fetch::fetch(client, url).await?;
        Ok::<_, strand::IoFailure>(format!("Read {} bytes", page.body.len()))
    });

    match handle.await {
        Ok(summary) => println!("Result: {summary}"),
        Err(failure) => println!("✗ {}", failure.message()),
    }

    println!("\n=== All tests completed ===");
    Ok(())
}
