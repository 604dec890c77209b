use crate::report::{millis, speedup};

use anyhow::Result;
use std::time::Instant;
use strand::task;
use strand::time::{instrumented, sleep_ms};

struct SleepResult {
    id: u32,
    expected_ms: u64,
    actual_ms: u64,
    finished_at: String,
}

pub(crate) async fn run(steps: u32, delay_ms: u64) -> Result<()> {
    println!("=== Parallel Sleep Demo ===\n");
    println!("Executing {steps} sleep operations ({delay_ms}ms each) in parallel...\n");

    let start = Instant::now();

    let handles = (1..=steps).map(|id| {
        task::spawn(async move {
            let ((), elapsed) = instrumented(sleep_ms(delay_ms)).await;

            SleepResult {
                id,
                expected_ms: delay_ms,
                actual_ms: millis(elapsed),
                finished_at: clock(),
            }
        })
    });

    let (results, failures) = task::await_all(handles.collect::<Vec<_>>()).await;
    let total_ms = millis(start.elapsed());

    println!("Total: {total_ms}ms\n");
    println!("Execution log:");
    for result in &results {
        println!(
            "  [{}] Task {} completed: {}ms (expected {}ms)",
            result.finished_at, result.id, result.actual_ms, result.expected_ms
        );
    }

    for failure in &failures {
        println!("  ✗ {failure}");
    }

    let sequential_ms = u64::from(steps) * delay_ms;

    println!("\nComparison:");
    println!("  Parallel execution: {total_ms}ms");
    println!("  Sequential would be: {sequential_ms}ms");
    println!("  Speedup: {}x\n", speedup(sequential_ms, total_ms));

    if (total_ms as f64) < delay_ms as f64 * 1.5 {
        println!("✓ Parallel execution confirmed!");
    } else {
        println!("⚠ Tasks may not be running in parallel");
    }

    Ok(())
}

/// Local time of day as `HH:MM:SS.mmm`.
fn clock() -> String {
    chrono::Local::now().format("%H:%M:%S%.3f").to_string()
}
