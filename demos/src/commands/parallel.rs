use crate::report::{millis, speedup};

use anyhow::Result;
use std::time::Instant;
use strand::task::JoinSet;
use strand::time::{instrumented, sleep_ms};

/// Latency of each simulated API, in milliseconds.
const APIS: [(&str, u64); 5] = [
    ("API-1", 1000),
    ("API-2", 1500),
    ("API-3", 800),
    ("API-4", 1200),
    ("API-5", 500),
];

struct ApiResponse {
    name: &'static str,
    delay_ms: u64,
    took_ms: u64,
    data: String,
}

pub(crate) async fn run() -> Result<()> {
    println!("=== Parallel Requests Demo ===\n");
    println!("Simulating {} parallel API calls...\n", APIS.len());

    let start = Instant::now();

    let mut set = JoinSet::new();
    for (name, delay_ms) in APIS {
        set.spawn(async move {
            let ((), elapsed) = instrumented(sleep_ms(delay_ms)).await;

            ApiResponse {
                name,
                delay_ms,
                took_ms: millis(elapsed),
                data: format!("Data from {name}"),
            }
        });
    }

    let (results, failures) = set.join_all().await.into_parts();
    let total_ms = millis(start.elapsed());

    println!("Results:");
    for (i, response) in results.iter().enumerate() {
        println!(
            "  {}. {}: {} (took {}ms, expected ~{}ms)",
            i + 1,
            response.name,
            response.data,
            response.took_ms,
            response.delay_ms
        );
    }

    let sequential_ms: u64 = results.iter().map(|r| r.delay_ms).sum();

    println!("\nTotal time: {total_ms}ms");
    println!("Sequential would take: {sequential_ms}ms");
    println!("Speedup: {}x", speedup(sequential_ms, total_ms));

    if !failures.is_empty() {
        println!("\nExceptions:");
        for failure in &failures {
            println!("  - {}", failure.message());
        }
    }

    println!("\n✓ Parallel execution works!");
    Ok(())
}
