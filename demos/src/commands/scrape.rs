use crate::fetch;
use crate::page::{self, Summary};
use crate::report::{self, millis, speedup, thousands};

use anyhow::Result;
use std::time::{Duration, Instant};
use strand::IoFailure;
use strand::task::JoinSet;
use strand::time::instrumented;

const DEFAULT_SITES: [&str; 5] = [
    "https://www.rust-lang.org",
    "https://github.com",
    "https://stackoverflow.com",
    "https://www.wikipedia.org",
    "https://www.reddit.com",
];

struct Scraped {
    status: u16,
    summary: Summary,
    elapsed: Duration,
}

/// A fetch that failed, with how long the attempt took.
#[derive(Debug, thiserror::Error)]
#[error("{source}")]
struct ScrapeError {
    elapsed: Duration,
    source: IoFailure,
}

pub(crate) async fn run(urls: Vec<String>, timeout_secs: u64) -> Result<()> {
    let urls = if urls.is_empty() {
        DEFAULT_SITES.iter().map(|s| s.to_string()).collect()
    } else {
        urls
    };

    println!("=== Parallel Web Scraper Demo ===\n");
    println!("Fetching and parsing {} websites in parallel...\n", urls.len());

    let client = fetch::client(Duration::from_secs(timeout_secs))?;
    let start = Instant::now();

    let mut set = JoinSet::new();
    for url in &urls {
        let client = client.clone();
        let url = url.clone();

        set.try_spawn(async move {
            let (fetched, elapsed) = instrumented(fetch::fetch(client, url)).await;

            match fetched {
                Ok(page) => Ok(Scraped {
                    status: page.status,
                    summary: page::summarize(&page.body),
                    elapsed,
                }),
                Err(source) => Err(ScrapeError { elapsed, source }),
            }
        });
    }

    // One slot per URL, in the order they were given.
    let slots = set.join_slots().await;
    let total_ms = millis(start.elapsed());

    report::section("RESULTS");
    println!();

    let mut succeeded = 0;
    let mut total_bytes = 0;
    let mut durations_ms = Vec::with_capacity(slots.len());
    let mut unexpected = Vec::new();

    for (i, (url, slot)) in urls.iter().zip(&slots).enumerate() {
        println!("[{}] {url}", i + 1);
        println!("{}", "-".repeat(report::RULE_WIDTH));

        match slot {
            Ok(scraped) => {
                succeeded += 1;
                total_bytes += scraped.summary.size;
                durations_ms.push(millis(scraped.elapsed));

                println!("✓ Status: HTTP {}", scraped.status);
                println!("✓ Title: {}", scraped.summary.title);
                if !scraped.summary.description.is_empty() {
                    println!("✓ Description: {}", scraped.summary.description);
                }
                println!("✓ Links found: {}", scraped.summary.link_count);
                println!("✓ Page size: {} bytes", thousands(scraped.summary.size));
                println!("✓ Fetch time: {}ms", millis(scraped.elapsed));
            }
            Err(failure) => match failure.downcast_ref::<ScrapeError>() {
                Some(error) => {
                    durations_ms.push(millis(error.elapsed));

                    println!("✗ Error: {}", error.source.message);
                    println!("✗ Kind: {}", error.source.code);
                    println!("✗ Attempt duration: {}ms", millis(error.elapsed));
                }
                None => {
                    println!("✗ Task failed: {}", failure.message());
                    unexpected.push(failure);
                }
            },
        }

        println!();
    }

    let sequential_ms: u64 = durations_ms.iter().sum();
    let average_ms = if durations_ms.is_empty() {
        0
    } else {
        sequential_ms / durations_ms.len() as u64
    };

    report::section("STATISTICS");
    println!("Total websites: {}", urls.len());
    println!("Successful: {succeeded}");
    println!("Failed: {}", urls.len() - succeeded);
    println!("Total data downloaded: {} bytes", thousands(total_bytes));
    println!("Average fetch time: {average_ms}ms");
    println!();
    println!("Total parallel execution time: {total_ms}ms");
    println!("Sequential would take: ~{sequential_ms}ms");
    println!("Speedup: {}x", speedup(sequential_ms, total_ms));

    if !unexpected.is_empty() {
        println!();
        report::section("EXCEPTIONS");
        for (i, failure) in unexpected.iter().enumerate() {
            println!("[{i}] {failure}");
        }
    }

    Ok(())
}
