//! Shared formatting helpers.

use std::time::Duration;

pub(crate) const RULE_WIDTH: usize = 80;

/// Prints a section title framed by horizontal rules.
pub(crate) fn section(title: &str) {
    println!("{}", "=".repeat(RULE_WIDTH));
    println!("{title}:");
    println!("{}", "=".repeat(RULE_WIDTH));
}

/// Whole milliseconds, rounded.
pub(crate) fn millis(duration: Duration) -> u64 {
    (duration.as_secs_f64() * 1000.0).round() as u64
}

/// Ratio of the sequential baseline to the measured time, two decimals.
pub(crate) fn speedup(sequential_ms: u64, parallel_ms: u64) -> f64 {
    if parallel_ms == 0 {
        return 0.0;
    }

    (sequential_ms as f64 / parallel_ms as f64 * 100.0).round() / 100.0
}

/// Formats a byte count with thousands separators.
pub(crate) fn thousands(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thousands_separators() {
        assert_eq!(thousands(0), "0");
        assert_eq!(thousands(999), "999");
        assert_eq!(thousands(1000), "1,000");
        assert_eq!(thousands(1234567), "1,234,567");
    }

    #[test]
    fn speedup_rounds_to_two_decimals() {
        assert_eq!(speedup(5000, 1003), 4.99);
        assert_eq!(speedup(100, 0), 0.0);
    }
}
