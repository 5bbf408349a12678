//! Throughput-based time remaining estimates.

use std::time::Duration;

/// Shown until enough items have completed to estimate from.
pub const CALCULATING: &str = "Calculating...";
/// Shown on the final progress report.
pub const DONE: &str = "Done";

/// Human-readable estimate of the time left to process `total` items, given
/// that `current` took `elapsed`.
///
/// Below `min_samples` completed items the rate is too noisy to be useful and
/// [`CALCULATING`] is returned instead.
///
/// ```
/// use std::time::Duration;
/// use imgrab_engine::eta::estimate;
/// assert_eq!(estimate(10, 40, Duration::from_secs(5), 3), "~15s");
/// assert_eq!(estimate(10, 100, Duration::from_secs(10), 3), "~1m 30s");
/// assert_eq!(estimate(1, 100, Duration::from_secs(10), 3), "Calculating...");
/// ```
pub fn estimate(current: usize, total: usize, elapsed: Duration, min_samples: usize) -> String {
    if current == 0 || current < min_samples {
        return CALCULATING.to_string();
    }
    let rate = current as f64 / elapsed.as_secs_f64();
    let remaining = total.saturating_sub(current) as f64 / rate;
    // A zero elapsed time gives an infinite rate, and so zero (or NaN for
    // nothing left) remaining. Both are "no time at all".
    if !remaining.is_finite() || remaining < 1.0 {
        return "~0s".to_string();
    }
    let seconds = remaining.round() as u64;
    match seconds {
        0..60 => format!("~{seconds}s"),
        _ => format!("~{}m {}s", seconds / 60, seconds % 60),
    }
}

/// `current` as a whole percentage of `total`. An empty job is 100% done.
pub fn percent(current: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    let percent = current.min(total) * 100 / total;
    u8::try_from(percent).unwrap_or(100)
}
