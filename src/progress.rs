//! Periodic progress and ETA reporting
//!
//! Purely observational: the meter consumes elapsed time and frame counts,
//! logs a human-readable ETA at a bounded rate, and produces nothing the
//! computation depends on. It cannot block or fail the run.

use std::time::{Duration, Instant};

const DEFAULT_INTERVAL: Duration = Duration::from_secs(1);

/// Rate-limited ETA reporter for the frame loop.
pub struct ProgressMeter {
    start: Instant,
    last: Instant,
    interval: Duration,
    total: usize,
}

impl ProgressMeter {
    pub fn new(total: usize) -> Self {
        Self::with_interval(total, DEFAULT_INTERVAL)
    }

    pub fn with_interval(total: usize, interval: Duration) -> Self {
        let now = Instant::now();
        Self {
            start: now,
            last: now,
            interval,
            total,
        }
    }

    /// Record that `done` frames have completed; logs at most once per
    /// interval.
    pub fn tick(&mut self, done: usize) {
        if done == 0 || done > self.total || self.last.elapsed() < self.interval {
            return;
        }
        self.last = Instant::now();

        let elapsed = self.start.elapsed();
        let remaining = eta(elapsed, done, self.total);
        tracing::info!(
            "frame {}/{} ({:.0}%), eta {}",
            done,
            self.total,
            done as f64 / self.total as f64 * 100.0,
            format_duration(remaining),
        );
    }
}

/// Remaining time assuming the observed per-frame rate holds.
fn eta(elapsed: Duration, done: usize, total: usize) -> Duration {
    elapsed.mul_f64((total - done) as f64 / done as f64)
}

fn format_duration(d: Duration) -> String {
    let secs = d.as_secs();
    if secs >= 3600 {
        format!("{}h {:02}m", secs / 3600, (secs % 3600) / 60)
    } else if secs >= 60 {
        format!("{}m {:02}s", secs / 60, secs % 60)
    } else {
        format!("{}s", secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eta_halfway() {
        let remaining = eta(Duration::from_secs(10), 50, 100);
        assert_eq!(remaining, Duration::from_secs(10));
    }

    #[test]
    fn test_eta_done() {
        assert_eq!(eta(Duration::from_secs(10), 100, 100), Duration::ZERO);
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_secs(42)), "42s");
        assert_eq!(format_duration(Duration::from_secs(125)), "2m 05s");
        assert_eq!(format_duration(Duration::from_secs(3720)), "1h 02m");
    }

    #[test]
    fn test_tick_never_panics_on_edges() {
        let mut meter = ProgressMeter::with_interval(10, Duration::ZERO);
        meter.tick(0);
        meter.tick(5);
        meter.tick(10);
        meter.tick(11); // out of range, ignored
    }
}
