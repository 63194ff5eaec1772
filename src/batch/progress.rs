//! Coarse progress reporting for batch runs.

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Instant;
use tracing::info;

/// Counts processed items, drives an optional progress bar and logs a
/// progress line every `interval` items.
pub struct BatchProgress {
    bar: Option<ProgressBar>,
    total: usize,
    interval: usize,
    done: usize,
    started: Instant,
}

impl BatchProgress {
    pub fn new(total: usize, interval: usize, show_bar: bool) -> Self {
        let bar = if show_bar {
            let pb = ProgressBar::new(total as u64);
            let style = ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({per_sec}, {eta})",
                )
                .map(|s| s.progress_chars("#>-"))
                .unwrap_or_else(|_| ProgressStyle::default_bar());
            pb.set_style(style);
            Some(pb)
        } else {
            None
        };

        Self {
            bar,
            total,
            interval,
            done: 0,
            started: Instant::now(),
        }
    }

    /// Record one finished item.
    pub fn tick(&mut self) {
        self.done += 1;

        if let Some(ref pb) = self.bar {
            pb.set_position(self.done as u64);
        }

        if self.should_log() {
            let elapsed = self.started.elapsed().as_secs_f64();
            let speed = if elapsed > 0.0 {
                self.done as f64 / elapsed
            } else {
                0.0
            };
            let eta = if speed > 0.0 {
                (self.total - self.done) as f64 / speed
            } else {
                0.0
            };
            info!(
                "Progress: {}/{} ({:.1}%) - Speed: {:.1} texts/sec - ETA: {:.0}s",
                self.done,
                self.total,
                self.percent(),
                speed,
                eta
            );
        }
    }

    fn should_log(&self) -> bool {
        self.interval > 0 && self.done % self.interval == 0 && self.done < self.total
    }

    /// Items processed so far.
    #[cfg(test)]
    pub fn done(&self) -> usize {
        self.done
    }

    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            100.0
        } else {
            self.done as f64 / self.total as f64 * 100.0
        }
    }

    /// Finish the bar and return the elapsed time in seconds.
    pub fn finish(self) -> f64 {
        if let Some(pb) = self.bar {
            pb.finish_with_message("Analysis complete");
        }
        self.started.elapsed().as_secs_f64()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_counts_and_percent() {
        let mut progress = BatchProgress::new(4, 2, false);
        progress.tick();
        assert_eq!(progress.done(), 1);
        assert!((progress.percent() - 25.0).abs() < 1e-9);
        progress.tick();
        progress.tick();
        progress.tick();
        assert!((progress.percent() - 100.0).abs() < 1e-9);
        assert!(progress.finish() >= 0.0);
    }

    #[test]
    fn test_log_cadence() {
        let mut progress = BatchProgress::new(10, 3, false);
        let mut logged = Vec::new();
        for _ in 0..10 {
            progress.tick();
            if progress.should_log() {
                logged.push(progress.done());
            }
        }
        assert_eq!(logged, vec![3, 6, 9]);
    }

    #[test]
    fn test_zero_interval_never_logs() {
        let mut progress = BatchProgress::new(5, 0, false);
        progress.tick();
        assert!(!progress.should_log());
    }

    #[test]
    fn test_empty_batch_is_complete() {
        let progress = BatchProgress::new(0, 100, false);
        assert_eq!(progress.percent(), 100.0);
    }
}
