//! Pipeline entry points for scraper operations.
//!
//! - `run_scraper`: Listing pages → detail pages → records
//! - `run_cleaner`: Clean a raw scrape file
//! - `run_probe`: Explore listing pagination
//! - `run_stats`: Field coverage of a CSV file

pub mod clean;
pub mod probe;
pub mod scrape;
pub mod stats;

use std::time::Duration;

pub use clean::{CleanReport, run_cleaner};
pub use probe::{estimate_total, run_probe, run_probe_command};
pub use scrape::{run_scrape, run_scraper, save_raw};
pub use stats::{FieldCoverage, run_stats};

/// Sleeps between consecutive requests, never before the first one.
pub(crate) struct Pacer {
    delay: Duration,
    started: bool,
}

impl Pacer {
    pub(crate) fn new(delay_ms: u64) -> Self {
        Self {
            delay: Duration::from_millis(delay_ms),
            started: false,
        }
    }

    pub(crate) async fn wait(&mut self) {
        if self.started && !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.started = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[tokio::test]
    async fn pacer_waits_between_requests_only() {
        let delay = Duration::from_millis(40);
        let mut pacer = Pacer::new(40);

        let start = Instant::now();
        pacer.wait().await;
        assert!(start.elapsed() < delay);

        let start = Instant::now();
        pacer.wait().await;
        pacer.wait().await;
        assert!(start.elapsed() >= delay * 2);
    }

    #[tokio::test]
    async fn zero_delay_never_sleeps() {
        let mut pacer = Pacer::new(0);
        let start = Instant::now();
        for _ in 0..3 {
            pacer.wait().await;
        }
        assert!(start.elapsed() < Duration::from_millis(40));
    }
}
