//! Metrics collection for the price poller

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Point-in-time view of the poller counters
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PollerMetrics {
    /// Ticks that began running
    pub ticks_started: u64,

    /// Samples appended to the buffer
    pub samples_appended: u64,

    /// Ticks that found no symbols and fetched nothing
    pub empty_ticks: u64,

    /// Deadlines dropped because the previous tick was still fetching
    ///
    /// Only counted under `OverlapPolicy::Skip`; delayed ticks still run.
    pub ticks_skipped: u64,

    /// Ticks whose fetch failed
    pub fetch_failures: u64,

    /// Ticks whose symbol source failed
    pub symbol_source_failures: u64,

    /// Duration of the most recent fetch in microseconds
    pub last_fetch_latency_us: u64,

    /// Average fetch duration over the recent history in microseconds
    pub avg_fetch_latency_us: u64,

    /// Maximum fetch duration in microseconds
    pub max_fetch_latency_us: u64,

    /// 95th percentile fetch duration over the recent history in microseconds
    pub p95_fetch_latency_us: u64,

    /// Seconds since the collector was created
    pub uptime_seconds: u64,
}

/// Lock-free counters shared between the polling task and its handle
pub struct MetricsCollector {
    ticks_started: AtomicU64,
    samples_appended: AtomicU64,
    empty_ticks: AtomicU64,
    ticks_skipped: AtomicU64,
    fetch_failures: AtomicU64,
    symbol_source_failures: AtomicU64,

    // Fetch latency ring, microseconds
    fetch_latencies: Vec<AtomicU64>,
    total_fetches: AtomicU64,
    last_fetch_latency: AtomicU64,
    max_fetch_latency: AtomicU64,

    start_time: Instant,
    history_size: usize,
}

impl MetricsCollector {
    /// Create a collector keeping `history_size` fetch latencies
    pub fn new(history_size: usize) -> Self {
        let history_size = history_size.max(1);
        Self {
            ticks_started: AtomicU64::new(0),
            samples_appended: AtomicU64::new(0),
            empty_ticks: AtomicU64::new(0),
            ticks_skipped: AtomicU64::new(0),
            fetch_failures: AtomicU64::new(0),
            symbol_source_failures: AtomicU64::new(0),
            fetch_latencies: (0..history_size).map(|_| AtomicU64::new(0)).collect(),
            total_fetches: AtomicU64::new(0),
            last_fetch_latency: AtomicU64::new(0),
            max_fetch_latency: AtomicU64::new(0),
            start_time: Instant::now(),
            history_size,
        }
    }

    /// Record the start of a tick, returning its zero-based number
    pub fn record_tick_started(&self) -> u64 {
        self.ticks_started.fetch_add(1, Ordering::Relaxed)
    }

    pub fn record_skipped(&self, missed: u64) {
        self.ticks_skipped.fetch_add(missed, Ordering::Relaxed);
    }

    pub fn record_empty_tick(&self) {
        self.empty_ticks.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_symbol_source_failure(&self) {
        self.symbol_source_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_sample(&self) {
        self.samples_appended.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_fetch_failure(&self) {
        self.fetch_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Record how long a fetch took, successful or not
    pub fn record_fetch_latency(&self, latency: Duration) {
        let latency_us = latency.as_micros() as u64;
        let index = (self.total_fetches.fetch_add(1, Ordering::Relaxed) as usize) % self.history_size;

        self.fetch_latencies[index].store(latency_us, Ordering::Relaxed);
        self.last_fetch_latency.store(latency_us, Ordering::Relaxed);

        let mut max_latency = self.max_fetch_latency.load(Ordering::Relaxed);
        while latency_us > max_latency {
            match self.max_fetch_latency.compare_exchange_weak(
                max_latency,
                latency_us,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => break,
                Err(current) => max_latency = current,
            }
        }
    }

    /// Get current metrics
    pub fn snapshot(&self) -> PollerMetrics {
        let recorded = (self.total_fetches.load(Ordering::Relaxed) as usize).min(self.history_size);
        let mut latencies: Vec<u64> = self.fetch_latencies[..recorded]
            .iter()
            .map(|l| l.load(Ordering::Relaxed))
            .collect();
        latencies.sort_unstable();

        let avg_fetch_latency_us = if latencies.is_empty() {
            0
        } else {
            latencies.iter().sum::<u64>() / latencies.len() as u64
        };

        let p95_fetch_latency_us = if latencies.is_empty() {
            0
        } else {
            let index = (latencies.len() as f64 * 0.95) as usize;
            latencies[index.min(latencies.len() - 1)]
        };

        PollerMetrics {
            ticks_started: self.ticks_started.load(Ordering::Relaxed),
            samples_appended: self.samples_appended.load(Ordering::Relaxed),
            empty_ticks: self.empty_ticks.load(Ordering::Relaxed),
            ticks_skipped: self.ticks_skipped.load(Ordering::Relaxed),
            fetch_failures: self.fetch_failures.load(Ordering::Relaxed),
            symbol_source_failures: self.symbol_source_failures.load(Ordering::Relaxed),
            last_fetch_latency_us: self.last_fetch_latency.load(Ordering::Relaxed),
            avg_fetch_latency_us,
            max_fetch_latency_us: self.max_fetch_latency.load(Ordering::Relaxed),
            p95_fetch_latency_us,
            uptime_seconds: self.start_time.elapsed().as_secs(),
        }
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new(crate::DEFAULT_BUFFER_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters() {
        let collector = MetricsCollector::new(10);

        assert_eq!(collector.record_tick_started(), 0);
        assert_eq!(collector.record_tick_started(), 1);
        collector.record_sample();
        collector.record_fetch_failure();
        collector.record_empty_tick();
        collector.record_skipped(3);
        collector.record_symbol_source_failure();

        let metrics = collector.snapshot();
        assert_eq!(metrics.ticks_started, 2);
        assert_eq!(metrics.samples_appended, 1);
        assert_eq!(metrics.fetch_failures, 1);
        assert_eq!(metrics.empty_ticks, 1);
        assert_eq!(metrics.ticks_skipped, 3);
        assert_eq!(metrics.symbol_source_failures, 1);
    }

    #[test]
    fn test_latency_statistics() {
        let collector = MetricsCollector::new(4);
        for ms in [10, 20, 30, 40, 50] {
            collector.record_fetch_latency(Duration::from_millis(ms));
        }

        let metrics = collector.snapshot();
        assert_eq!(metrics.last_fetch_latency_us, 50_000);
        assert_eq!(metrics.max_fetch_latency_us, 50_000);
        // History keeps the last four: 20, 30, 40, 50
        assert_eq!(metrics.avg_fetch_latency_us, 35_000);
        assert_eq!(metrics.p95_fetch_latency_us, 50_000);
    }
}
