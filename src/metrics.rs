//! Session statistics for the interactive prediction loop.

use crate::types::prediction::PurchaseClass;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;
use std::time::{Duration, Instant};
use tracing::info;

/// Counters and latencies for one session
pub struct SessionMetrics {
    /// Successful predictions, class 1
    pub will_buy: AtomicU64,
    /// Successful predictions, class 0
    pub will_not_buy: AtomicU64,
    /// Requests that failed during scaling or scoring
    pub failed: AtomicU64,
    /// Requests refused because artifacts were not ready
    pub rejected: AtomicU64,
    /// Prediction latencies (in microseconds)
    latencies: RwLock<Vec<u64>>,
    start_time: Instant,
}

impl SessionMetrics {
    pub fn new() -> Self {
        Self {
            will_buy: AtomicU64::new(0),
            will_not_buy: AtomicU64::new(0),
            failed: AtomicU64::new(0),
            rejected: AtomicU64::new(0),
            latencies: RwLock::new(Vec::new()),
            start_time: Instant::now(),
        }
    }

    /// Record a successful prediction
    pub fn record_prediction(&self, class: PurchaseClass, latency: Duration) {
        match class {
            PurchaseClass::WillBuy => self.will_buy.fetch_add(1, Ordering::Relaxed),
            PurchaseClass::WillNotBuy => self.will_not_buy.fetch_add(1, Ordering::Relaxed),
        };

        if let Ok(mut latencies) = self.latencies.write() {
            latencies.push(latency.as_micros() as u64);
            // Keep only last 10000
            if latencies.len() > 10000 {
                latencies.drain(0..5000);
            }
        }
    }

    pub fn record_failure(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_rejection(&self) {
        self.rejected.fetch_add(1, Ordering::Relaxed);
    }

    /// Number of successful predictions
    pub fn predictions(&self) -> u64 {
        self.will_buy.load(Ordering::Relaxed) + self.will_not_buy.load(Ordering::Relaxed)
    }

    /// Get latency statistics
    pub fn latency_stats(&self) -> LatencyStats {
        let mut sorted = match self.latencies.read() {
            Ok(latencies) => latencies.clone(),
            Err(_) => return LatencyStats::default(),
        };
        if sorted.is_empty() {
            return LatencyStats::default();
        }
        sorted.sort_unstable();

        let count = sorted.len();
        let sum: u64 = sorted.iter().sum();

        LatencyStats {
            count: count as u64,
            mean_us: sum / count as u64,
            p50_us: sorted[count / 2],
            p99_us: sorted[((count as f64 * 0.99) as usize).min(count - 1)],
            max_us: sorted[count - 1],
        }
    }

    /// Log the end-of-session summary
    pub fn log_summary(&self) {
        let latency = self.latency_stats();

        info!(
            predictions = self.predictions(),
            will_buy = self.will_buy.load(Ordering::Relaxed),
            will_not_buy = self.will_not_buy.load(Ordering::Relaxed),
            failed = self.failed.load(Ordering::Relaxed),
            rejected = self.rejected.load(Ordering::Relaxed),
            session_secs = self.start_time.elapsed().as_secs(),
            "Session summary"
        );
        if latency.count > 0 {
            info!(
                mean_us = latency.mean_us,
                p50_us = latency.p50_us,
                p99_us = latency.p99_us,
                max_us = latency.max_us,
                "Prediction latency"
            );
        }
    }
}

impl Default for SessionMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Prediction latency statistics
#[derive(Debug, Default, PartialEq, Eq)]
pub struct LatencyStats {
    pub count: u64,
    pub mean_us: u64,
    pub p50_us: u64,
    pub p99_us: u64,
    pub max_us: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_recording() {
        let metrics = SessionMetrics::new();

        metrics.record_prediction(PurchaseClass::WillBuy, Duration::from_micros(100));
        metrics.record_prediction(PurchaseClass::WillNotBuy, Duration::from_micros(300));
        metrics.record_prediction(PurchaseClass::WillBuy, Duration::from_micros(200));
        metrics.record_failure();
        metrics.record_rejection();

        assert_eq!(metrics.predictions(), 3);
        assert_eq!(metrics.will_buy.load(Ordering::Relaxed), 2);
        assert_eq!(metrics.failed.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.rejected.load(Ordering::Relaxed), 1);

        let stats = metrics.latency_stats();
        assert_eq!(stats.count, 3);
        assert_eq!(stats.mean_us, 200);
        assert_eq!(stats.p50_us, 200);
        assert_eq!(stats.max_us, 300);
    }

    #[test]
    fn test_empty_stats() {
        assert_eq!(SessionMetrics::new().latency_stats(), LatencyStats::default());
    }
}
