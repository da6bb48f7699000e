//! Request metrics for the scoring service.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};
use tracing::info;

/// Latency samples kept for percentile estimates
const LATENCY_WINDOW: usize = 10_000;

/// Metrics collector for the scoring service
pub struct ServiceMetrics {
    /// Accepted prediction requests
    pub requests_served: AtomicU64,
    /// Requests rejected by validation
    pub requests_rejected: AtomicU64,
    /// Flights scored across all accepted requests
    pub flights_scored: AtomicU64,
    /// Flights predicted as delayed
    pub delays_predicted: AtomicU64,
    /// Request latencies (in microseconds)
    latencies: RwLock<Vec<u64>>,
    start_time: Instant,
}

impl ServiceMetrics {
    pub fn new() -> Self {
        Self {
            requests_served: AtomicU64::new(0),
            requests_rejected: AtomicU64::new(0),
            flights_scored: AtomicU64::new(0),
            delays_predicted: AtomicU64::new(0),
            latencies: RwLock::new(Vec::with_capacity(1000)),
            start_time: Instant::now(),
        }
    }

    /// Record an accepted request
    pub fn record_prediction(&self, latency: Duration, flights: usize, delayed: usize) {
        self.requests_served.fetch_add(1, Ordering::Relaxed);
        self.flights_scored.fetch_add(flights as u64, Ordering::Relaxed);
        self.delays_predicted.fetch_add(delayed as u64, Ordering::Relaxed);

        if let Ok(mut times) = self.latencies.write() {
            times.push(latency.as_micros() as u64);
            if times.len() > LATENCY_WINDOW {
                times.drain(0..LATENCY_WINDOW / 2);
            }
        }
    }

    /// Record a rejected request
    pub fn record_rejection(&self) {
        self.requests_rejected.fetch_add(1, Ordering::Relaxed);
    }

    /// Get latency statistics over the retained window
    pub fn latency_stats(&self) -> LatencyStats {
        let Ok(times) = self.latencies.read() else {
            return LatencyStats::default();
        };
        if times.is_empty() {
            return LatencyStats::default();
        }

        let mut sorted = times.clone();
        sorted.sort_unstable();

        let count = sorted.len();
        let sum: u64 = sorted.iter().sum();
        let at = |q: f64| sorted[((count as f64 * q) as usize).min(count - 1)];

        LatencyStats {
            count: count as u64,
            mean_us: sum / count as u64,
            p50_us: at(0.50),
            p95_us: at(0.95),
            p99_us: at(0.99),
            max_us: sorted[count - 1],
        }
    }

    /// Requests served per second since startup
    pub fn throughput(&self) -> f64 {
        let elapsed = self.start_time.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            self.requests_served.load(Ordering::Relaxed) as f64 / elapsed
        } else {
            0.0
        }
    }

    /// Point-in-time copy of all counters
    pub fn snapshot(&self) -> MetricsSnapshot {
        let flights = self.flights_scored.load(Ordering::Relaxed);
        let delays = self.delays_predicted.load(Ordering::Relaxed);

        MetricsSnapshot {
            uptime_secs: self.start_time.elapsed().as_secs(),
            requests_served: self.requests_served.load(Ordering::Relaxed),
            requests_rejected: self.requests_rejected.load(Ordering::Relaxed),
            flights_scored: flights,
            delays_predicted: delays,
            delay_rate: if flights > 0 {
                delays as f64 / flights as f64
            } else {
                0.0
            },
            throughput_rps: self.throughput(),
            latency: self.latency_stats(),
        }
    }

    /// Log a summary of the current counters
    pub fn log_summary(&self) {
        let snapshot = self.snapshot();
        info!(
            requests = snapshot.requests_served,
            rejected = snapshot.requests_rejected,
            flights = snapshot.flights_scored,
            delay_rate = format!("{:.1}%", snapshot.delay_rate * 100.0),
            throughput = format!("{:.1} req/s", snapshot.throughput_rps),
            mean_us = snapshot.latency.mean_us,
            p99_us = snapshot.latency.p99_us,
            "Service metrics"
        );
    }
}

impl Default for ServiceMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Latency statistics
#[derive(Debug, Default, Clone, Serialize)]
pub struct LatencyStats {
    pub count: u64,
    pub mean_us: u64,
    pub p50_us: u64,
    pub p95_us: u64,
    pub p99_us: u64,
    pub max_us: u64,
}

/// Serializable view of [`ServiceMetrics`]
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub uptime_secs: u64,
    pub requests_served: u64,
    pub requests_rejected: u64,
    pub flights_scored: u64,
    pub delays_predicted: u64,
    pub delay_rate: f64,
    pub throughput_rps: f64,
    pub latency: LatencyStats,
}

/// Periodic metrics logger
pub struct MetricsReporter {
    metrics: Arc<ServiceMetrics>,
    interval_secs: u64,
}

impl MetricsReporter {
    pub fn new(metrics: Arc<ServiceMetrics>, interval_secs: u64) -> Self {
        Self {
            metrics,
            interval_secs,
        }
    }

    /// Start the periodic reporting task
    pub async fn start(self) {
        let mut interval = tokio::time::interval(Duration::from_secs(self.interval_secs));
        // The first tick completes immediately.
        interval.tick().await;
        loop {
            interval.tick().await;
            self.metrics.log_summary();
        }
    }
}
