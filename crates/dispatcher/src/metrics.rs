//! Dispatcher metrics for observability
//!
//! Counters are mutated concurrently by every in-flight call; all updates
//! go through atomics. `queued` doubles as the admission counter: it is
//! the number of calls admitted but not yet picked up by a worker.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use serde::Serialize;

/// Aggregate metrics for a dispatcher
#[derive(Debug, Default)]
pub struct DispatcherMetrics {
    /// Calls admitted but not yet picked up by a worker
    queued: AtomicUsize,
    /// Total generate calls
    total_requests: AtomicU64,
    /// Calls that failed for any reason
    failed_requests: AtomicU64,
    /// Calls that hit their resolved timeout
    timeouts: AtomicU64,
    /// Calls rejected by admission control
    queue_full: AtomicU64,
    /// Cumulative wall-clock time of successful calls, in microseconds
    total_processing_micros: AtomicU64,
}

impl DispatcherMetrics {
    /// Create new metrics instance, all counters zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Current admitted-but-not-running count
    pub fn queued(&self) -> usize {
        self.queued.load(Ordering::Acquire)
    }

    /// Admission check: increment `queued` unless it would exceed `capacity`
    ///
    /// Instantaneous - never blocks waiting for capacity.
    pub fn try_enqueue(&self, capacity: usize) -> bool {
        self.queued
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |queued| {
                if queued < capacity {
                    Some(queued + 1)
                } else {
                    None
                }
            })
            .is_ok()
    }

    /// A worker picked up an admitted call
    pub fn dequeue(&self) {
        self.queued.fetch_sub(1, Ordering::AcqRel);
    }

    /// Get total request count
    pub fn total_requests(&self) -> u64 {
        self.total_requests.load(Ordering::Relaxed)
    }

    /// Increment total request count
    pub fn inc_total_requests(&self) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
    }

    /// Get failed request count
    pub fn failed_requests(&self) -> u64 {
        self.failed_requests.load(Ordering::Relaxed)
    }

    /// Increment failed request count
    pub fn inc_failed_requests(&self) {
        self.failed_requests.fetch_add(1, Ordering::Relaxed);
    }

    /// Get timeout count
    pub fn timeouts(&self) -> u64 {
        self.timeouts.load(Ordering::Relaxed)
    }

    /// Increment timeout count
    pub fn inc_timeouts(&self) {
        self.timeouts.fetch_add(1, Ordering::Relaxed);
    }

    /// Get queue-full rejection count
    pub fn queue_full(&self) -> u64 {
        self.queue_full.load(Ordering::Relaxed)
    }

    /// Increment queue-full rejection count
    pub fn inc_queue_full(&self) {
        self.queue_full.fetch_add(1, Ordering::Relaxed);
    }

    /// Add elapsed wall-clock time of a successful call
    pub fn add_processing_time(&self, elapsed: Duration) {
        self.total_processing_micros
            .fetch_add(elapsed.as_micros() as u64, Ordering::Relaxed);
    }

    /// Cumulative processing time of successful calls
    pub fn total_processing_time(&self) -> Duration {
        Duration::from_micros(self.total_processing_micros.load(Ordering::Relaxed))
    }

    /// Get snapshot of all metrics (non-destructive)
    pub fn snapshot(&self) -> MetricsSnapshot {
        let total_requests = self.total_requests();
        let failed_requests = self.failed_requests();
        let total_processing_time_s =
            self.total_processing_micros.load(Ordering::Relaxed) as f64 / 1_000_000.0;

        // Derived values are 0 on a fresh dispatcher - no division by zero
        let (success_rate, avg_processing_time_s) = if total_requests > 0 {
            (
                (total_requests - failed_requests) as f64 / total_requests as f64,
                total_processing_time_s / total_requests as f64,
            )
        } else {
            (0.0, 0.0)
        };

        MetricsSnapshot {
            queued: self.queued(),
            total_requests,
            failed_requests,
            timeouts: self.timeouts(),
            queue_full: self.queue_full(),
            total_processing_time_s,
            success_rate,
            avg_processing_time_s,
        }
    }
}

/// Snapshot of dispatcher metrics (for reporting)
#[derive(Debug, Clone, Copy, Serialize)]
pub struct MetricsSnapshot {
    /// Calls admitted but not yet picked up by a worker
    pub queued: usize,
    pub total_requests: u64,
    pub failed_requests: u64,
    pub timeouts: u64,
    pub queue_full: u64,
    /// Cumulative wall-clock time of successful calls, seconds
    pub total_processing_time_s: f64,
    /// (total - failed) / total, 0 when no requests
    pub success_rate: f64,
    /// total_processing_time / total_requests, 0 when no requests
    pub avg_processing_time_s: f64,
}
