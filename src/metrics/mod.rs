//! Basic metrics instrumentation for tracking storage performance.
//!
//! Provides counters and duration tracking for storage writes and for
//! inputs rejected by validation.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Metrics collector for tracking phonebook activity.
#[derive(Debug, Clone)]
pub struct Metrics {
    /// Total number of storage writes attempted
    storage_writes_total: Arc<AtomicU64>,

    /// Total number of storage writes that failed
    storage_errors_total: Arc<AtomicU64>,

    /// Total duration of all storage writes in milliseconds
    storage_duration_total_ms: Arc<AtomicU64>,

    /// Number of inputs rejected by validation
    validation_rejections_total: Arc<AtomicU64>,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    /// Create a new metrics collector.
    pub fn new() -> Self {
        Self {
            storage_writes_total: Arc::new(AtomicU64::new(0)),
            storage_errors_total: Arc::new(AtomicU64::new(0)),
            storage_duration_total_ms: Arc::new(AtomicU64::new(0)),
            validation_rejections_total: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Record a storage write with duration.
    pub fn record_storage_write(&self, duration: Duration) {
        self.storage_writes_total.fetch_add(1, Ordering::Relaxed);
        let millis = duration.as_millis() as u64;
        self.storage_duration_total_ms.fetch_add(millis, Ordering::Relaxed);
    }

    /// Record a failed storage write.
    pub fn record_storage_error(&self) {
        self.storage_errors_total.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an input rejected by validation.
    pub fn record_validation_rejection(&self) {
        self.validation_rejections_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn storage_writes_total(&self) -> u64 {
        self.storage_writes_total.load(Ordering::Relaxed)
    }

    pub fn storage_errors_total(&self) -> u64 {
        self.storage_errors_total.load(Ordering::Relaxed)
    }

    pub fn storage_duration_total_ms(&self) -> u64 {
        self.storage_duration_total_ms.load(Ordering::Relaxed)
    }

    /// Get average storage write duration in milliseconds.
    pub fn storage_duration_avg_ms(&self) -> f64 {
        let total = self.storage_duration_total_ms.load(Ordering::Relaxed);
        let count = self.storage_writes_total.load(Ordering::Relaxed);
        if count == 0 {
            0.0
        } else {
            total as f64 / count as f64
        }
    }

    pub fn validation_rejections_total(&self) -> u64 {
        self.validation_rejections_total.load(Ordering::Relaxed)
    }

    /// Get a summary of all metrics.
    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary {
            storage_writes_total: self.storage_writes_total(),
            storage_errors_total: self.storage_errors_total(),
            storage_duration_total_ms: self.storage_duration_total_ms(),
            storage_duration_avg_ms: self.storage_duration_avg_ms(),
            validation_rejections_total: self.validation_rejections_total(),
        }
    }
}

/// A snapshot of metrics values.
#[derive(Debug, Clone)]
pub struct MetricsSummary {
    pub storage_writes_total: u64,
    pub storage_errors_total: u64,
    pub storage_duration_total_ms: u64,
    pub storage_duration_avg_ms: f64,
    pub validation_rejections_total: u64,
}

/// Helper for timing one storage write.
pub struct StorageTimer {
    start: Instant,
    metrics: Metrics,
}

impl StorageTimer {
    /// Start timing a storage write.
    pub fn new(metrics: Metrics) -> Self {
        Self {
            start: Instant::now(),
            metrics,
        }
    }

    /// Complete the timing and record the duration.
    pub fn complete(self) {
        let duration = self.start.elapsed();
        self.metrics.record_storage_write(duration);
    }

    /// Complete the timing and record as an error.
    pub fn complete_with_error(self) {
        let duration = self.start.elapsed();
        self.metrics.record_storage_write(duration);
        self.metrics.record_storage_error();
    }
}
