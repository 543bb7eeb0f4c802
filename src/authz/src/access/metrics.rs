//! Counters for access resolution

use std::sync::atomic::{AtomicU64, Ordering};

/// Snapshot of resolver activity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AccessMetrics {
    /// Total number of resolved checks
    pub total_checks: u64,

    /// Checks that resolved to granted
    pub granted: u64,

    /// Checks that resolved to denied
    pub denied: u64,

    /// Queries refused because a wildcard was used as an argument
    pub invalid_queries: u64,
}

impl AccessMetrics {
    /// Fraction of checks that were granted
    pub fn grant_rate(&self) -> f64 {
        if self.total_checks == 0 {
            0.0
        } else {
            self.granted as f64 / self.total_checks as f64
        }
    }
}

/// Lock-free collector shared by readers of an access control instance
#[derive(Debug, Default)]
pub struct MetricsCollector {
    granted: AtomicU64,
    denied: AtomicU64,
    invalid_queries: AtomicU64,
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the outcome of one check
    pub fn record(&self, granted: bool) {
        let counter = if granted { &self.granted } else { &self.denied };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_invalid_query(&self) {
        self.invalid_queries.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> AccessMetrics {
        let granted = self.granted.load(Ordering::Relaxed);
        let denied = self.denied.load(Ordering::Relaxed);
        AccessMetrics {
            total_checks: granted + denied,
            granted,
            denied,
            invalid_queries: self.invalid_queries.load(Ordering::Relaxed),
        }
    }

    pub fn reset(&self) {
        self.granted.store(0, Ordering::Relaxed);
        self.denied.store(0, Ordering::Relaxed);
        self.invalid_queries.store(0, Ordering::Relaxed);
    }
}
