//! In-process download counters, reported on `/health` and in debug logs

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Metrics handle shared by all requests
#[derive(Debug, Default)]
pub struct Metrics {
    downloads_started: AtomicU64,
    downloads_succeeded: AtomicU64,
    downloads_failed: AtomicU64,
    requests_rejected: AtomicU64,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn download_started(&self) {
        self.downloads_started.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "downloads_started", "Metric incremented");
    }

    pub fn download_succeeded(&self) {
        self.downloads_succeeded.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "downloads_succeeded", "Metric incremented");
    }

    pub fn download_failed(&self) {
        self.downloads_failed.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "downloads_failed", "Metric incremented");
    }

    /// Request refused before any download work started
    pub fn request_rejected(&self) {
        self.requests_rejected.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "requests_rejected", "Metric incremented");
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            downloads_started: self.downloads_started.load(Ordering::Relaxed),
            downloads_succeeded: self.downloads_succeeded.load(Ordering::Relaxed),
            downloads_failed: self.downloads_failed.load(Ordering::Relaxed),
            requests_rejected: self.requests_rejected.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub downloads_started: u64,
    pub downloads_succeeded: u64,
    pub downloads_failed: u64,
    pub requests_rejected: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_accumulate() {
        let metrics = Metrics::new();
        metrics.download_started();
        metrics.download_started();
        metrics.download_succeeded();
        metrics.download_failed();
        metrics.request_rejected();

        assert_eq!(
            metrics.snapshot(),
            MetricsSnapshot {
                downloads_started: 2,
                downloads_succeeded: 1,
                downloads_failed: 1,
                requests_rejected: 1,
            }
        );
    }
}
