//! Observability stubs (metrics, tracing)

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Metrics handle for recording resolution counters
#[derive(Debug, Default)]
pub struct Metrics {
    cache_hits: AtomicU64,
    local_resolutions: AtomicU64,
    remote_resolutions: AtomicU64,
    remote_failures: AtomicU64,
    breaker_rejections: AtomicU64,
    probes_dropped: AtomicU64,
    last_resort_fallbacks: AtomicU64,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn local_resolution(&self) {
        self.local_resolutions.fetch_add(1, Ordering::Relaxed);
    }

    pub fn remote_resolution(&self) {
        self.remote_resolutions.fetch_add(1, Ordering::Relaxed);
    }

    pub fn remote_failure(&self) {
        self.remote_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn breaker_rejection(&self) {
        self.breaker_rejections.fetch_add(1, Ordering::Relaxed);
    }

    pub fn probes_dropped(&self, count: u64) {
        self.probes_dropped.fetch_add(count, Ordering::Relaxed);
    }

    pub fn last_resort_fallback(&self) {
        self.last_resort_fallbacks.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            local_resolutions: self.local_resolutions.load(Ordering::Relaxed),
            remote_resolutions: self.remote_resolutions.load(Ordering::Relaxed),
            remote_failures: self.remote_failures.load(Ordering::Relaxed),
            breaker_rejections: self.breaker_rejections.load(Ordering::Relaxed),
            probes_dropped: self.probes_dropped.load(Ordering::Relaxed),
            last_resort_fallbacks: self.last_resort_fallbacks.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub cache_hits: u64,
    pub local_resolutions: u64,
    pub remote_resolutions: u64,
    pub remote_failures: u64,
    pub breaker_rejections: u64,
    pub probes_dropped: u64,
    pub last_resort_fallbacks: u64,
}
