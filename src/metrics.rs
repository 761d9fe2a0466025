use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters describing proxy activity.
#[derive(Default)]
pub struct ProxyMetrics {
    searches_proxied: AtomicU64,
    details_served: AtomicU64,
    entries_cleaned: AtomicU64,
    audio_generated: AtomicU64,
}

impl ProxyMetrics {
    /// Create an empty metrics accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a completed search proxy round-trip.
    pub fn record_search(&self) {
        self.searches_proxied.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a detail lookup served from the upstream.
    pub fn record_detail(&self) {
        self.details_served.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an entry flattened into clean text.
    pub fn record_clean_text(&self) {
        self.entries_cleaned.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a generated and persisted audio artifact.
    pub fn record_audio(&self) {
        self.audio_generated.fetch_add(1, Ordering::Relaxed);
    }

    /// Return a snapshot of the current counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            searches_proxied: self.searches_proxied.load(Ordering::Relaxed),
            details_served: self.details_served.load(Ordering::Relaxed),
            entries_cleaned: self.entries_cleaned.load(Ordering::Relaxed),
            audio_generated: self.audio_generated.load(Ordering::Relaxed),
        }
    }
}

/// Immutable view of proxy counters used for reporting.
#[derive(Debug, Clone, Copy, serde::Serialize)]
pub struct MetricsSnapshot {
    /// Number of search requests proxied since startup.
    pub searches_proxied: u64,
    /// Number of entry detail lookups served since startup.
    pub details_served: u64,
    /// Number of entries flattened into clean text since startup.
    pub entries_cleaned: u64,
    /// Number of audio artifacts generated since startup.
    pub audio_generated: u64,
}
