use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::info;

/// Process-wide ingestion counters. Clones share the same counters.
#[derive(Clone, Default)]
pub struct Metrics {
    inner: Arc<MetricsInner>,
}

#[derive(Default)]
struct MetricsInner {
    documents_processed: AtomicU64,
    documents_failed: AtomicU64,
    chunks_created: AtomicU64,
}

/// Point-in-time copy of the counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MetricsSnapshot {
    pub documents_processed: u64,
    pub documents_failed: u64,
    pub chunks_created: u64,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment_documents_processed(&self) {
        self.inner.documents_processed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_documents_failed(&self) {
        self.inner.documents_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_chunks_created(&self, count: u64) {
        self.inner.chunks_created.fetch_add(count, Ordering::Relaxed);
    }

    pub fn get_documents_processed(&self) -> u64 {
        self.inner.documents_processed.load(Ordering::Relaxed)
    }

    pub fn get_documents_failed(&self) -> u64 {
        self.inner.documents_failed.load(Ordering::Relaxed)
    }

    pub fn get_chunks_created(&self) -> u64 {
        self.inner.chunks_created.load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            documents_processed: self.get_documents_processed(),
            documents_failed: self.get_documents_failed(),
            chunks_created: self.get_chunks_created(),
        }
    }

    pub fn log_summary(&self) {
        let snapshot = self.snapshot();
        info!(
            documents_processed = snapshot.documents_processed,
            documents_failed = snapshot.documents_failed,
            chunks_created = snapshot.chunks_created,
            "📊 Ingestion metrics"
        );
    }
}
