use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters describing one digest run.
#[derive(Default)]
pub struct PipelineMetrics {
    documents_processed: AtomicU64,
    documents_skipped: AtomicU64,
    blocks_extracted: AtomicU64,
    blocks_ranked: AtomicU64,
}

impl PipelineMetrics {
    /// Create an empty metrics accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a segmented document and the number of blocks it produced.
    pub fn record_document(&self, block_count: u64) {
        self.documents_processed.fetch_add(1, Ordering::Relaxed);
        self.blocks_extracted
            .fetch_add(block_count, Ordering::Relaxed);
    }

    /// Record a document that could not be read.
    pub fn record_skipped(&self) {
        self.documents_skipped.fetch_add(1, Ordering::Relaxed);
    }

    /// Record the number of blocks that received a relevance score.
    pub fn record_ranked(&self, block_count: u64) {
        self.blocks_ranked.fetch_add(block_count, Ordering::Relaxed);
    }

    /// Return a snapshot of the current counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            documents_processed: self.documents_processed.load(Ordering::Relaxed),
            documents_skipped: self.documents_skipped.load(Ordering::Relaxed),
            blocks_extracted: self.blocks_extracted.load(Ordering::Relaxed),
            blocks_ranked: self.blocks_ranked.load(Ordering::Relaxed),
        }
    }
}

/// Immutable view of run counters used for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct MetricsSnapshot {
    /// Documents that were extracted and segmented.
    pub documents_processed: u64,
    /// Documents that were missing or failed extraction.
    pub documents_skipped: u64,
    /// Blocks produced by segmentation across all documents.
    pub blocks_extracted: u64,
    /// Blocks that were scored by the ranker.
    pub blocks_ranked: u64,
}
