//! Core data types and error definitions for the digest pipeline.

use serde::Serialize;
use thiserror::Error;

use crate::embedding::EmbeddingClientError;

/// A titled, page-anchored unit of extracted document content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContentBlock {
    /// Identifier of the source document (its file name).
    pub document: String,
    /// 1-based page on which the block's heading or first content appears.
    pub page_number: usize,
    /// Normalized, non-empty section title.
    pub section_title: String,
    /// Normalized full text of the block.
    pub content: String,
}

impl ContentBlock {
    /// Title used when a block has no usable heading.
    pub fn fallback_title(page_number: usize) -> String {
        format!("Content from Page {page_number}")
    }
}

/// A block paired with its relevance score in `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedBlock {
    /// Final boosted and clamped relevance score.
    pub score: f32,
    /// The scored block.
    pub block: ContentBlock,
}

/// Errors emitted by the digest pipeline.
///
/// Per-document extraction failures are not represented here: they are logged and skipped.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Embedding provider failed to produce vectors; the run cannot continue.
    #[error("Failed to generate embeddings: {0}")]
    Embedding(#[from] EmbeddingClientError),
    /// Report could not be written.
    #[error("Failed to write report: {0}")]
    Io(#[from] std::io::Error),
    /// Report could not be serialized.
    #[error("Failed to serialize report: {0}")]
    Serialization(#[from] serde_json::Error),
}
