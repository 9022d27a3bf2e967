//! Digest service coordinating extraction, segmentation, ranking, and summarization.

use std::path::PathBuf;
use std::sync::Arc;

use crate::{
    config::Config,
    embedding::{EmbeddingClient, embed_one},
    extraction::{DocumentExtractor, ExtractionError, PdfExtractor, document_id},
    metrics::{MetricsSnapshot, PipelineMetrics},
    processing::{
        boost::BoostTable,
        ranking::rank_blocks,
        segmentation::segment_document,
        summarize::{summarize, summary_query},
        types::{ContentBlock, PipelineError},
    },
    report::{
        DigestReport, ExtractedSection, ReportMetadata, SubSectionAnalysis, current_timestamp,
    },
};

/// Inputs for one digest run.
#[derive(Debug, Clone)]
pub struct RunRequest {
    /// Directory the document names are resolved against.
    pub input_dir: PathBuf,
    /// Persona description.
    pub persona: String,
    /// Task description.
    pub job: String,
    /// Document file names, in processing order.
    pub documents: Vec<String>,
}

/// Runs the full pipeline over a document collection.
///
/// The service owns the embedding client, the extractor, and the boost table, so tests can
/// substitute any of them. Construct it once and reuse it across runs; the embedding cache is
/// shared between runs of the same service.
pub struct DigestService {
    embedding_client: Box<dyn EmbeddingClient + Send + Sync>,
    extractor: Box<dyn DocumentExtractor + Send + Sync>,
    boosts: BoostTable,
    top_sections: usize,
    summary_sentences: usize,
    metrics: Arc<PipelineMetrics>,
}

impl DigestService {
    /// Build a service with explicit collaborators and default output limits.
    pub fn new(
        embedding_client: Box<dyn EmbeddingClient + Send + Sync>,
        extractor: Box<dyn DocumentExtractor + Send + Sync>,
        boosts: BoostTable,
    ) -> Self {
        let defaults = Config::default();
        Self {
            embedding_client,
            extractor,
            boosts,
            top_sections: defaults.top_sections,
            summary_sentences: defaults.summary_sentences,
            metrics: Arc::new(PipelineMetrics::new()),
        }
    }

    /// Build a PDF-reading service using the limits from `config`.
    pub fn from_config(
        config: &Config,
        embedding_client: Box<dyn EmbeddingClient + Send + Sync>,
        boosts: BoostTable,
    ) -> Self {
        Self::new(embedding_client, Box::new(PdfExtractor::new()), boosts)
            .with_limits(config.top_sections, config.summary_sentences)
    }

    /// Override how many sections are reported and how long each summary may be.
    pub fn with_limits(mut self, top_sections: usize, summary_sentences: usize) -> Self {
        self.top_sections = top_sections;
        self.summary_sentences = summary_sentences;
        self
    }

    /// Shared handle to the run counters.
    pub fn metrics(&self) -> Arc<PipelineMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Current counter values.
    pub fn metrics_snapshot(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Extract and segment every requested document, skipping any that cannot be read.
    pub fn collect_blocks(&self, request: &RunRequest) -> Vec<ContentBlock> {
        let mut blocks = Vec::new();
        for name in &request.documents {
            let path = request.input_dir.join(name);
            let pages = match self.extractor.extract_pages(&path) {
                Ok(pages) => pages,
                Err(ExtractionError::Io { source, .. })
                    if source.kind() == std::io::ErrorKind::NotFound =>
                {
                    tracing::warn!(path = %path.display(), "Document not found; skipping");
                    self.metrics.record_skipped();
                    continue;
                }
                Err(err) => {
                    tracing::warn!(error = %err, "Document extraction failed; skipping");
                    self.metrics.record_skipped();
                    continue;
                }
            };

            let document = document_id(&path);
            let segmented = segment_document(&document, &pages);
            tracing::info!(
                document = %document,
                pages = pages.len(),
                blocks = segmented.len(),
                "Document segmented"
            );
            self.metrics.record_document(segmented.len() as u64);
            blocks.extend(segmented);
        }
        blocks
    }

    /// Run the pipeline and assemble the report.
    ///
    /// Every reported section gets one summary entry, which may be empty when no sentence is
    /// long enough. Embedding failures abort the run. A collection that yields no blocks still
    /// produces a report, with empty section lists.
    pub async fn run(&self, request: &RunRequest) -> Result<DigestReport, PipelineError> {
        tracing::info!(
            documents = request.documents.len(),
            persona = %request.persona,
            "Starting digest run"
        );
        let blocks = self.collect_blocks(request);

        let mut ranked = rank_blocks(
            self.embedding_client.as_ref(),
            &self.boosts,
            &blocks,
            &request.persona,
            &request.job,
        )
        .await?;
        self.metrics.record_ranked(ranked.len() as u64);
        ranked.truncate(self.top_sections);

        let extracted_sections: Vec<ExtractedSection> = ranked
            .iter()
            .enumerate()
            .map(|(index, ranked)| ExtractedSection {
                document: ranked.block.document.clone(),
                section_title: ranked.block.section_title.clone(),
                importance_rank: index + 1,
                page_number: ranked.block.page_number,
            })
            .collect();

        let mut sub_section_analysis = Vec::with_capacity(ranked.len());
        if !ranked.is_empty() {
            let query = embed_one(
                self.embedding_client.as_ref(),
                &summary_query(&request.persona, &request.job),
            )
            .await?;
            for entry in &ranked {
                let refined_text = summarize(
                    self.embedding_client.as_ref(),
                    &entry.block.content,
                    self.summary_sentences,
                    Some(&query),
                )
                .await?;
                if refined_text.is_empty() {
                    tracing::debug!(
                        document = %entry.block.document,
                        title = %entry.block.section_title,
                        "No sentence survived summarization"
                    );
                }
                sub_section_analysis.push(SubSectionAnalysis {
                    document: entry.block.document.clone(),
                    refined_text,
                    page_number: entry.block.page_number,
                });
            }
        }
        sub_section_analysis.sort_by(|left, right| {
            (&left.document, left.page_number).cmp(&(&right.document, right.page_number))
        });

        let snapshot = self.metrics.snapshot();
        tracing::info!(
            sections = extracted_sections.len(),
            summaries = sub_section_analysis.len(),
            documents_processed = snapshot.documents_processed,
            documents_skipped = snapshot.documents_skipped,
            blocks_extracted = snapshot.blocks_extracted,
            blocks_ranked = snapshot.blocks_ranked,
            "Digest run complete"
        );

        Ok(DigestReport {
            metadata: ReportMetadata {
                input_documents: request.documents.clone(),
                persona: request.persona.clone(),
                job_to_be_done: request.job.clone(),
                processing_timestamp: current_timestamp(),
            },
            extracted_sections,
            sub_section_analysis,
        })
    }
}
