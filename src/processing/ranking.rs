//! Relevance ranking of content blocks against a persona and task.

use crate::embedding::{EmbeddingClient, EmbeddingClientError, cosine_similarity, embed_one};

use super::boost::BoostTable;
use super::types::{ContentBlock, RankedBlock};

/// Query text scored against every block.
pub fn ranking_query(persona: &str, job: &str) -> String {
    format!("Persona: {persona}. Job to be done: {job}.")
}

/// Score every non-empty block and return them sorted by descending relevance.
///
/// The score is the cosine similarity between block content and the persona/task query, plus
/// the boost table adjustment for the block's title and document, clamped to `[0, 1]`. Blocks
/// whose content is blank are left out. Equal scores keep their input order.
pub async fn rank_blocks(
    client: &(dyn EmbeddingClient + Send + Sync),
    boosts: &BoostTable,
    blocks: &[ContentBlock],
    persona: &str,
    job: &str,
) -> Result<Vec<RankedBlock>, EmbeddingClientError> {
    let candidates: Vec<&ContentBlock> = blocks
        .iter()
        .filter(|block| !block.content.trim().is_empty())
        .collect();
    if candidates.is_empty() {
        return Ok(Vec::new());
    }

    let query = embed_one(client, &ranking_query(persona, job)).await?;
    let vectors = client
        .generate_embeddings(
            candidates
                .iter()
                .map(|block| block.content.clone())
                .collect(),
        )
        .await?;
    if vectors.len() != candidates.len() {
        return Err(EmbeddingClientError::InvalidResponse(format!(
            "expected {} vectors, got {}",
            candidates.len(),
            vectors.len()
        )));
    }

    let mut ranked: Vec<RankedBlock> = candidates
        .into_iter()
        .zip(vectors)
        .map(|(block, vector)| {
            let base = cosine_similarity(&query, &vector);
            let base = if base.is_finite() { base } else { 0.0 };
            let adjustment = boosts.adjustment(&block.section_title, &block.document);
            let score = (base + adjustment).clamp(0.0, 1.0);
            tracing::trace!(
                document = %block.document,
                page = block.page_number,
                title = %block.section_title,
                base,
                adjustment,
                score,
                "Scored block"
            );
            RankedBlock {
                score,
                block: block.clone(),
            }
        })
        .collect();

    // `sort_by` is stable, so ties keep input order.
    ranked.sort_by(|left, right| right.score.total_cmp(&left.score));
    Ok(ranked)
}
