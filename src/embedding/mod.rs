//! Embedding client abstraction and adapters.
//!
//! Every ranking and summarization step scores text through an [`EmbeddingClient`]. The client
//! is built once per process by [`load_embedding_client`], which also issues a warm-up request so
//! that an unreachable model fails the run before any document is read.

mod cache;
mod ollama;

use crate::config::{Config, EmbeddingProvider};
use async_trait::async_trait;
use thiserror::Error;

pub use cache::CachedEmbeddingClient;
pub use ollama::OllamaEmbeddingClient;

/// Errors raised by embedding providers.
#[derive(Debug, Error)]
pub enum EmbeddingClientError {
    /// Provider was unable to produce embeddings for the supplied input.
    #[error("Failed to generate embeddings: {0}")]
    GenerationFailed(String),
    /// Provider could not be reached.
    #[error("Embedding provider unavailable: {0}")]
    ProviderUnavailable(String),
    /// Provider response could not be parsed or did not match the request.
    #[error("Malformed provider response: {0}")]
    InvalidResponse(String),
}

/// Interface implemented by embedding backends.
#[async_trait]
pub trait EmbeddingClient {
    /// Produce an embedding vector for each supplied text, in input order.
    async fn generate_embeddings(
        &self,
        texts: Vec<String>,
    ) -> Result<Vec<Vec<f32>>, EmbeddingClientError>;
}

/// Embed a single text.
pub async fn embed_one(
    client: &(dyn EmbeddingClient + Send + Sync),
    text: &str,
) -> Result<Vec<f32>, EmbeddingClientError> {
    client
        .generate_embeddings(vec![text.to_string()])
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| {
            EmbeddingClientError::InvalidResponse("provider returned no vectors".to_string())
        })
}

/// Cosine similarity between two vectors.
///
/// Returns `0.0` when either vector has zero norm or the lengths differ.
pub fn cosine_similarity(left: &[f32], right: &[f32]) -> f32 {
    if left.len() != right.len() || left.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0_f32;
    let mut left_norm = 0.0_f32;
    let mut right_norm = 0.0_f32;
    for (a, b) in left.iter().zip(right) {
        dot += a * b;
        left_norm += a * a;
        right_norm += b * b;
    }

    if left_norm == 0.0 || right_norm == 0.0 {
        return 0.0;
    }
    dot / (left_norm.sqrt() * right_norm.sqrt())
}

/// Deterministic offline embedding client.
///
/// Lowercased word tokens are hashed into a fixed number of buckets and the resulting count
/// vector is L2-normalized. Texts sharing vocabulary therefore score a positive cosine, which is
/// enough to drive the pipeline without a model download.
pub struct HashedEmbeddingClient {
    dimension: usize,
}

impl HashedEmbeddingClient {
    /// Construct a client producing vectors of `dimension` entries.
    pub const fn new(dimension: usize) -> Self {
        Self { dimension }
    }

    fn encode(text: &str, dimension: usize) -> Vec<f32> {
        let mut embedding = vec![0.0_f32; dimension];

        let tokens = text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|token| !token.is_empty());
        for token in tokens {
            let slot = (fnv1a(&token.to_lowercase()) % dimension as u64) as usize;
            embedding[slot] += 1.0;
        }

        let norm = embedding
            .iter()
            .map(|value| value * value)
            .sum::<f32>()
            .sqrt();

        if norm > 0.0 {
            for value in &mut embedding {
                *value /= norm;
            }
        }

        embedding
    }
}

fn fnv1a(token: &str) -> u64 {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;
    token.bytes().fold(OFFSET, |hash, byte| {
        (hash ^ u64::from(byte)).wrapping_mul(PRIME)
    })
}

#[async_trait]
impl EmbeddingClient for HashedEmbeddingClient {
    async fn generate_embeddings(
        &self,
        texts: Vec<String>,
    ) -> Result<Vec<Vec<f32>>, EmbeddingClientError> {
        if self.dimension == 0 {
            return Err(EmbeddingClientError::GenerationFailed(
                "embedding dimension must be greater than zero".to_string(),
            ));
        }

        Ok(texts
            .iter()
            .map(|text| Self::encode(text, self.dimension))
            .collect())
    }
}

/// Build the embedding client for the current configuration and verify it can serve requests.
///
/// The returned client memoizes vectors per distinct input for the lifetime of the process.
/// Any failure here is fatal: no stage of the pipeline runs without embeddings.
pub async fn load_embedding_client(
    config: &Config,
) -> Result<Box<dyn EmbeddingClient + Send + Sync>, EmbeddingClientError> {
    tracing::info!(
        provider = ?config.embedding_provider,
        model = %config.embedding_model,
        "Loading embedding model"
    );
    let backend: Box<dyn EmbeddingClient + Send + Sync> = match config.embedding_provider {
        EmbeddingProvider::Hashed => Box::new(HashedEmbeddingClient::new(config.embedding_dimension)),
        EmbeddingProvider::Ollama => Box::new(OllamaEmbeddingClient::new(
            config.ollama_url.clone(),
            config.embedding_model.clone(),
        )?),
    };
    let client = CachedEmbeddingClient::new(backend);

    let probe = embed_one(&client, "persona digest warm-up").await?;
    tracing::info!(dimension = probe.len(), "Embedding model ready");

    Ok(Box::new(client))
}
