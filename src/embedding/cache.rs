use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use super::{EmbeddingClient, EmbeddingClientError};

/// Memoizing wrapper around another embedding client.
///
/// Embedding is a pure function of the input text, so vectors are cached per distinct string and
/// only the misses of a batch are forwarded to the inner client.
pub struct CachedEmbeddingClient {
    inner: Box<dyn EmbeddingClient + Send + Sync>,
    cache: Mutex<HashMap<String, Vec<f32>>>,
}

impl CachedEmbeddingClient {
    /// Wrap `inner` with an empty cache.
    pub fn new(inner: Box<dyn EmbeddingClient + Send + Sync>) -> Self {
        Self {
            inner,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Number of distinct texts currently cached.
    pub fn cached_len(&self) -> usize {
        self.cache.lock().map(|cache| cache.len()).unwrap_or(0)
    }

    fn lookup(&self, texts: &[String]) -> Vec<Option<Vec<f32>>> {
        match self.cache.lock() {
            Ok(cache) => texts.iter().map(|text| cache.get(text).cloned()).collect(),
            Err(_) => vec![None; texts.len()],
        }
    }
}

#[async_trait]
impl EmbeddingClient for CachedEmbeddingClient {
    async fn generate_embeddings(
        &self,
        texts: Vec<String>,
    ) -> Result<Vec<Vec<f32>>, EmbeddingClientError> {
        let mut resolved = self.lookup(&texts);

        let mut misses: Vec<String> = Vec::new();
        for (text, slot) in texts.iter().zip(&resolved) {
            if slot.is_none() && !misses.contains(text) {
                misses.push(text.clone());
            }
        }

        if !misses.is_empty() {
            tracing::trace!(
                requested = texts.len(),
                misses = misses.len(),
                "Embedding cache miss"
            );
            let fresh = self.inner.generate_embeddings(misses.clone()).await?;
            if fresh.len() != misses.len() {
                return Err(EmbeddingClientError::InvalidResponse(format!(
                    "expected {} vectors, got {}",
                    misses.len(),
                    fresh.len()
                )));
            }
            let fresh: HashMap<String, Vec<f32>> = misses.into_iter().zip(fresh).collect();
            for (text, slot) in texts.iter().zip(resolved.iter_mut()) {
                if slot.is_none() {
                    *slot = fresh.get(text).cloned();
                }
            }
            if let Ok(mut cache) = self.cache.lock() {
                cache.extend(fresh);
            }
        }

        resolved
            .into_iter()
            .map(|vector| {
                vector.ok_or_else(|| {
                    EmbeddingClientError::InvalidResponse("missing cached vector".to_string())
                })
            })
            .collect()
    }
}
