//! Embedding provider trait and the text-hash caching layer.

use std::collections::HashMap;
use std::hash::{DefaultHasher, Hash, Hasher};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::Result;

/// A provider that generates vector embeddings from text input.
///
/// Implementations wrap specific embedding backends behind a unified async
/// interface. The default [`embed_batch`](EmbeddingProvider::embed_batch)
/// implementation calls [`embed`](EmbeddingProvider::embed) sequentially;
/// backends that support native batching should override it.
///
/// The dimensionality reported by [`dimensions`](EmbeddingProvider::dimensions)
/// is constant for a given provider; every vector it returns has that length.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Generate an embedding vector for a single text input.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate embedding vectors for a batch of text inputs.
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let mut results = Vec::with_capacity(texts.len());
        for text in texts {
            results.push(self.embed(text).await?);
        }
        Ok(results)
    }

    /// Return the dimensionality of embeddings produced by this provider.
    fn dimensions(&self) -> usize;
}

/// A caching layer over another [`EmbeddingProvider`].
///
/// Caching is an explicit policy, not something providers do implicitly:
/// entries are keyed by a hash of the input text and never evicted, which
/// is fine at the scale of a policy-document corpus.
pub struct CachedEmbedder<P> {
    inner: P,
    cache: RwLock<HashMap<u64, Vec<f32>>>,
}

impl<P: EmbeddingProvider> CachedEmbedder<P> {
    /// Wrap a provider with an empty cache.
    pub fn new(inner: P) -> Self {
        Self { inner, cache: RwLock::new(HashMap::new()) }
    }

    fn key(text: &str) -> u64 {
        let mut hasher = DefaultHasher::new();
        text.hash(&mut hasher);
        hasher.finish()
    }
}

#[async_trait]
impl<P: EmbeddingProvider> EmbeddingProvider for CachedEmbedder<P> {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let key = Self::key(text);
        if let Some(hit) = self.cache.read().await.get(&key) {
            debug!(key, "embedding cache hit");
            return Ok(hit.clone());
        }

        let embedding = self.inner.embed(text).await?;
        self.cache.write().await.insert(key, embedding.clone());
        Ok(embedding)
    }

    fn dimensions(&self) -> usize {
        self.inner.dimensions()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    struct CountingEmbedder {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl EmbeddingProvider for CountingEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![text.len() as f32, 1.0])
        }

        fn dimensions(&self) -> usize {
            2
        }
    }

    #[tokio::test]
    async fn cache_avoids_repeat_calls() {
        let cached = CachedEmbedder::new(CountingEmbedder { calls: AtomicUsize::new(0) });

        let a = cached.embed("remote work").await.unwrap();
        let b = cached.embed("remote work").await.unwrap();
        let c = cached.embed("promotions").await.unwrap();

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(cached.inner.calls.load(Ordering::SeqCst), 2);
    }
}
