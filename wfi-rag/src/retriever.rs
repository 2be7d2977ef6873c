//! Retrieval pipeline orchestrator.
//!
//! The [`Retriever`] coordinates the document-to-answer flow by composing an
//! [`EmbeddingProvider`], a [`VectorStore`], and a [`Chunker`]: at ingestion
//! time chunk → embed → upsert, at query time embed → search.
//!
//! # Example
//!
//! ```rust,ignore
//! use wfi_rag::{Retriever, RagConfig, InMemoryIndex, FixedSizeChunker};
//!
//! let retriever = Retriever::builder()
//!     .config(RagConfig::default())
//!     .embedder(Arc::new(my_embedder))
//!     .store(Arc::new(InMemoryIndex::default()))
//!     .chunker(Arc::new(FixedSizeChunker::new(512, 100)?))
//!     .build()?;
//!
//! retriever.index(&document).await?;
//! let results = retriever.retrieve("remote work eligibility", 3).await?;
//! ```

use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info};
use wfi_core::retry::{self, RetryPolicy};

use crate::chunking::Chunker;
use crate::config::RagConfig;
use crate::document::{Chunk, Document, SearchResult};
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::vectorstore::VectorStore;

/// The retrieval pipeline orchestrator.
///
/// Holds its collaborators behind `Arc<dyn Trait>` so external services can
/// be swapped for in-memory fakes. Construct one via
/// [`Retriever::builder()`].
pub struct Retriever {
    config: RagConfig,
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn VectorStore>,
    chunker: Arc<dyn Chunker>,
}

impl Retriever {
    /// Create a new [`RetrieverBuilder`].
    pub fn builder() -> RetrieverBuilder {
        RetrieverBuilder::default()
    }

    /// Return a reference to the pipeline configuration.
    pub fn config(&self) -> &RagConfig {
        &self.config
    }

    /// Return a reference to the vector store.
    pub fn store(&self) -> &Arc<dyn VectorStore> {
        &self.store
    }

    fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.config.embed_retries,
            base_delay: Duration::from_millis(250),
        }
    }

    /// Ingest a single document: chunk → embed → upsert.
    ///
    /// Chunk ids are stable across re-ingestion, so indexing a changed
    /// document replaces its previous entries by key. Returns the chunks
    /// that were stored, with embeddings attached.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Embedding`] or [`RagError::IndexUnavailable`]
    /// after bounded retries if the embedding service or the store stays
    /// unavailable.
    pub async fn index(&self, document: &Document) -> Result<Vec<Chunk>> {
        let mut chunks = self.chunker.chunk(document);
        if chunks.is_empty() {
            info!(document.id = %document.id, chunk_count = 0, "indexed document (empty)");
            return Ok(chunks);
        }

        let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();

        let embeddings = retry::with_backoff(self.retry_policy(), RagError::is_retryable, || {
            self.embedder.embed_batch(&texts)
        })
        .await
        .map_err(|e| {
            error!(document.id = %document.id, error = %e, "embedding failed during indexing");
            e
        })?;

        let expected = self.embedder.dimensions();
        for (chunk, embedding) in chunks.iter_mut().zip(embeddings) {
            if embedding.len() != expected {
                return Err(RagError::Embedding {
                    provider: "unknown".into(),
                    message: format!(
                        "provider returned {}-dimensional vector, expected {expected}",
                        embedding.len()
                    ),
                });
            }
            chunk.embedding = embedding;
        }

        retry::with_backoff(self.retry_policy(), RagError::is_retryable, || {
            self.store.upsert(&chunks)
        })
        .await
        .map_err(|e| {
            error!(document.id = %document.id, error = %e, "upsert failed during indexing");
            e
        })?;

        info!(document.id = %document.id, chunk_count = chunks.len(), "indexed document");
        Ok(chunks)
    }

    /// Ingest multiple documents, stopping at the first failure.
    pub async fn index_batch(&self, documents: &[Document]) -> Result<Vec<Chunk>> {
        let mut all_chunks = Vec::new();
        for document in documents {
            all_chunks.extend(self.index(document).await?);
        }
        Ok(all_chunks)
    }

    /// Retrieve the `k` most relevant chunks for a query.
    ///
    /// Results are ordered by non-increasing score. An empty store yields
    /// an empty `Vec`, not an error; `k` larger than the store returns
    /// everything.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::InvalidArgument`] if `k == 0`, or
    /// [`RagError::Embedding`] / [`RagError::IndexUnavailable`] after
    /// bounded retries if the query cannot be embedded or the store
    /// cannot be searched.
    pub async fn retrieve(&self, query: &str, k: usize) -> Result<Vec<SearchResult>> {
        if k == 0 {
            return Err(RagError::InvalidArgument("k must be greater than zero".to_string()));
        }

        let query_embedding =
            retry::with_backoff(self.retry_policy(), RagError::is_retryable, || {
                self.embedder.embed(query)
            })
            .await
            .map_err(|e| {
                error!(error = %e, "embedding failed during retrieval");
                e
            })?;

        let results = retry::with_backoff(self.retry_policy(), RagError::is_retryable, || {
            self.store.search(&query_embedding, k)
        })
        .await
        .map_err(|e| {
            error!(error = %e, "vector store search failed");
            e
        })?;

        info!(result_count = results.len(), k, "retrieval completed");
        Ok(results)
    }

    /// Retrieve using the configured default `top_k`.
    pub async fn retrieve_default(&self, query: &str) -> Result<Vec<SearchResult>> {
        self.retrieve(query, self.config.top_k).await
    }
}

/// Builder for constructing a [`Retriever`].
///
/// All fields are required. Call [`build()`](RetrieverBuilder::build) to
/// validate and produce the retriever.
#[derive(Default)]
pub struct RetrieverBuilder {
    config: Option<RagConfig>,
    embedder: Option<Arc<dyn EmbeddingProvider>>,
    store: Option<Arc<dyn VectorStore>>,
    chunker: Option<Arc<dyn Chunker>>,
}

impl RetrieverBuilder {
    /// Set the pipeline configuration.
    pub fn config(mut self, config: RagConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the embedding provider.
    pub fn embedder(mut self, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    /// Set the vector store backend.
    pub fn store(mut self, store: Arc<dyn VectorStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Set the document chunker.
    pub fn chunker(mut self, chunker: Arc<dyn Chunker>) -> Self {
        self.chunker = Some(chunker);
        self
    }

    /// Build the [`Retriever`], validating that all required fields are set.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Config`] if any required field is missing.
    pub fn build(self) -> Result<Retriever> {
        let config =
            self.config.ok_or_else(|| RagError::Config("config is required".to_string()))?;
        let embedder =
            self.embedder.ok_or_else(|| RagError::Config("embedder is required".to_string()))?;
        let store = self.store.ok_or_else(|| RagError::Config("store is required".to_string()))?;
        let chunker =
            self.chunker.ok_or_else(|| RagError::Config("chunker is required".to_string()))?;

        Ok(Retriever { config, embedder, store, chunker })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::chunking::FixedSizeChunker;
    use crate::inmemory::InMemoryIndex;

    /// Deterministic embedder: a 4-dim vector derived from character counts.
    struct FakeEmbedder;

    #[async_trait]
    impl EmbeddingProvider for FakeEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            let mut v = [0.0f32; 4];
            for (i, c) in text.chars().enumerate() {
                v[i % 4] += (c as u32 % 17) as f32;
            }
            Ok(v.to_vec())
        }

        fn dimensions(&self) -> usize {
            4
        }
    }

    /// Fails with a retryable error a fixed number of times, then succeeds.
    struct FlakyEmbedder {
        failures: AtomicU32,
    }

    #[async_trait]
    impl EmbeddingProvider for FlakyEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            if self.failures.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| {
                (n > 0).then(|| n - 1)
            }).is_ok()
            {
                return Err(RagError::Embedding {
                    provider: "flaky".into(),
                    message: "connection reset".into(),
                });
            }
            Ok(vec![1.0, 0.0, 0.0, 0.0])
        }

        fn dimensions(&self) -> usize {
            4
        }
    }

    /// Fails a fixed number of calls with `IndexUnavailable`, then
    /// delegates to an in-memory index.
    struct FlakyStore {
        failures: AtomicU32,
        inner: InMemoryIndex,
    }

    impl FlakyStore {
        fn new(failures: u32) -> Self {
            Self { failures: AtomicU32::new(failures), inner: InMemoryIndex::default() }
        }

        fn trip(&self) -> Result<()> {
            if self
                .failures
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| (n > 0).then(|| n - 1))
                .is_ok()
            {
                return Err(RagError::IndexUnavailable {
                    backend: "flaky".into(),
                    message: "connection refused".into(),
                });
            }
            Ok(())
        }
    }

    #[async_trait]
    impl VectorStore for FlakyStore {
        async fn upsert(&self, chunks: &[Chunk]) -> Result<()> {
            self.trip()?;
            self.inner.upsert(chunks).await
        }

        async fn delete(&self, ids: &[&str]) -> Result<()> {
            self.inner.delete(ids).await
        }

        async fn search(&self, embedding: &[f32], k: usize) -> Result<Vec<SearchResult>> {
            self.trip()?;
            self.inner.search(embedding, k).await
        }

        async fn count(&self) -> Result<usize> {
            self.inner.count().await
        }
    }

    fn retriever_with(embedder: Arc<dyn EmbeddingProvider>) -> Retriever {
        retriever_over(embedder, Arc::new(InMemoryIndex::default()))
    }

    fn retriever_over(
        embedder: Arc<dyn EmbeddingProvider>,
        store: Arc<dyn VectorStore>,
    ) -> Retriever {
        Retriever::builder()
            .config(RagConfig::default())
            .embedder(embedder)
            .store(store)
            .chunker(Arc::new(FixedSizeChunker::new(64, 16).unwrap()))
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn zero_k_is_an_invalid_argument() {
        let retriever = retriever_with(Arc::new(FakeEmbedder));
        let err = retriever.retrieve("anything", 0).await;
        assert!(matches!(err, Err(RagError::InvalidArgument(_))));
    }

    #[tokio::test]
    async fn empty_store_returns_empty_results() {
        let retriever = retriever_with(Arc::new(FakeEmbedder));
        let results = retriever.retrieve("x", 5).await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn index_then_retrieve_orders_by_score() {
        let retriever = retriever_with(Arc::new(FakeEmbedder));
        retriever.index(&Document::new("remote", "remote work policy text")).await.unwrap();
        retriever.index(&Document::new("promo", "promotion criteria text")).await.unwrap();

        let results = retriever.retrieve("remote work policy text", 10).await.unwrap();
        assert!(!results.is_empty());
        for pair in results.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
        assert_eq!(results[0].chunk.document_id, "remote");
    }

    #[tokio::test]
    async fn transient_embedding_failures_are_retried() {
        let retriever = retriever_with(Arc::new(FlakyEmbedder { failures: AtomicU32::new(2) }));
        // Default policy allows 3 attempts; 2 failures then success.
        let results = retriever.retrieve("q", 1).await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn persistent_embedding_failure_surfaces_after_retries() {
        let retriever = retriever_with(Arc::new(FlakyEmbedder { failures: AtomicU32::new(10) }));
        let err = retriever.retrieve("q", 1).await;
        assert!(matches!(err, Err(RagError::Embedding { .. })));
    }

    #[tokio::test]
    async fn transient_store_failures_are_retried() {
        let store = Arc::new(FlakyStore::new(1));
        let retriever = retriever_over(Arc::new(FakeEmbedder), store.clone());

        // One upsert failure, then success on retry.
        retriever.index(&Document::new("doc", "remote work policy text")).await.unwrap();
        assert_eq!(store.count().await.unwrap(), 1);

        // One search failure, then success on retry.
        store.failures.store(1, Ordering::SeqCst);
        let results = retriever.retrieve("remote work policy text", 1).await.unwrap();
        assert_eq!(results[0].chunk.document_id, "doc");
    }

    #[tokio::test]
    async fn persistent_store_failure_surfaces_after_retries() {
        let retriever =
            retriever_over(Arc::new(FakeEmbedder), Arc::new(FlakyStore::new(10)));
        let err = retriever.retrieve("q", 1).await;
        assert!(matches!(err, Err(RagError::IndexUnavailable { .. })));
    }

    #[tokio::test]
    async fn reindexing_replaces_chunks_by_stable_key() {
        let retriever = retriever_with(Arc::new(FakeEmbedder));
        retriever.index(&Document::new("doc", "old policy wording")).await.unwrap();
        retriever.index(&Document::new("doc", "new policy wording")).await.unwrap();

        assert_eq!(retriever.store().count().await.unwrap(), 1);
        let results = retriever.retrieve("new policy wording", 1).await.unwrap();
        assert_eq!(results[0].chunk.text, "new policy wording");
    }
}
