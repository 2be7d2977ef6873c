//! In-memory vector index.
//!
//! [`InMemoryIndex`] keeps entries in a `HashMap` behind a
//! `tokio::sync::RwLock`. A whole upsert batch is applied under one write
//! lock, so concurrent readers see either the old entries or the new ones,
//! never a torn write. Suitable for development, tests, and a corpus the
//! size of an HR policy library.

use std::collections::{HashMap, hash_map};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::document::{Chunk, SearchResult};
use crate::error::Result;
use crate::vectorstore::{Similarity, VectorStore};

struct Entry {
    /// Insertion sequence, used to break score ties. Stable across
    /// replacement so re-ingested chunks keep their original position.
    seq: u64,
    chunk: Chunk,
}

#[derive(Default)]
struct IndexInner {
    entries: HashMap<String, Entry>,
    next_seq: u64,
}

/// An in-memory [`VectorStore`] with a configurable similarity metric.
pub struct InMemoryIndex {
    inner: RwLock<IndexInner>,
    similarity: Similarity,
}

impl Default for InMemoryIndex {
    fn default() -> Self {
        Self::new(Similarity::Cosine)
    }
}

impl InMemoryIndex {
    /// Create an empty index scoring with the given metric.
    pub fn new(similarity: Similarity) -> Self {
        Self { inner: RwLock::new(IndexInner::default()), similarity }
    }
}

#[async_trait]
impl VectorStore for InMemoryIndex {
    async fn upsert(&self, chunks: &[Chunk]) -> Result<()> {
        let mut inner = self.inner.write().await;
        let IndexInner { entries, next_seq } = &mut *inner;
        for chunk in chunks {
            match entries.entry(chunk.id.clone()) {
                hash_map::Entry::Occupied(mut existing) => {
                    existing.get_mut().chunk = chunk.clone();
                }
                hash_map::Entry::Vacant(slot) => {
                    slot.insert(Entry { seq: *next_seq, chunk: chunk.clone() });
                    *next_seq += 1;
                }
            }
        }
        Ok(())
    }

    async fn delete(&self, ids: &[&str]) -> Result<()> {
        let mut inner = self.inner.write().await;
        for id in ids {
            inner.entries.remove(*id);
        }
        Ok(())
    }

    async fn search(&self, embedding: &[f32], k: usize) -> Result<Vec<SearchResult>> {
        let inner = self.inner.read().await;

        let mut scored: Vec<(u64, SearchResult)> = inner
            .entries
            .values()
            .map(|entry| {
                let score = self.similarity.score(&entry.chunk.embedding, embedding);
                (entry.seq, SearchResult { chunk: entry.chunk.clone(), score })
            })
            .collect();

        scored.sort_by(|(seq_a, a), (seq_b, b)| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(seq_a.cmp(seq_b))
        });
        scored.truncate(k);

        Ok(scored.into_iter().map(|(_, result)| result).collect())
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.inner.read().await.entries.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(id: &str, embedding: Vec<f32>) -> Chunk {
        Chunk {
            id: id.to_string(),
            document_id: "doc".to_string(),
            text: id.to_string(),
            start: 0,
            end: 0,
            embedding,
            metadata: HashMap::new(),
        }
    }

    #[tokio::test]
    async fn upsert_then_query_returns_entry_as_top_hit() {
        let index = InMemoryIndex::default();
        index
            .upsert(&[chunk("a", vec![1.0, 0.0]), chunk("b", vec![0.0, 1.0])])
            .await
            .unwrap();

        let results = index.search(&[1.0, 0.0], 2).await.unwrap();
        assert_eq!(results[0].chunk.id, "a");
        assert!((results[0].score - 1.0).abs() < 1e-6);
        assert!(results[0].score >= results[1].score);
    }

    #[tokio::test]
    async fn empty_index_returns_no_results() {
        let index = InMemoryIndex::default();
        let results = index.search(&[1.0, 0.0], 5).await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn ties_break_by_insertion_order() {
        let index = InMemoryIndex::default();
        // Identical embeddings: scores tie exactly.
        index.upsert(&[chunk("first", vec![1.0, 0.0])]).await.unwrap();
        index.upsert(&[chunk("second", vec![1.0, 0.0])]).await.unwrap();
        index.upsert(&[chunk("third", vec![1.0, 0.0])]).await.unwrap();

        let results = index.search(&[1.0, 0.0], 3).await.unwrap();
        let ids: Vec<&str> = results.iter().map(|r| r.chunk.id.as_str()).collect();
        assert_eq!(ids, vec!["first", "second", "third"]);
    }

    #[tokio::test]
    async fn replacement_keeps_insertion_position() {
        let index = InMemoryIndex::default();
        index.upsert(&[chunk("a", vec![1.0, 0.0]), chunk("b", vec![1.0, 0.0])]).await.unwrap();
        // Re-ingest "a" with the same score; it must stay ahead of "b".
        index.upsert(&[chunk("a", vec![1.0, 0.0])]).await.unwrap();

        let results = index.search(&[1.0, 0.0], 2).await.unwrap();
        assert_eq!(results[0].chunk.id, "a");
        assert_eq!(index.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn k_larger_than_store_returns_everything() {
        let index = InMemoryIndex::default();
        index.upsert(&[chunk("a", vec![1.0, 0.0]), chunk("b", vec![0.5, 0.5])]).await.unwrap();

        let results = index.search(&[1.0, 0.0], 100).await.unwrap();
        assert_eq!(results.len(), 2);
    }

    #[tokio::test]
    async fn dot_product_metric_is_magnitude_sensitive() {
        let index = InMemoryIndex::new(Similarity::DotProduct);
        index.upsert(&[chunk("small", vec![1.0, 0.0]), chunk("large", vec![3.0, 0.0])]).await.unwrap();

        let results = index.search(&[1.0, 0.0], 2).await.unwrap();
        assert_eq!(results[0].chunk.id, "large");
    }
}
