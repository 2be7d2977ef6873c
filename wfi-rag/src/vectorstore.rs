//! Vector store trait for storing and searching embedded chunks.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::document::{Chunk, SearchResult};
use crate::error::Result;

/// The similarity metric used to score search results.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Similarity {
    /// Cosine similarity (magnitude-independent). The default.
    #[default]
    Cosine,
    /// Inner product.
    DotProduct,
}

impl Similarity {
    /// Score two vectors under this metric.
    ///
    /// Returns 0.0 for cosine when either vector has zero magnitude.
    pub fn score(&self, a: &[f32], b: &[f32]) -> f32 {
        let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
        match self {
            Similarity::DotProduct => dot,
            Similarity::Cosine => {
                let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
                let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
                if norm_a == 0.0 || norm_b == 0.0 {
                    return 0.0;
                }
                dot / (norm_a * norm_b)
            }
        }
    }
}

impl std::str::FromStr for Similarity {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "cosine" => Ok(Similarity::Cosine),
            "dot_product" | "dot" | "inner_product" => Ok(Similarity::DotProduct),
            other => Err(format!("unknown similarity metric '{other}'")),
        }
    }
}

/// A storage backend for embedded chunks with similarity search.
///
/// Entries are keyed by the chunk's stable id: upserting a chunk whose id is
/// already present replaces it. Queries never observe a partially-written
/// upsert.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Insert or replace chunks, keyed by chunk id. Chunks must have
    /// embeddings set.
    async fn upsert(&self, chunks: &[Chunk]) -> Result<()>;

    /// Delete chunks by id. Missing ids are ignored.
    async fn delete(&self, ids: &[&str]) -> Result<()>;

    /// Return the `k` entries most similar to the given embedding, ordered
    /// by descending score with ties broken by insertion order.
    ///
    /// An empty store yields an empty `Vec`, not an error.
    async fn search(&self, embedding: &[f32], k: usize) -> Result<Vec<SearchResult>>;

    /// Number of entries currently stored.
    async fn count(&self) -> Result<usize>;
}
