//! # wfi-rag
//!
//! The retrieval pipeline for Workforce Intelligence: document chunking,
//! embedding, vector search, and the retriever that composes them.
//!
//! At index-build time documents flow chunk → embed → upsert; at query
//! time a query flows embed → top-k search. External services (the
//! embedding backend, the vector index) sit behind the
//! [`EmbeddingProvider`] and [`VectorStore`] traits so they can be faked
//! in tests.

pub mod chunking;
pub mod config;
pub mod document;
pub mod embedding;
pub mod error;
pub mod inmemory;
pub mod openai;
pub mod retriever;
pub mod tool;
pub mod vectorstore;

pub use chunking::{Chunker, FixedSizeChunker};
pub use config::{RagConfig, RagConfigBuilder};
pub use document::{Chunk, Document, SearchResult};
pub use embedding::{CachedEmbedder, EmbeddingProvider};
pub use error::{RagError, Result};
pub use inmemory::InMemoryIndex;
pub use openai::OpenAiEmbedder;
pub use retriever::{Retriever, RetrieverBuilder};
pub use tool::RetrievalTool;
pub use vectorstore::{Similarity, VectorStore};
