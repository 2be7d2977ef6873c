//! Document chunking.
//!
//! [`FixedSizeChunker`] splits a document into overlapping fixed-size
//! segments by character count. Every character of the source text is
//! covered by at least one chunk; interior overlap regions are covered
//! twice.

use crate::document::{Chunk, Document};
use crate::error::{RagError, Result};

/// A strategy for splitting documents into chunks.
///
/// Implementations produce [`Chunk`]s with text, offsets, and metadata but
/// no embeddings. Embeddings are attached later by the retriever.
pub trait Chunker: Send + Sync {
    /// Split a document into ordered chunks.
    ///
    /// Returns an empty `Vec` if the document has empty text.
    fn chunk(&self, document: &Document) -> Vec<Chunk>;
}

/// Splits text into fixed-size chunks by character count with overlap.
///
/// The stride between chunk starts is `chunk_size - overlap`. The walk
/// stops once a chunk reaches the end of the text, so a 250-character
/// document with size 100 and overlap 20 yields spans `[0,100)`,
/// `[80,180)`, `[160,250)`.
///
/// Chunk IDs are generated as `{document_id}_{chunk_index}`. Each chunk
/// inherits the parent document's metadata plus a `chunk_index` field.
#[derive(Debug, Clone)]
pub struct FixedSizeChunker {
    chunk_size: usize,
    overlap: usize,
}

impl FixedSizeChunker {
    /// Create a new `FixedSizeChunker`.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Config`] if `chunk_size` is zero or
    /// `overlap >= chunk_size`.
    pub fn new(chunk_size: usize, overlap: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(RagError::Config("chunk_size must be greater than zero".to_string()));
        }
        if overlap >= chunk_size {
            return Err(RagError::Config(format!(
                "overlap ({overlap}) must be less than chunk_size ({chunk_size})"
            )));
        }
        Ok(Self { chunk_size, overlap })
    }
}

impl Chunker for FixedSizeChunker {
    fn chunk(&self, document: &Document) -> Vec<Chunk> {
        if document.text.is_empty() {
            return Vec::new();
        }

        // Byte offsets of each character boundary, including the end.
        let mut bounds: Vec<usize> = document.text.char_indices().map(|(i, _)| i).collect();
        bounds.push(document.text.len());
        let char_count = bounds.len() - 1;

        let mut chunks = Vec::new();
        let stride = self.chunk_size - self.overlap;
        let mut start = 0;
        let mut chunk_index = 0;

        loop {
            let end = (start + self.chunk_size).min(char_count);
            let text = document.text[bounds[start]..bounds[end]].to_string();

            let mut metadata = document.metadata.clone();
            metadata.insert("chunk_index".to_string(), chunk_index.to_string());

            chunks.push(Chunk {
                id: format!("{}_{chunk_index}", document.id),
                document_id: document.id.clone(),
                text,
                start,
                end,
                embedding: Vec::new(),
                metadata,
            });

            if end == char_count {
                break;
            }
            start += stride;
            chunk_index += 1;
        }

        chunks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(len: usize) -> Document {
        Document::new("doc", "x".repeat(len))
    }

    #[test]
    fn rejects_overlap_not_smaller_than_size() {
        assert!(matches!(FixedSizeChunker::new(100, 100), Err(RagError::Config(_))));
        assert!(matches!(FixedSizeChunker::new(100, 150), Err(RagError::Config(_))));
        assert!(matches!(FixedSizeChunker::new(0, 0), Err(RagError::Config(_))));
        assert!(FixedSizeChunker::new(100, 20).is_ok());
    }

    #[test]
    fn spans_for_250_chars_at_size_100_overlap_20() {
        let chunker = FixedSizeChunker::new(100, 20).unwrap();
        let chunks = chunker.chunk(&doc(250));

        let spans: Vec<(usize, usize)> = chunks.iter().map(|c| (c.start, c.end)).collect();
        assert_eq!(spans, vec![(0, 100), (80, 180), (160, 250)]);
    }

    #[test]
    fn single_chunk_when_text_fits() {
        let chunker = FixedSizeChunker::new(100, 20).unwrap();
        let chunks = chunker.chunk(&doc(60));
        assert_eq!(chunks.len(), 1);
        assert_eq!((chunks[0].start, chunks[0].end), (0, 60));
    }

    #[test]
    fn empty_document_yields_no_chunks() {
        let chunker = FixedSizeChunker::new(100, 20).unwrap();
        assert!(chunker.chunk(&Document::new("doc", "")).is_empty());
    }

    #[test]
    fn chunk_ids_are_stable_and_indexed() {
        let chunker = FixedSizeChunker::new(100, 20).unwrap();
        let chunks = chunker.chunk(&doc(250));
        let ids: Vec<&str> = chunks.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["doc_0", "doc_1", "doc_2"]);
        assert_eq!(chunks[1].metadata["chunk_index"], "1");
    }

    #[test]
    fn offsets_count_characters_not_bytes() {
        let chunker = FixedSizeChunker::new(4, 1).unwrap();
        let document = Document::new("doc", "héllo wörld");
        let chunks = chunker.chunk(&document);

        assert_eq!(chunks[0].text, "héll");
        assert_eq!((chunks[0].start, chunks[0].end), (0, 4));
        // Full coverage of the 11 characters.
        assert_eq!(chunks.last().unwrap().end, 11);
    }

    #[test]
    fn every_character_is_covered() {
        let chunker = FixedSizeChunker::new(7, 3).unwrap();
        for len in 1..40 {
            let chunks = chunker.chunk(&doc(len));
            let mut covered = vec![0u32; len];
            for c in &chunks {
                for slot in &mut covered[c.start..c.end] {
                    *slot += 1;
                }
            }
            assert!(covered.iter().all(|&n| n >= 1), "gap at len {len}");
        }
    }
}
