//! Sliding-window text chunking

use crate::error::{Error, Result};
use crate::types::{Chunk, Document};

/// Splits documents into fixed-size chunks with a character overlap.
///
/// The window advances by `chunk_size - overlap` characters, so every
/// pair of adjacent chunks from the same document shares exactly
/// `overlap` characters. The final chunk may be shorter than
/// `chunk_size`.
#[derive(Debug, Clone)]
pub struct TextChunker {
    chunk_size: usize,
    overlap: usize,
}

impl TextChunker {
    /// Create a chunker. The overlap must be strictly between 0 and
    /// `chunk_size`.
    pub fn new(chunk_size: usize, overlap: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(Error::config("chunk_size must be greater than zero"));
        }
        if overlap == 0 || overlap >= chunk_size {
            return Err(Error::config(format!(
                "overlap must be between 1 and chunk_size - 1 (got overlap {} for chunk_size {})",
                overlap, chunk_size
            )));
        }
        Ok(Self { chunk_size, overlap })
    }

    /// Chunk size in characters
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Overlap in characters
    pub fn overlap(&self) -> usize {
        self.overlap
    }

    /// Split documents into chunks, preserving document order.
    ///
    /// Offsets are measured in characters, not bytes, so multi-byte
    /// content chunks cleanly. An empty document yields no chunks.
    pub fn split(&self, documents: &[Document]) -> Vec<Chunk> {
        let mut chunks = Vec::new();
        let step = self.chunk_size - self.overlap;

        for document in documents {
            let chars: Vec<char> = document.content.chars().collect();
            let total = chars.len();
            let mut start = 0;
            let mut chunk_index = 0u32;

            while start < total {
                let end = (start + self.chunk_size).min(total);
                let content: String = chars[start..end].iter().collect();
                chunks.push(Chunk::new(document, content, start, end, chunk_index));
                chunk_index += 1;

                if end == total {
                    break;
                }
                start += step;
            }
        }

        tracing::debug!(
            documents = documents.len(),
            chunks = chunks.len(),
            chunk_size = self.chunk_size,
            overlap = self.overlap,
            "Split documents into chunks"
        );

        chunks
    }
}
