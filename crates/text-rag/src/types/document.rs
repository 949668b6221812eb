//! Document and chunk types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A loaded source document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Unique document ID
    pub id: Uuid,
    /// Where the document came from (file path)
    pub source: String,
    /// Full text content
    pub content: String,
    /// SHA-256 hash of the content
    pub content_hash: String,
    /// When the document was loaded
    pub loaded_at: DateTime<Utc>,
}

impl Document {
    /// Create a new document
    pub fn new(source: impl Into<String>, content: impl Into<String>, content_hash: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            source: source.into(),
            content: content.into(),
            content_hash: content_hash.into(),
            loaded_at: Utc::now(),
        }
    }

    /// Content length in characters
    pub fn char_count(&self) -> usize {
        self.content.chars().count()
    }
}

/// A contiguous slice of a document, the unit of retrieval
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    /// Unique chunk ID
    pub id: Uuid,
    /// ID of the parent document
    pub document_id: Uuid,
    /// Source of the parent document
    pub source: String,
    /// Chunk text
    pub content: String,
    /// Start offset within the parent document, in characters
    pub char_start: usize,
    /// End offset within the parent document, in characters (exclusive)
    pub char_end: usize,
    /// Position of this chunk within the parent document
    pub chunk_index: u32,
}

impl Chunk {
    /// Create a new chunk
    pub fn new(
        document: &Document,
        content: impl Into<String>,
        char_start: usize,
        char_end: usize,
        chunk_index: u32,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            document_id: document.id,
            source: document.source.clone(),
            content: content.into(),
            char_start,
            char_end,
            chunk_index,
        }
    }

    /// Chunk length in characters
    pub fn char_count(&self) -> usize {
        self.content.chars().count()
    }
}
