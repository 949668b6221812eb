//! Embedding provider abstraction

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of an embedder: the model and its vector dimensions.
///
/// Recorded alongside a built index and checked before querying, so
/// vectors from one embedder are never searched against an index built
/// by another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbedderIdentity {
    /// Embedding model name
    pub model: String,
    /// Embedding vector dimensions
    pub dimensions: usize,
}

impl EmbedderIdentity {
    /// Create an embedder identity
    pub fn new(model: impl Into<String>, dimensions: usize) -> Self {
        Self {
            model: model.into(),
            dimensions,
        }
    }
}

impl fmt::Display for EmbedderIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} dims)", self.model, self.dimensions)
    }
}

/// Trait for embedding providers
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Generate an embedding for a single text
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate embeddings for multiple texts
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut embeddings = Vec::with_capacity(texts.len());
        for text in texts {
            embeddings.push(self.embed(text).await?);
        }
        Ok(embeddings)
    }

    /// Embedding vector dimensions
    fn dimensions(&self) -> usize;

    /// Embedding model name
    fn model(&self) -> &str;

    /// Provider name
    fn name(&self) -> &str;

    /// Identity recorded alongside indexes built with this embedder
    fn identity(&self) -> EmbedderIdentity {
        EmbedderIdentity::new(self.model(), self.dimensions())
    }

    /// Check if the provider is reachable
    async fn health_check(&self) -> Result<bool>;
}
