//! Query-time retrieval over the vector index

use crate::error::{Error, Result};
use crate::providers::EmbeddingProvider;
use crate::storage::VectorIndex;
use crate::types::ScoredChunk;
use std::sync::Arc;

/// Embeds queries and searches the index for similar chunks.
///
/// Construction fails unless the embedder matches the identity the
/// index was built with, so query vectors always come from the same
/// model as the indexed vectors.
pub struct Retriever {
    index: Arc<VectorIndex>,
    embedder: Arc<dyn EmbeddingProvider>,
}

impl Retriever {
    /// Create a retriever over an index, checking embedder identity
    pub fn new(index: Arc<VectorIndex>, embedder: Arc<dyn EmbeddingProvider>) -> Result<Self> {
        let expected = index.embedder_identity();
        let actual = embedder.identity();
        if actual != *expected {
            return Err(Error::config(format!(
                "Retriever embedder {} does not match index embedder {}",
                actual, expected
            )));
        }
        Ok(Self { index, embedder })
    }

    /// Retrieve the `k` chunks most similar to the query text
    pub async fn retrieve(&self, query_text: &str, k: usize) -> Result<Vec<ScoredChunk>> {
        let query_vector = self.embedder.embed(query_text).await?;
        let results = self.index.query(&query_vector, k);

        tracing::debug!(
            requested = k,
            retrieved = results.len(),
            "Retrieved chunks for query"
        );

        Ok(results
            .into_iter()
            .map(|(chunk, score)| ScoredChunk { chunk, score })
            .collect())
    }
}
