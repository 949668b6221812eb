//! Shared application state

use crate::config::RagConfig;
use crate::error::Result;
use crate::ingestion::{TextChunker, TextLoader};
use crate::pipeline::Session;
use crate::providers::{EmbeddingProvider, LlmProvider, OpenAiProvider};
use crate::storage::VectorIndex;
use crate::types::Chunk;
use std::sync::Arc;

/// Shared application state, cheap to clone
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: RagConfig,
    index: Arc<VectorIndex>,
    embedder: Arc<dyn EmbeddingProvider>,
    llm: Arc<dyn LlmProvider>,
}

impl AppState {
    /// Load the corpus, prepare the index, and wire up providers.
    ///
    /// Reuses a previously persisted index when it matches the current
    /// embedder, corpus, and chunking parameters; otherwise rebuilds.
    pub async fn initialize(config: RagConfig) -> Result<Self> {
        let chunker = TextChunker::new(config.chunking.chunk_size, config.chunking.chunk_overlap)?;
        let documents = TextLoader::load(&config.corpus.data_file)?;
        let corpus_hash = TextLoader::fingerprint(&documents);
        let chunks = chunker.split(&documents);

        let (embedder, llm) = OpenAiProvider::new(&config.openai)?.split();
        let embedder: Arc<dyn EmbeddingProvider> = embedder;
        let llm: Arc<dyn LlmProvider> = llm;

        let index =
            Self::build_or_open(&config, &chunks, embedder.as_ref(), &corpus_hash).await?;

        tracing::info!(
            documents = documents.len(),
            chunks = index.len(),
            embedder = %index.embedder_identity(),
            "Application state initialized"
        );

        Ok(Self::from_parts(config, Arc::new(index), embedder, llm))
    }

    /// Assemble state from an already built index and providers
    pub fn from_parts(
        config: RagConfig,
        index: Arc<VectorIndex>,
        embedder: Arc<dyn EmbeddingProvider>,
        llm: Arc<dyn LlmProvider>,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                index,
                embedder,
                llm,
            }),
        }
    }

    async fn build_or_open(
        config: &RagConfig,
        chunks: &[Chunk],
        embedder: &dyn EmbeddingProvider,
        corpus_hash: &str,
    ) -> Result<VectorIndex> {
        let dir = &config.index.dir;

        if VectorIndex::exists(dir) {
            match VectorIndex::open(dir, &embedder.identity()) {
                Ok(index)
                    if index.corpus_hash() == corpus_hash
                        && index.meta().chunk_size == config.chunking.chunk_size
                        && index.meta().chunk_overlap == config.chunking.chunk_overlap =>
                {
                    tracing::info!(dir = %dir.display(), "Reusing persisted index");
                    return Ok(index);
                }
                Ok(_) => {
                    tracing::info!(
                        dir = %dir.display(),
                        "Corpus or chunking changed, rebuilding index"
                    );
                }
                Err(e) => {
                    tracing::warn!(
                        dir = %dir.display(),
                        error = %e,
                        "Persisted index unusable, rebuilding"
                    );
                }
            }
        }

        VectorIndex::build(
            dir,
            chunks,
            embedder,
            &config.chunking,
            corpus_hash,
            config.openai.embed_batch_size,
        )
        .await
    }

    /// Service configuration
    pub fn config(&self) -> &RagConfig {
        &self.inner.config
    }

    /// The vector index
    pub fn index(&self) -> &Arc<VectorIndex> {
        &self.inner.index
    }

    /// Assemble a session with the given retrieval parameters
    pub fn session(&self, k: usize, temperature: f32) -> Result<Session> {
        Session::new(
            Arc::clone(&self.inner.index),
            Arc::clone(&self.inner.embedder),
            Arc::clone(&self.inner.llm),
            k,
            temperature,
        )
    }

    /// Whether the service can answer questions
    pub fn is_ready(&self) -> bool {
        !self.inner.index.is_empty()
    }
}
