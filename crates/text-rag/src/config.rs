//! Configuration for the RAG service

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

/// Main configuration for the RAG service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RagConfig {
    /// HTTP server configuration
    pub server: ServerConfig,
    /// Source corpus configuration
    pub corpus: CorpusConfig,
    /// Chunking configuration
    pub chunking: ChunkingConfig,
    /// OpenAI API configuration
    pub openai: OpenAiConfig,
    /// Vector index configuration
    pub index: IndexConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Enable CORS
    pub enable_cors: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            enable_cors: true,
        }
    }
}

/// Source corpus configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusConfig {
    /// Path to the plain-text data file served by the pipeline
    pub data_file: PathBuf,
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            data_file: PathBuf::from("data/corpus.txt"),
        }
    }
}

/// Chunking configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkingConfig {
    /// Chunk size in characters
    pub chunk_size: usize,
    /// Overlap between consecutive chunks in characters
    pub chunk_overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 150,
        }
    }
}

/// OpenAI API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiConfig {
    /// API key, read from the OPENAI_API_KEY environment variable
    #[serde(skip_serializing, default)]
    pub api_key: String,
    /// Base URL of the API
    pub base_url: String,
    /// Embedding model name
    pub embed_model: String,
    /// Embedding vector dimensions
    pub embed_dimensions: usize,
    /// Chat completion model name
    pub chat_model: String,
    /// Number of texts sent per embeddings request
    pub embed_batch_size: usize,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Maximum retries per request
    pub max_retries: u32,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: "https://api.openai.com/v1".to_string(),
            embed_model: "text-embedding-3-small".to_string(),
            embed_dimensions: 1536,
            chat_model: "gpt-4o-mini".to_string(),
            embed_batch_size: 64,
            timeout_secs: 60,
            max_retries: 2,
        }
    }
}

/// Vector index configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Directory where the index database is persisted
    pub dir: PathBuf,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("data/index"),
        }
    }
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            corpus: CorpusConfig::default(),
            chunking: ChunkingConfig::default(),
            openai: OpenAiConfig::default(),
            index: IndexConfig::default(),
        }
    }
}

impl RagConfig {
    /// Load configuration from environment variables, falling back to defaults
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(data_file) = env::var("RAG_DATA_FILE") {
            config.corpus.data_file = PathBuf::from(data_file);
        }
        if let Ok(index_dir) = env::var("RAG_INDEX_DIR") {
            config.index.dir = PathBuf::from(index_dir);
        }
        if let Ok(host) = env::var("RAG_HOST") {
            config.server.host = host;
        }
        if let Ok(port) = env::var("RAG_PORT") {
            config.server.port = port
                .parse()
                .map_err(|_| Error::config(format!("Invalid RAG_PORT: {}", port)))?;
        }
        if let Ok(base_url) = env::var("OPENAI_BASE_URL") {
            config.openai.base_url = base_url;
        }
        if let Ok(embed_model) = env::var("RAG_EMBED_MODEL") {
            config.openai.embed_model = embed_model;
        }
        if let Ok(chat_model) = env::var("RAG_CHAT_MODEL") {
            config.openai.chat_model = chat_model;
        }

        // The service cannot start without a credential.
        config.openai.api_key =
            env::var("OPENAI_API_KEY").map_err(|_| Error::config("OPENAI_API_KEY not found"))?;

        config.validate()?;
        Ok(config)
    }

    /// Check parameter constraints that would otherwise surface deep in the pipeline
    pub fn validate(&self) -> Result<()> {
        if self.chunking.chunk_size == 0 {
            return Err(Error::config("chunk_size must be greater than zero"));
        }
        if self.chunking.chunk_overlap == 0 || self.chunking.chunk_overlap >= self.chunking.chunk_size
        {
            return Err(Error::config(format!(
                "chunk_overlap must be between 1 and chunk_size - 1 (got overlap {} for chunk_size {})",
                self.chunking.chunk_overlap, self.chunking.chunk_size
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RagConfig::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.corpus.data_file, PathBuf::from("data/corpus.txt"));
        assert_eq!(config.chunking.chunk_size, 1000);
        assert_eq!(config.chunking.chunk_overlap, 150);
        assert_eq!(config.openai.chat_model, "gpt-4o-mini");
        assert_eq!(config.openai.embed_model, "text-embedding-3-small");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_overlap() {
        let mut config = RagConfig::default();
        config.chunking.chunk_overlap = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_overlap_not_below_chunk_size() {
        let mut config = RagConfig::default();
        config.chunking.chunk_size = 100;
        config.chunking.chunk_overlap = 100;
        assert!(config.validate().is_err());

        config.chunking.chunk_overlap = 150;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_chunk_size() {
        let mut config = RagConfig::default();
        config.chunking.chunk_size = 0;
        assert!(config.validate().is_err());
    }
}
