//! Embedding and LLM providers

pub mod embedding;
pub mod llm;
pub mod openai;

pub use embedding::{EmbedderIdentity, EmbeddingProvider};
pub use llm::LlmProvider;
pub use openai::{OpenAiClient, OpenAiEmbedder, OpenAiLlm, OpenAiProvider};
