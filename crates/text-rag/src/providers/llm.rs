//! LLM provider abstraction

use crate::error::Result;
use async_trait::async_trait;

/// Trait for LLM providers
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Generate a completion for a prompt at the given temperature
    async fn generate(&self, prompt: &str, temperature: f32) -> Result<String>;

    /// Check if the provider is reachable
    async fn health_check(&self) -> Result<bool>;

    /// Provider name
    fn name(&self) -> &str;

    /// Chat model name
    fn model(&self) -> &str;
}
