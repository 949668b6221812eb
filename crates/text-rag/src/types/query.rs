//! Request types for the ask endpoint

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Minimum number of chunks that can be requested
pub const MIN_TOP_K: usize = 1;
/// Maximum number of chunks that can be requested
pub const MAX_TOP_K: usize = 10;
/// Maximum sampling temperature
pub const MAX_TEMPERATURE: f32 = 1.5;

fn default_top_k() -> usize {
    3
}

fn default_temperature() -> f32 {
    0.2
}

/// A question posed to the RAG pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AskRequest {
    /// The question text
    pub question: String,
    /// Number of chunks to retrieve
    #[serde(default = "default_top_k")]
    pub k: usize,
    /// Sampling temperature for answer generation
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Include retrieved chunk snippets in the response metadata
    #[serde(default)]
    pub show_snippets: bool,
}

impl AskRequest {
    /// Create a request with default retrieval parameters
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            k: default_top_k(),
            temperature: default_temperature(),
            show_snippets: false,
        }
    }

    /// Set the number of chunks to retrieve
    pub fn with_k(mut self, k: usize) -> Self {
        self.k = k;
        self
    }

    /// Set the sampling temperature
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Include snippets in the response metadata
    pub fn with_snippets(mut self, show_snippets: bool) -> Self {
        self.show_snippets = show_snippets;
        self
    }

    /// Check that the retrieval parameters are within their accepted ranges
    pub fn validate(&self) -> Result<()> {
        if self.k < MIN_TOP_K || self.k > MAX_TOP_K {
            return Err(Error::validation(format!(
                "k must be between {} and {} (got {})",
                MIN_TOP_K, MAX_TOP_K, self.k
            )));
        }
        if !self.temperature.is_finite()
            || self.temperature < 0.0
            || self.temperature > MAX_TEMPERATURE
        {
            return Err(Error::validation(format!(
                "temperature must be between 0.0 and {} (got {})",
                MAX_TEMPERATURE, self.temperature
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_applies_defaults() {
        let request: AskRequest = serde_json::from_str(r#"{"question": "What is RAG?"}"#).unwrap();
        assert_eq!(request.question, "What is RAG?");
        assert_eq!(request.k, 3);
        assert_eq!(request.temperature, 0.2);
        assert!(!request.show_snippets);
    }

    #[test]
    fn test_deserialize_explicit_fields() {
        let request: AskRequest = serde_json::from_str(
            r#"{"question": "q", "k": 5, "temperature": 0.7, "show_snippets": true}"#,
        )
        .unwrap();
        assert_eq!(request.k, 5);
        assert_eq!(request.temperature, 0.7);
        assert!(request.show_snippets);
    }

    #[test]
    fn test_validate_accepts_boundaries() {
        assert!(AskRequest::new("q").with_k(1).validate().is_ok());
        assert!(AskRequest::new("q").with_k(10).validate().is_ok());
        assert!(AskRequest::new("q").with_temperature(0.0).validate().is_ok());
        assert!(AskRequest::new("q").with_temperature(1.5).validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_out_of_range_k() {
        assert!(AskRequest::new("q").with_k(0).validate().is_err());
        assert!(AskRequest::new("q").with_k(11).validate().is_err());
    }

    #[test]
    fn test_validate_rejects_out_of_range_temperature() {
        assert!(AskRequest::new("q").with_temperature(-0.1).validate().is_err());
        assert!(AskRequest::new("q").with_temperature(1.6).validate().is_err());
        assert!(AskRequest::new("q").with_temperature(f32::NAN).validate().is_err());
    }
}
