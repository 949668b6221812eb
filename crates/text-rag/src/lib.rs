//! text-rag: Retrieval-augmented question answering over plain-text documents
//!
//! This crate loads a plain-text corpus, splits it into overlapping chunks,
//! embeds the chunks through an OpenAI-compatible API, and persists them in a
//! SQLite-backed vector index. Questions are answered by an LLM grounded in
//! the retrieved chunks, with source citations attached to every answer.

pub mod config;
pub mod error;
pub mod generation;
pub mod ingestion;
pub mod pipeline;
pub mod providers;
pub mod retrieval;
pub mod server;
pub mod storage;
pub mod types;

pub use config::RagConfig;
pub use error::{Error, Result};
pub use ingestion::{TextChunker, TextLoader};
pub use pipeline::Session;
pub use storage::VectorIndex;
pub use types::{
    document::{Chunk, Document},
    query::AskRequest,
    response::{AnswerResult, AskResponse, Citation, ScoredChunk},
};
