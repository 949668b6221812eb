//! Core types shared across the pipeline

pub mod document;
pub mod query;
pub mod response;

pub use document::{Chunk, Document};
pub use query::{AskRequest, MAX_TEMPERATURE, MAX_TOP_K, MIN_TOP_K};
pub use response::{AnswerResult, AskResponse, Citation, ScoredChunk, EMPTY_QUESTION_REPLY};
