//! Retrieval

pub mod search;

pub use search::Retriever;
