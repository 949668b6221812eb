//! Index persistence

pub mod index;

pub use index::{IndexMeta, VectorIndex};
