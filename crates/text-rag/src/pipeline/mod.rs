//! Pipeline orchestration

pub mod session;

pub use session::Session;
