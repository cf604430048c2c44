//! Error types shared across crates

use thiserror::Error;

/// Result alias using the core error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced across crate boundaries
#[derive(Error, Debug)]
pub enum Error {
    #[error("Retrieval error: {0}")]
    Rag(String),
}
