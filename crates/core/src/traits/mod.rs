//! Core traits for pluggable backends

mod retriever;

pub use retriever::{FaqRetriever, NO_MATCHES_SENTINEL};
