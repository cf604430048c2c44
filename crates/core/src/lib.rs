//! Core traits and types for the bilingual FAQ assistant
//!
//! This crate provides the types shared by the index builder, the retrieval
//! engine and the conversational layer that consumes them:
//! - Language definitions (English/Hindi) and script-based detection
//! - FAQ corpus entries and retrieval matches
//! - Error types
//! - The `FaqRetriever` trait used for prompt enrichment

pub mod error;
pub mod faq;
pub mod language;
pub mod traits;

pub use error::{Error, Result};
pub use faq::{FaqEntry, FaqMatch, RecordMetadata};
pub use language::{Language, Script};
pub use traits::{FaqRetriever, NO_MATCHES_SENTINEL};
