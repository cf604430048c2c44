//! Retrieval trait for FAQ prompt enrichment

use async_trait::async_trait;

use crate::{FaqMatch, Result};

/// Context text returned when no FAQ matched
pub const NO_MATCHES_SENTINEL: &str = "No similar FAQs found.";

/// FAQ retriever interface consumed by the conversational layer
///
/// # Example
///
/// ```ignore
/// let retriever: Arc<dyn FaqRetriever> = Arc::new(engine);
/// let matches = retriever.search("How do I pay?", Some("en"), 3).await?;
/// for m in matches {
///     println!("{:.2} {}", m.similarity_score, m.question);
/// }
/// ```
#[async_trait]
pub trait FaqRetriever: Send + Sync {
    /// Ranked, language-filtered matches, nearest first.
    ///
    /// `language` of `None` or `Some("")` disables the filter. At most
    /// `top_k` matches are returned; a short or empty list is not an error.
    async fn search(
        &self,
        query: &str,
        language: Option<&str>,
        top_k: usize,
    ) -> Result<Vec<FaqMatch>>;

    /// Prompt-ready text for the same search.
    ///
    /// Never empty: yields [`NO_MATCHES_SENTINEL`] when nothing matched.
    async fn get_context_for_llm(
        &self,
        query: &str,
        language: Option<&str>,
        top_k: usize,
    ) -> Result<String>;

    /// Retriever name for logging
    fn name(&self) -> &str;
}
