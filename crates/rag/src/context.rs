//! Prompt-context enrichment
//!
//! Runs before the language model replies to a user turn: detects the turn's
//! language from its script, looks up matching FAQs and wraps them for
//! injection into the chat context. A failed lookup never aborts the turn;
//! the reply simply goes out without knowledge-base context.

use std::sync::Arc;

use voice_faq_core::{FaqRetriever, Language, NO_MATCHES_SENTINEL};

const FOUND_PREFIX: &str = "RELEVANT INFORMATION FROM KNOWLEDGE BASE:";
const FOUND_SUFFIX: &str = "Use this information to answer the user's question accurately.";
const NOT_FOUND_NOTE: &str = "No relevant information found in the knowledge base for this query. \
                              Offer to transfer to human agent.";

/// Outcome of a knowledge-base lookup for one user turn
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KnowledgeContext {
    /// Matches found; `text` is the rendered FAQ list
    Found { language: Language, text: String },
    /// Lookup succeeded but nothing matched
    NotFound { language: Language },
    /// Lookup skipped or failed; proceed without augmentation
    Unavailable { language: Language },
}

impl KnowledgeContext {
    /// Language detected for the turn
    pub fn language(&self) -> Language {
        match self {
            Self::Found { language, .. }
            | Self::NotFound { language }
            | Self::Unavailable { language } => *language,
        }
    }

    /// Text to add to the chat context; empty when unavailable
    pub fn prompt_note(&self) -> String {
        match self {
            Self::Found { text, .. } => format!("{}\n{}\n\n{}", FOUND_PREFIX, text, FOUND_SUFFIX),
            Self::NotFound { .. } => NOT_FOUND_NOTE.to_string(),
            Self::Unavailable { .. } => String::new(),
        }
    }
}

/// Looks up FAQ context for user turns
pub struct FaqContextEnricher {
    retriever: Arc<dyn FaqRetriever>,
    top_k: usize,
}

impl FaqContextEnricher {
    pub fn new(retriever: Arc<dyn FaqRetriever>, top_k: usize) -> Self {
        Self { retriever, top_k }
    }

    /// Context for one user utterance
    pub async fn context_for_turn(&self, user_text: &str) -> KnowledgeContext {
        let language = Language::detect(user_text);

        if user_text.trim().is_empty() {
            return KnowledgeContext::Unavailable { language };
        }

        tracing::info!(
            language = %language,
            retriever = self.retriever.name(),
            "Knowledge base lookup"
        );

        match self
            .retriever
            .get_context_for_llm(user_text, Some(language.code()), self.top_k)
            .await
        {
            Ok(text) if text == NO_MATCHES_SENTINEL => {
                tracing::info!(language = %language, "No relevant FAQ found");
                KnowledgeContext::NotFound { language }
            },
            Ok(text) => {
                tracing::info!(chars = text.len(), "FAQ context found");
                KnowledgeContext::Found { language, text }
            },
            Err(e) => {
                tracing::warn!(error = %e, "FAQ lookup failed, continuing without context");
                KnowledgeContext::Unavailable { language }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use voice_faq_core::{Error, FaqMatch, Result};

    /// Records the language hint and replies with a canned outcome
    struct ScriptedRetriever {
        reply: std::result::Result<String, String>,
        seen_language: Mutex<Option<String>>,
    }

    impl ScriptedRetriever {
        fn new(reply: std::result::Result<&str, &str>) -> Self {
            Self {
                reply: reply.map(str::to_string).map_err(str::to_string),
                seen_language: Mutex::new(None),
            }
        }
    }

    #[async_trait]
    impl FaqRetriever for ScriptedRetriever {
        async fn search(&self, _: &str, _: Option<&str>, _: usize) -> Result<Vec<FaqMatch>> {
            Ok(Vec::new())
        }

        async fn get_context_for_llm(
            &self,
            _query: &str,
            language: Option<&str>,
            _top_k: usize,
        ) -> Result<String> {
            *self.seen_language.lock().unwrap() = language.map(str::to_string);
            self.reply.clone().map_err(Error::Rag)
        }

        fn name(&self) -> &str {
            "scripted"
        }
    }

    #[tokio::test]
    async fn test_found_wraps_context() {
        let retriever = Arc::new(ScriptedRetriever::new(Ok("1. Category: billing")));
        let enricher = FaqContextEnricher::new(retriever.clone(), 3);

        let context = enricher.context_for_turn("How do I pay?").await;

        assert_eq!(context.language(), Language::English);
        assert_eq!(
            context.prompt_note(),
            "RELEVANT INFORMATION FROM KNOWLEDGE BASE:\n1. Category: billing\n\n\
             Use this information to answer the user's question accurately."
        );
        assert_eq!(retriever.seen_language.lock().unwrap().as_deref(), Some("en"));
    }

    #[tokio::test]
    async fn test_hindi_turn_uses_hindi_filter() {
        let retriever = Arc::new(ScriptedRetriever::new(Ok(NO_MATCHES_SENTINEL)));
        let enricher = FaqContextEnricher::new(retriever.clone(), 3);

        let context = enricher.context_for_turn("मैं कैसे भुगतान करूं?").await;

        assert_eq!(context, KnowledgeContext::NotFound { language: Language::Hindi });
        assert!(context.prompt_note().contains("human agent"));
        assert_eq!(retriever.seen_language.lock().unwrap().as_deref(), Some("hi"));
    }

    #[tokio::test]
    async fn test_failure_degrades_to_unavailable() {
        let retriever = Arc::new(ScriptedRetriever::new(Err("provider timeout")));
        let enricher = FaqContextEnricher::new(retriever, 3);

        let context = enricher.context_for_turn("battery swap not working").await;

        assert_eq!(context, KnowledgeContext::Unavailable { language: Language::English });
        assert!(context.prompt_note().is_empty());
    }

    #[tokio::test]
    async fn test_blank_turn_skips_lookup() {
        let retriever = Arc::new(ScriptedRetriever::new(Ok("unused")));
        let enricher = FaqContextEnricher::new(retriever.clone(), 3);

        let context = enricher.context_for_turn("  ").await;

        assert!(matches!(context, KnowledgeContext::Unavailable { .. }));
        assert!(retriever.seen_language.lock().unwrap().is_none());
    }
}
