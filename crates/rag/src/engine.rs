//! FAQ Retrieval Engine
//!
//! Loads an index artifact once and answers queries against it. The loaded
//! state is never mutated, so one engine behind an `Arc` serves any number of
//! concurrent queries.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;

use voice_faq_config::{RetrievalConfig, SearchStrategy};
use voice_faq_core::{FaqMatch, FaqRetriever, Language, RecordMetadata, NO_MATCHES_SENTINEL};

use crate::artifact::{IndexArtifact, IndexPaths};
use crate::embeddings::{check_embedding, EmbeddingProvider};
use crate::flat_index::{FlatL2Index, NearestNeighborIndex, Neighbor};
use crate::RagError;

/// Bounded relevance from squared L2 distance: `1 / (1 + d)`.
///
/// Monotonically decreasing, in `(0, 1]` for finite distances, exactly `1.0`
/// at distance zero. A NaN distance counts as no relevance (`0.0`). A ranking
/// aid, not a probability.
pub fn similarity_from_distance(distance: f32) -> f32 {
    if distance.is_nan() {
        return 0.0;
    }
    1.0 / (1.0 + distance.max(0.0))
}

/// Render matches as a numbered plain-text block for prompt injection
///
/// Corpus text is copied verbatim; an empty slice yields the sentinel.
pub fn format_context(matches: &[FaqMatch]) -> String {
    if matches.is_empty() {
        return NO_MATCHES_SENTINEL.to_string();
    }

    let blocks: Vec<String> = matches
        .iter()
        .enumerate()
        .map(|(i, m)| {
            format!(
                "{}. Category: {}\n   Q: {}\n   A: {}\n   (Relevance: {:.2})",
                i + 1,
                m.category,
                m.question,
                m.answer,
                m.similarity_score
            )
        })
        .collect();

    format!("Here are the most relevant FAQs:\n\n\n{}", blocks.join("\n\n"))
}

/// Language filter parsed from the caller's hint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LanguageFilter {
    Any,
    Only(Language),
    /// A code no record can carry
    Unsupported,
}

impl LanguageFilter {
    fn parse(language: Option<&str>) -> Self {
        match language.map(str::trim) {
            None | Some("") => Self::Any,
            Some(code) => Language::from_code(code).map_or(Self::Unsupported, Self::Only),
        }
    }
}

/// Read-only retrieval engine over a loaded artifact
pub struct FaqRetrievalEngine {
    embedder: Arc<dyn EmbeddingProvider>,
    index: FlatL2Index,
    records: Vec<RecordMetadata>,
    /// Record positions per language, ascending
    partitions: BTreeMap<Language, Vec<usize>>,
    provider: String,
    config: RetrievalConfig,
}

impl FaqRetrievalEngine {
    /// Load the artifact pair from disk
    ///
    /// Fails fast: a missing file, a mismatched pair, or an embedder that is
    /// not the one the index was built with all refuse to produce an engine.
    pub fn load(
        paths: &IndexPaths,
        embedder: Arc<dyn EmbeddingProvider>,
        config: RetrievalConfig,
    ) -> Result<Self, RagError> {
        let artifact = IndexArtifact::read(paths)?;
        let engine = Self::from_artifact(artifact, embedder, config)?;

        tracing::info!(
            index = %paths.dir.display(),
            records = engine.len(),
            dimension = engine.dimension(),
            provider = %engine.provider(),
            strategy = ?engine.config.strategy,
            "Loaded FAQ index"
        );

        Ok(engine)
    }

    /// Wrap an in-memory artifact
    pub fn from_artifact(
        artifact: IndexArtifact,
        embedder: Arc<dyn EmbeddingProvider>,
        config: RetrievalConfig,
    ) -> Result<Self, RagError> {
        let embedder_id = embedder.provider_id();
        if artifact.provider != embedder_id {
            return Err(RagError::ProviderMismatch {
                index: artifact.provider,
                embedder: embedder_id,
            });
        }
        if artifact.dimension != embedder.dimension() {
            return Err(RagError::DimensionMismatch {
                expected: artifact.dimension,
                actual: embedder.dimension(),
            });
        }

        let index = FlatL2Index::from_flat(artifact.dimension, artifact.vectors)?;
        if index.len() != artifact.records.len() {
            return Err(RagError::CorruptIndex(format!(
                "{} vectors for {} metadata records",
                index.len(),
                artifact.records.len()
            )));
        }

        let mut partitions: BTreeMap<Language, Vec<usize>> = BTreeMap::new();
        for (position, record) in artifact.records.iter().enumerate() {
            partitions.entry(record.language).or_default().push(position);
        }

        Ok(Self {
            embedder,
            index,
            records: artifact.records,
            partitions,
            provider: artifact.provider,
            config,
        })
    }

    /// Number of indexed records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn dimension(&self) -> usize {
        self.index.dimension()
    }

    /// Provider the index was built with
    pub fn provider(&self) -> &str {
        &self.provider
    }

    /// Configured default `top_k`
    pub fn default_top_k(&self) -> usize {
        self.config.top_k
    }

    /// Records per language
    pub fn language_counts(&self) -> BTreeMap<Language, usize> {
        self.partitions
            .iter()
            .map(|(language, positions)| (*language, positions.len()))
            .collect()
    }

    /// Ranked, language-filtered matches, nearest first
    ///
    /// `language` of `None` or `""` searches all records. An unsupported code,
    /// a blank query or `top_k == 0` returns an empty list without calling the
    /// embedding provider.
    pub async fn search(
        &self,
        query: &str,
        language: Option<&str>,
        top_k: usize,
    ) -> Result<Vec<FaqMatch>, RagError> {
        let filter = LanguageFilter::parse(language);
        if top_k == 0 || query.trim().is_empty() || filter == LanguageFilter::Unsupported {
            tracing::debug!(
                top_k,
                language = ?language,
                "Skipping FAQ search with nothing to match"
            );
            return Ok(Vec::new());
        }

        let query_embedding = self.embedder.embed(query).await?;
        check_embedding(&query_embedding, self.dimension())?;

        let neighbors = self.nearest(&query_embedding, filter, top_k)?;

        let matches: Vec<FaqMatch> = neighbors
            .into_iter()
            .map(|n| {
                FaqMatch::from_record(
                    &self.records[n.position],
                    similarity_from_distance(n.distance),
                )
            })
            .collect();

        tracing::debug!(
            language = ?language,
            top_k,
            results = matches.len(),
            best = ?matches.first().map(|m| m.similarity_score),
            "FAQ search complete"
        );

        Ok(matches)
    }

    /// Matches rendered for prompt injection, or the sentinel when empty
    pub async fn get_context_for_llm(
        &self,
        query: &str,
        language: Option<&str>,
        top_k: usize,
    ) -> Result<String, RagError> {
        let matches = self.search(query, language, top_k).await?;
        Ok(format_context(&matches))
    }

    fn nearest(
        &self,
        query: &[f32],
        filter: LanguageFilter,
        top_k: usize,
    ) -> Result<Vec<Neighbor>, RagError> {
        let language = match filter {
            LanguageFilter::Any => return self.index.search(query, top_k),
            LanguageFilter::Only(language) => language,
            LanguageFilter::Unsupported => return Ok(Vec::new()),
        };

        match self.config.strategy {
            SearchStrategy::Partitioned => match self.partitions.get(&language) {
                Some(positions) => self.index.search_subset(query, top_k, positions),
                None => Ok(Vec::new()),
            },
            SearchStrategy::OverFetch => {
                let window = top_k.saturating_mul(self.config.overfetch_factor.max(1));
                let candidates = self.index.search(query, window)?;
                Ok(candidates
                    .into_iter()
                    .filter(|n| self.records[n.position].language == language)
                    .take(top_k)
                    .collect())
            },
        }
    }
}

#[async_trait]
impl FaqRetriever for FaqRetrievalEngine {
    async fn search(
        &self,
        query: &str,
        language: Option<&str>,
        top_k: usize,
    ) -> voice_faq_core::Result<Vec<FaqMatch>> {
        Ok(FaqRetrievalEngine::search(self, query, language, top_k).await?)
    }

    async fn get_context_for_llm(
        &self,
        query: &str,
        language: Option<&str>,
        top_k: usize,
    ) -> voice_faq_core::Result<String> {
        Ok(FaqRetrievalEngine::get_context_for_llm(self, query, language, top_k).await?)
    }

    fn name(&self) -> &str {
        "faq-flat-l2"
    }
}
