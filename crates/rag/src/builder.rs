//! Index Builder
//!
//! Turns a FAQ corpus into a persisted index artifact. Every entry yields two
//! records, English then Hindi, in corpus order, so rebuilding with the same
//! corpus and a deterministic embedder reproduces the artifact byte for byte.

use std::collections::HashSet;
use std::path::PathBuf;

use voice_faq_core::{FaqEntry, Language};

use crate::artifact::{IndexArtifact, IndexPaths};
use crate::embeddings::{check_embedding, EmbeddingProvider};
use crate::flat_index::{FlatL2Index, NearestNeighborIndex};
use crate::RagError;

/// Summary of a completed build
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildReport {
    pub entries: usize,
    pub records: usize,
    pub dimension: usize,
    pub provider: String,
    pub vectors_path: PathBuf,
    pub metadata_path: PathBuf,
}

/// One-shot batch builder
pub struct IndexBuilder<'a> {
    embedder: &'a dyn EmbeddingProvider,
}

impl<'a> IndexBuilder<'a> {
    pub fn new(embedder: &'a dyn EmbeddingProvider) -> Self {
        Self { embedder }
    }

    /// Build the artifact in memory without touching the filesystem
    pub async fn embed_corpus(&self, corpus: &[FaqEntry]) -> Result<IndexArtifact, RagError> {
        validate_corpus(corpus)?;

        let dimension = self.embedder.dimension();
        let provider = self.embedder.provider_id();

        tracing::info!(
            entries = corpus.len(),
            provider = %provider,
            dimension,
            "Building FAQ index"
        );

        let mut index = FlatL2Index::new(dimension);
        let mut records = Vec::with_capacity(corpus.len() * Language::ALL.len());

        // Strictly sequential: record order is part of the artifact
        for (idx, entry) in corpus.iter().enumerate() {
            let mut batch = Vec::with_capacity(Language::ALL.len());
            for language in Language::ALL {
                let embedding = self.embedder.embed(&entry.embedding_text(language)).await?;
                check_embedding(&embedding, dimension)?;
                batch.push(embedding);
                records.push(entry.record(language));
            }
            index.add_batch(&batch)?;

            tracing::debug!(
                id = %entry.id,
                progress = idx + 1,
                total = corpus.len(),
                "Processed FAQ"
            );
        }

        Ok(IndexArtifact {
            provider,
            dimension,
            vectors: index.into_vectors(),
            records,
        })
    }

    /// Embed the corpus and write the artifact pair, creating the directory
    /// if needed.
    pub async fn build(
        &self,
        corpus: &[FaqEntry],
        paths: &IndexPaths,
    ) -> Result<BuildReport, RagError> {
        let artifact = self.embed_corpus(corpus).await?;
        artifact.write(paths)?;

        let report = BuildReport {
            entries: corpus.len(),
            records: artifact.len(),
            dimension: artifact.dimension,
            provider: artifact.provider,
            vectors_path: paths.vectors.clone(),
            metadata_path: paths.metadata.clone(),
        };

        tracing::info!(
            entries = report.entries,
            records = report.records,
            vectors = %report.vectors_path.display(),
            metadata = %report.metadata_path.display(),
            "FAQ index built"
        );

        Ok(report)
    }
}

/// Reject the whole corpus up front if any entry is incomplete or reuses
/// an id
fn validate_corpus(corpus: &[FaqEntry]) -> Result<(), RagError> {
    if corpus.is_empty() {
        return Err(RagError::MalformedEntry {
            index: 0,
            id: String::new(),
            field: "corpus",
        });
    }

    let mut seen_ids: HashSet<&str> = HashSet::with_capacity(corpus.len());
    for (index, entry) in corpus.iter().enumerate() {
        if let Some(field) = entry.first_blank_field() {
            return Err(RagError::MalformedEntry {
                index,
                id: entry.id.clone(),
                field,
            });
        }
        if !seen_ids.insert(entry.id.as_str()) {
            return Err(RagError::MalformedEntry {
                index,
                id: entry.id.clone(),
                field: "id",
            });
        }
    }

    Ok(())
}
