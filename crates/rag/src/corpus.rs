//! FAQ corpus loader
//!
//! Reads bilingual FAQ entries from a JSON or YAML knowledge file. Either a
//! bare array of entries or an object with a `faqs` array is accepted.

use serde::{Deserialize, Serialize};
use std::path::Path;

use voice_faq_core::FaqEntry;

use crate::RagError;

/// Knowledge file with an explicit envelope
#[derive(Debug, Serialize, Deserialize)]
pub struct FaqCorpusFile {
    /// Version for format compatibility
    #[serde(default)]
    pub version: Option<String>,
    pub faqs: Vec<FaqEntry>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CorpusShape {
    Bare(Vec<FaqEntry>),
    Wrapped(FaqCorpusFile),
}

impl From<CorpusShape> for Vec<FaqEntry> {
    fn from(shape: CorpusShape) -> Self {
        match shape {
            CorpusShape::Bare(entries) => entries,
            CorpusShape::Wrapped(file) => file.faqs,
        }
    }
}

/// Load a corpus file, keeping entry order
///
/// Field emptiness is not checked here; the builder rejects malformed
/// entries before any embedding work starts.
pub fn load_corpus(path: &Path) -> Result<Vec<FaqEntry>, RagError> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| RagError::Corpus(format!("Failed to read {}: {}", path.display(), e)))?;

    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    let shape: CorpusShape = match extension {
        "json" => serde_json::from_str(&content)
            .map_err(|e| RagError::Corpus(format!("JSON parse error: {}", e)))?,
        "yaml" | "yml" => serde_yaml::from_str(&content)
            .map_err(|e| RagError::Corpus(format!("YAML parse error: {}", e)))?,
        _ => {
            return Err(RagError::Corpus(format!(
                "Unsupported file type: {}",
                extension
            )))
        },
    };

    let entries: Vec<FaqEntry> = shape.into();

    tracing::info!(
        file = %path.display(),
        entries = entries.len(),
        "Loaded FAQ corpus"
    );

    Ok(entries)
}
