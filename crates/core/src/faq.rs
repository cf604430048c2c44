//! FAQ corpus and retrieval types

use serde::{Deserialize, Deserializer, Serialize};

use crate::language::Language;

/// One bilingual question/answer pair from the knowledge base
///
/// Absent fields deserialize as empty strings so the index builder can report
/// them as malformed entries with their position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaqEntry {
    /// Stable identifier (numeric ids in source files are read as strings)
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub question_en: String,
    #[serde(default)]
    pub answer_en: String,
    #[serde(default)]
    pub question_hi: String,
    #[serde(default)]
    pub answer_hi: String,
}

impl FaqEntry {
    /// Question text for a language
    pub fn question(&self, language: Language) -> &str {
        match language {
            Language::English => &self.question_en,
            Language::Hindi => &self.question_hi,
        }
    }

    /// Answer text for a language
    pub fn answer(&self, language: Language) -> &str {
        match language {
            Language::English => &self.answer_en,
            Language::Hindi => &self.answer_hi,
        }
    }

    /// Text submitted to the embedding provider: question and answer joined
    /// by a single space, otherwise untouched.
    pub fn embedding_text(&self, language: Language) -> String {
        format!("{} {}", self.question(language), self.answer(language))
    }

    /// Required fields as `(name, value)` pairs, in declaration order
    pub fn fields(&self) -> [(&'static str, &str); 6] {
        [
            ("id", &self.id),
            ("category", &self.category),
            ("question_en", &self.question_en),
            ("answer_en", &self.answer_en),
            ("question_hi", &self.question_hi),
            ("answer_hi", &self.answer_hi),
        ]
    }

    /// Name of the first missing or blank field, if any
    pub fn first_blank_field(&self) -> Option<&'static str> {
        self.fields()
            .into_iter()
            .find(|(_, value)| value.trim().is_empty())
            .map(|(name, _)| name)
    }

    /// Language-specific projection of this entry
    pub fn record(&self, language: Language) -> RecordMetadata {
        RecordMetadata {
            id: self.id.clone(),
            category: self.category.clone(),
            language,
            question: self.question(language).to_string(),
            answer: self.answer(language).to_string(),
        }
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Str(String),
        Int(i64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Str(s) => s,
        Raw::Int(n) => n.to_string(),
    })
}

/// Metadata of one indexed record (everything except the vector)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordMetadata {
    pub id: String,
    pub category: String,
    pub language: Language,
    pub question: String,
    pub answer: String,
}

/// A retrieved FAQ with its relevance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaqMatch {
    pub id: String,
    pub category: String,
    pub question: String,
    pub answer: String,
    pub language: Language,
    /// `1 / (1 + d)` for squared Euclidean distance `d`; in `(0, 1]`.
    /// A monotone transform of distance, not a probability.
    pub similarity_score: f32,
}

impl FaqMatch {
    pub fn from_record(record: &RecordMetadata, similarity_score: f32) -> Self {
        Self {
            id: record.id.clone(),
            category: record.category.clone(),
            question: record.question.clone(),
            answer: record.answer.clone(),
            language: record.language,
            similarity_score,
        }
    }
}
