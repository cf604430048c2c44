//! Language definitions for the bilingual corpus
//!
//! Every FAQ entry carries an English and a Hindi variant. Queries arrive in
//! either language; the script of the utterance decides which variant to
//! retrieve.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Supported corpus languages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub enum Language {
    #[default]
    #[serde(rename = "en")]
    English,
    #[serde(rename = "hi")]
    Hindi,
}

impl Language {
    /// All languages, in indexing order
    pub const ALL: [Language; 2] = [Language::English, Language::Hindi];

    /// ISO 639-1 code
    pub fn code(&self) -> &'static str {
        match self {
            Self::English => "en",
            Self::Hindi => "hi",
        }
    }

    /// Human-readable name
    pub fn name(&self) -> &'static str {
        match self {
            Self::English => "English",
            Self::Hindi => "Hindi",
        }
    }

    /// Script the corpus text is written in
    pub fn script(&self) -> Script {
        match self {
            Self::English => Script::Latin,
            Self::Hindi => Script::Devanagari,
        }
    }

    /// Parse an ISO code. Unknown codes yield `None`.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim() {
            "en" => Some(Self::English),
            "hi" => Some(Self::Hindi),
            _ => None,
        }
    }

    /// Detect the language of an utterance.
    ///
    /// Any Devanagari code point marks the text as Hindi; everything else,
    /// including romanised Hindi, is treated as English.
    pub fn detect(text: &str) -> Self {
        if text.chars().any(Script::is_devanagari) {
            Self::Hindi
        } else {
            Self::English
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Writing scripts present in the corpus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Script {
    Latin,
    Devanagari,
}

impl Script {
    /// Devanagari block: U+0900 to U+097F
    pub fn is_devanagari(c: char) -> bool {
        ('\u{0900}'..='\u{097F}').contains(&c)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_codes() {
        assert_eq!(Language::English.code(), "en");
        assert_eq!(Language::Hindi.code(), "hi");
        assert_eq!(Language::from_code("hi"), Some(Language::Hindi));
        assert_eq!(Language::from_code(" en "), Some(Language::English));
        assert_eq!(Language::from_code("fr"), None);
        assert_eq!(Language::from_code(""), None);
    }

    #[test]
    fn test_detect_devanagari() {
        assert_eq!(Language::detect("मैं कैसे भुगतान करूं?"), Language::Hindi);
        assert_eq!(Language::detect("battery swap कहाँ है"), Language::Hindi);
        assert_eq!(Language::detect("Where is the nearest station?"), Language::English);
        assert_eq!(Language::detect("mera balance kitna hai"), Language::English);
        assert_eq!(Language::detect(""), Language::English);
    }

    #[test]
    fn test_serde_uses_codes() {
        let json = serde_json::to_string(&Language::Hindi).unwrap();
        assert_eq!(json, "\"hi\"");
        let parsed: Language = serde_json::from_str("\"en\"").unwrap();
        assert_eq!(parsed, Language::English);
    }

    #[test]
    fn test_script() {
        assert_eq!(Language::Hindi.script(), Script::Devanagari);
        assert!(Script::is_devanagari('क'));
        assert!(!Script::is_devanagari('k'));
    }
}
