use serde::{Deserialize, Serialize};

use super::error::ValidationError;

/// Languages supported by the voice command generator.
///
/// Path components and input rows use the lower-case full name
/// ("english", "korean", "japanese").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    #[serde(rename = "english")]
    English,
    #[serde(rename = "korean")]
    Korean,
    #[serde(rename = "japanese")]
    Japanese,
}

impl Language {
    pub const ALL: [Language; 3] = [Language::English, Language::Korean, Language::Japanese];

    pub fn as_str(&self) -> &'static str {
        match self {
            Language::English => "english",
            Language::Korean => "korean",
            Language::Japanese => "japanese",
        }
    }

    /// Parse a language name, case-insensitively.
    pub fn parse(value: &str) -> Result<Self, ValidationError> {
        match value.trim().to_lowercase().as_str() {
            "english" => Ok(Language::English),
            "korean" => Ok(Language::Korean),
            "japanese" => Ok(Language::Japanese),
            other => Err(ValidationError::UnsupportedLanguage(other.to_string())),
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!(Language::parse("English").unwrap(), Language::English);
        assert_eq!(Language::parse("  KOREAN ").unwrap(), Language::Korean);
        assert_eq!(Language::parse("japanese").unwrap(), Language::Japanese);
    }

    #[test]
    fn test_parse_rejects_unsupported() {
        let err = Language::parse("klingon").unwrap_err();
        assert!(matches!(err, ValidationError::UnsupportedLanguage(_)));
    }

    #[test]
    fn test_display_matches_path_component() {
        for language in Language::ALL {
            assert_eq!(language.to_string(), language.as_str());
        }
    }
}
