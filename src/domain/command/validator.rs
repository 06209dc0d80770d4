use serde::{Deserialize, Serialize};

use super::error::ValidationError;
use super::language::Language;
use super::model::Command;

/// One raw input row, as read from the input file. All fields optional so
/// that missing columns surface as validation errors rather than read errors.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawCommandRow {
    pub intent: Option<String>,
    pub phrase: Option<String>,
    pub language: Option<String>,
}

/// Validates and normalizes raw input rows into [`Command`] records.
///
/// Rows failing validation are dropped from the batch entirely and do not
/// consume a worker slot.
#[derive(Debug, Clone, Default)]
pub struct CommandValidator;

impl CommandValidator {
    pub fn new() -> Self {
        Self
    }

    pub fn validate(&self, row: &RawCommandRow) -> Result<Command, ValidationError> {
        let intent = row
            .intent
            .as_deref()
            .ok_or(ValidationError::MissingField("intent"))?;
        let phrase = row
            .phrase
            .as_deref()
            .ok_or(ValidationError::MissingField("phrase"))?;
        let language = row
            .language
            .as_deref()
            .ok_or(ValidationError::MissingField("language"))?;

        let language = Language::parse(language)?;

        let intent = intent.trim().to_uppercase();
        if intent.is_empty() {
            return Err(ValidationError::EmptyIntent);
        }

        let phrase = Self::sanitize_phrase(phrase);
        if phrase.is_empty() {
            return Err(ValidationError::EmptyPhrase);
        }

        Ok(Command::new(intent, phrase, language))
    }

    /// Strip non-alphanumeric characters (spaces excepted) and collapse
    /// whitespace runs into single spaces.
    fn sanitize_phrase(phrase: &str) -> String {
        let stripped: String = phrase
            .chars()
            .filter(|c| c.is_alphanumeric() || c.is_whitespace())
            .collect();
        stripped.split_whitespace().collect::<Vec<_>>().join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn row(intent: &str, phrase: &str, language: &str) -> RawCommandRow {
        RawCommandRow {
            intent: Some(intent.to_string()),
            phrase: Some(phrase.to_string()),
            language: Some(language.to_string()),
        }
    }

    #[test]
    fn test_validate_normalizes_fields() {
        let validator = CommandValidator::new();
        let command = validator
            .validate(&row(" lights_on ", "Turn  on the   lights!", "English"))
            .unwrap();

        assert_eq!(command.intent(), "LIGHTS_ON");
        assert_eq!(command.phrase(), "Turn on the lights");
        assert_eq!(command.language(), Language::English);
    }

    #[test]
    fn test_validate_rejects_missing_fields() {
        let validator = CommandValidator::new();
        let mut missing = row("LIGHTS_ON", "turn on the lights", "english");
        missing.phrase = None;

        let err = validator.validate(&missing).unwrap_err();
        assert!(matches!(err, ValidationError::MissingField("phrase")));
    }

    #[test]
    fn test_validate_rejects_unsupported_language() {
        let validator = CommandValidator::new();
        let err = validator
            .validate(&row("LIGHTS_ON", "turn on the lights", "german"))
            .unwrap_err();
        assert!(matches!(err, ValidationError::UnsupportedLanguage(_)));
    }

    #[test]
    fn test_validate_rejects_phrase_with_no_content() {
        let validator = CommandValidator::new();
        let err = validator
            .validate(&row("LIGHTS_ON", "!!! ... ???", "english"))
            .unwrap_err();
        assert!(matches!(err, ValidationError::EmptyPhrase));
    }

    #[test]
    fn test_validate_is_idempotent() {
        let validator = CommandValidator::new();
        let first = validator
            .validate(&row("lights_on", "Turn, on; the lights", "ENGLISH"))
            .unwrap();

        // Feeding the validated command back through produces an equal command.
        let second = validator
            .validate(&row(
                first.intent(),
                first.phrase(),
                first.language().as_str(),
            ))
            .unwrap();

        assert_eq!(first, second);
    }
}
