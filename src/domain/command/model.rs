use serde::{Deserialize, Serialize};

use super::language::Language;

/// One validated voice-command input row.
///
/// Constructed only by [`CommandValidator`](super::validator::CommandValidator)
/// and never mutated afterwards: the intent is upper-cased, the phrase is
/// sanitized, and the language is a member of the supported set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Command {
    intent: String,
    phrase: String,
    language: Language,
}

impl Command {
    pub(super) fn new(intent: String, phrase: String, language: Language) -> Self {
        Self {
            intent,
            phrase,
            language,
        }
    }

    pub fn intent(&self) -> &str {
        &self.intent
    }

    pub fn phrase(&self) -> &str {
        &self.phrase
    }

    pub fn language(&self) -> Language {
        self.language
    }
}

impl std::fmt::Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} [{}] \"{}\"", self.intent, self.language, self.phrase)
    }
}
