#[derive(Debug, Clone, thiserror::Error)]
pub enum ValidationError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("unsupported language: {0}")]
    UnsupportedLanguage(String),

    #[error("intent cannot be empty")]
    EmptyIntent,

    #[error("phrase is empty after sanitization")]
    EmptyPhrase,
}
