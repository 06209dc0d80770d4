use async_trait::async_trait;

use crate::domain::command::Language;

#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("provider error: {0}")]
    Provider(String),

    #[error("provider returned an empty response")]
    EmptyResponse,
}

/// Repository for paraphrase generation.
/// Abstracts the underlying text-generation provider.
///
/// Implementations are responsible for prompt construction, response
/// parsing, and capping the result at the requested count. The
/// intent-preservation filter is applied by the pipeline, not here.
#[async_trait]
pub trait VariationRepository: Send + Sync {
    /// Generate up to `max_variations` textual paraphrases of `phrase`.
    ///
    /// # Errors
    /// Returns [`GenerationError`] on provider or network failure.
    async fn generate(
        &self,
        phrase: &str,
        language: Language,
        max_variations: usize,
    ) -> Result<Vec<String>, GenerationError>;
}
