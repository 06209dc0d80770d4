use async_trait::async_trait;

use crate::domain::command::Language;
use crate::domain::voice::VoiceProfile;

#[derive(Debug, thiserror::Error)]
pub enum SynthesisError {
    #[error("provider error: {0}")]
    Provider(String),

    #[error("malformed audio payload: {0}")]
    MalformedAudio(String),
}

/// Repository for speech synthesis.
/// Abstracts the underlying TTS provider (AWS Polly, Narakeet, ...).
///
/// Implementations return a complete 16-bit mono WAV payload ready for
/// validation and storage.
#[async_trait]
pub trait SynthesisRepository: Send + Sync {
    /// Synthesize `text` with the given voice.
    ///
    /// # Errors
    /// Returns [`SynthesisError`] if synthesis fails or the provider is
    /// unavailable.
    async fn synthesize(
        &self,
        text: &str,
        language: Language,
        voice: &VoiceProfile,
    ) -> Result<Vec<u8>, SynthesisError>;
}
