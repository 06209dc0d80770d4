use std::time::Duration;

use async_trait::async_trait;

use super::synthesis_repository::{SynthesisError, SynthesisRepository};
use crate::domain::command::Language;
use crate::domain::voice::VoiceProfile;

const DEFAULT_BASE_URL: &str = "https://api.narakeet.com";
const MAX_ATTEMPTS: u32 = 3;
const RETRY_BACKOFF: Duration = Duration::from_millis(500);

/// Narakeet REST implementation of the synthesis repository. The API
/// returns a complete WAV payload per request.
pub struct NarakeetSynthesisRepository {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl NarakeetSynthesisRepository {
    pub fn new(http: reqwest::Client, api_key: String) -> Self {
        Self::with_base_url(http, api_key, DEFAULT_BASE_URL.to_string())
    }

    pub fn with_base_url(http: reqwest::Client, api_key: String, base_url: String) -> Self {
        Self {
            http,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn endpoint(&self, voice: &str) -> String {
        format!("{}/text-to-speech/wav?voice={}", self.base_url, voice)
    }

    async fn request_once(&self, url: &str, text: &str) -> Result<Vec<u8>, SynthesisError> {
        let response = self
            .http
            .post(url)
            .header("x-api-key", &self.api_key)
            .header("content-type", "text/plain")
            .body(text.to_string())
            .send()
            .await
            .map_err(|e| SynthesisError::Provider(format!("Narakeet request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SynthesisError::Provider(format!(
                "Narakeet returned {status}: {body}"
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| SynthesisError::Provider(format!("failed to read Narakeet body: {e}")))?;
        if bytes.is_empty() {
            return Err(SynthesisError::MalformedAudio(
                "Narakeet returned an empty payload".to_string(),
            ));
        }
        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl SynthesisRepository for NarakeetSynthesisRepository {
    async fn synthesize(
        &self,
        text: &str,
        language: Language,
        voice: &VoiceProfile,
    ) -> Result<Vec<u8>, SynthesisError> {
        let start_time = std::time::Instant::now();
        let url = self.endpoint(&voice.provider_voice);

        let mut last_error = None;
        for attempt in 0..MAX_ATTEMPTS {
            if attempt > 0 {
                tokio::time::sleep(RETRY_BACKOFF * attempt).await;
            }

            match self.request_once(&url, text).await {
                Ok(audio) => {
                    tracing::info!(
                        provider = "narakeet",
                        language = %language,
                        voice = %voice.provider_voice,
                        latency_ms = start_time.elapsed().as_millis(),
                        audio_size_bytes = audio.len(),
                        attempts = attempt + 1,
                        "Speech synthesis completed"
                    );
                    return Ok(audio);
                }
                Err(e) => {
                    tracing::warn!(
                        voice = %voice.provider_voice,
                        attempt = attempt + 1,
                        error = %e,
                        "Narakeet synthesis attempt failed"
                    );
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| {
            SynthesisError::Provider("Narakeet synthesis failed with no attempts".to_string())
        }))
    }
}
