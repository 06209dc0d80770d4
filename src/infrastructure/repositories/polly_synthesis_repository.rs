use std::io::Cursor;
use std::sync::Arc;

use async_trait::async_trait;
use aws_sdk_polly::{
    types::{Engine, OutputFormat, VoiceId},
    Client as PollyClient,
};

use super::synthesis_repository::{SynthesisError, SynthesisRepository};
use crate::domain::command::Language;
use crate::domain::voice::VoiceProfile;

/// Polly PCM output is 16-bit signed little-endian at the requested rate.
const OUTPUT_SAMPLE_RATE: u32 = 16000;
const OUTPUT_BITS_PER_SAMPLE: u16 = 16;

/// Voices that support the neural engine, per AWS Polly documentation.
const NEURAL_VOICES: &[&str] = &[
    "Joanna", "Matthew", "Ivy", "Kendra", "Kimberly", "Salli", "Joey", "Justin", "Kevin",
    "Takumi", "Kazuha", "Tomoko", "Seoyeon",
];

/// AWS Polly implementation of the synthesis repository. Requests raw PCM
/// and wraps it into a 16 kHz mono WAV container.
pub struct PollySynthesisRepository {
    polly_client: Arc<PollyClient>,
}

impl PollySynthesisRepository {
    pub fn new(polly_client: Arc<PollyClient>) -> Self {
        Self { polly_client }
    }

    fn engine_for_voice(voice: &str) -> Engine {
        if NEURAL_VOICES.contains(&voice) {
            Engine::Neural
        } else {
            Engine::Standard
        }
    }

    /// Wrap raw 16-bit mono PCM into a WAV container.
    fn pcm_to_wav(pcm: &[u8]) -> Result<Vec<u8>, SynthesisError> {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: OUTPUT_SAMPLE_RATE,
            bits_per_sample: OUTPUT_BITS_PER_SAMPLE,
            sample_format: hound::SampleFormat::Int,
        };

        let mut buffer = Cursor::new(Vec::new());
        {
            let mut writer = hound::WavWriter::new(&mut buffer, spec)
                .map_err(|e| SynthesisError::MalformedAudio(e.to_string()))?;
            for frame in pcm.chunks_exact(2) {
                let sample = i16::from_le_bytes([frame[0], frame[1]]);
                writer
                    .write_sample(sample)
                    .map_err(|e| SynthesisError::MalformedAudio(e.to_string()))?;
            }
            writer
                .finalize()
                .map_err(|e| SynthesisError::MalformedAudio(e.to_string()))?;
        }
        Ok(buffer.into_inner())
    }
}

#[async_trait]
impl SynthesisRepository for PollySynthesisRepository {
    async fn synthesize(
        &self,
        text: &str,
        language: Language,
        voice: &VoiceProfile,
    ) -> Result<Vec<u8>, SynthesisError> {
        let start_time = std::time::Instant::now();

        let voice_id = VoiceId::from(voice.provider_voice.as_str());
        let engine = Self::engine_for_voice(&voice.provider_voice);

        tracing::info!(
            language = %language,
            voice = %voice.provider_voice,
            engine = ?engine,
            output_format = "Pcm",
            text_length = text.len(),
            "Calling AWS Polly synthesize_speech"
        );

        let result = self
            .polly_client
            .synthesize_speech()
            .text(text)
            .voice_id(voice_id)
            .output_format(OutputFormat::Pcm)
            .sample_rate(OUTPUT_SAMPLE_RATE.to_string())
            .engine(engine)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(
                    error = ?e,
                    language = %language,
                    voice = %voice.provider_voice,
                    text_length = text.len(),
                    "AWS Polly synthesize_speech failed"
                );
                SynthesisError::Provider(format!("AWS Polly error: {e}"))
            })?;

        let audio_stream = result.audio_stream.collect().await.map_err(|e| {
            SynthesisError::Provider(format!("failed to read Polly audio stream: {e}"))
        })?;
        let pcm = audio_stream.into_bytes().to_vec();
        let wav = Self::pcm_to_wav(&pcm)?;

        tracing::info!(
            provider = "polly",
            voice = %voice.provider_voice,
            latency_ms = start_time.elapsed().as_millis(),
            pcm_size_bytes = pcm.len(),
            wav_size_bytes = wav.len(),
            "Speech synthesis completed"
        );

        Ok(wav)
    }
}
