use std::io::Cursor;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::command::Language;

/// Audio container formats the system understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioFormat {
    Wav,
    M4a,
}

impl AudioFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            AudioFormat::Wav => "wav",
            AudioFormat::M4a => "m4a",
        }
    }
}

impl std::fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Properties read from a WAV payload's header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavInfo {
    pub sample_rate: u32,
    pub channels: u16,
    pub bits_per_sample: u16,
    pub duration_ms: u64,
}

impl WavInfo {
    /// Parse the container header of a WAV payload. `None` when the bytes do
    /// not form a readable WAV file.
    pub fn probe(bytes: &[u8]) -> Option<Self> {
        let reader = hound::WavReader::new(Cursor::new(bytes)).ok()?;
        let spec = reader.spec();
        let frames = reader.duration() as u64;
        let duration_ms = if spec.sample_rate == 0 {
            0
        } else {
            frames * 1000 / spec.sample_rate as u64
        };
        Some(Self {
            sample_rate: spec.sample_rate,
            channels: spec.channels,
            bits_per_sample: spec.bits_per_sample,
            duration_ms,
        })
    }
}

/// Metadata describing one synthesized audio payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactMetadata {
    pub language: Language,
    pub intent: String,
    pub variation_id: String,
    pub voice_id: String,
    pub format: AudioFormat,
    pub sample_rate: u32,
    pub channels: u16,
    pub bits_per_sample: u16,
    pub duration_ms: u64,
    pub size_bytes: usize,
    pub created_at: DateTime<Utc>,
}

/// One synthesized audio payload plus its metadata. Its canonical relative
/// path is derived from (language, intent, variation_id, voice_id) and is
/// the artifact's identity in storage.
#[derive(Debug, Clone)]
pub struct Artifact {
    pub id: Uuid,
    pub bytes: Vec<u8>,
    pub metadata: ArtifactMetadata,
}

impl Artifact {
    /// Build an artifact from a WAV payload, probing the container for its
    /// audio properties. Unreadable payloads still produce an artifact (with
    /// zeroed audio properties) so the validator can reject them with a
    /// proper reason instead of the construction failing.
    pub fn from_wav(
        bytes: Vec<u8>,
        language: Language,
        intent: impl Into<String>,
        variation_id: impl Into<String>,
        voice_id: impl Into<String>,
    ) -> Self {
        let info = WavInfo::probe(&bytes);
        let metadata = ArtifactMetadata {
            language,
            intent: intent.into(),
            variation_id: variation_id.into(),
            voice_id: voice_id.into(),
            format: AudioFormat::Wav,
            sample_rate: info.map(|i| i.sample_rate).unwrap_or(0),
            channels: info.map(|i| i.channels).unwrap_or(0),
            bits_per_sample: info.map(|i| i.bits_per_sample).unwrap_or(0),
            duration_ms: info.map(|i| i.duration_ms).unwrap_or(0),
            size_bytes: bytes.len(),
            created_at: Utc::now(),
        };
        Self {
            id: Uuid::new_v4(),
            bytes,
            metadata,
        }
    }
}
