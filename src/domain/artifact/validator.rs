use super::error::ArtifactRejected;
use super::model::{Artifact, AudioFormat, WavInfo};
use crate::infrastructure::storage::path;

/// Limits enforced before an artifact is allowed into storage.
#[derive(Debug, Clone)]
pub struct ValidatorLimits {
    pub max_bytes: usize,
    pub allowed_formats: Vec<AudioFormat>,
    pub allowed_sample_rates: Vec<u32>,
    pub required_channels: u16,
}

impl Default for ValidatorLimits {
    fn default() -> Self {
        Self {
            max_bytes: 10 * 1024 * 1024,
            allowed_formats: vec![AudioFormat::Wav],
            allowed_sample_rates: vec![16000, 22050, 44100],
            required_channels: 1,
        }
    }
}

/// Gates produced audio payloads before persistence. Checks run in a fixed
/// order and the first failure determines the rejection reason. Rejections
/// are per-artifact and never batch-fatal.
#[derive(Debug, Clone, Default)]
pub struct ArtifactValidator {
    limits: ValidatorLimits,
}

impl ArtifactValidator {
    pub fn new(limits: ValidatorLimits) -> Self {
        Self { limits }
    }

    pub fn validate(&self, artifact: &Artifact) -> Result<(), ArtifactRejected> {
        let metadata = &artifact.metadata;

        // 1. Size ceiling.
        if artifact.bytes.len() > self.limits.max_bytes {
            return Err(ArtifactRejected::TooLarge {
                size: artifact.bytes.len(),
                ceiling: self.limits.max_bytes,
            });
        }

        // 2. Declared format must be in the supported set.
        if !self.limits.allowed_formats.contains(&metadata.format) {
            return Err(ArtifactRejected::UnsupportedFormat(
                metadata.format.to_string(),
            ));
        }

        // 3. Container inspection must match the declared format.
        let info = match metadata.format {
            AudioFormat::Wav => WavInfo::probe(&artifact.bytes).ok_or_else(|| {
                ArtifactRejected::MalformedContainer("not a readable WAV payload".to_string())
            })?,
            AudioFormat::M4a => {
                // An MP4 container starts with an ftyp box at offset 4.
                if artifact.bytes.len() < 12 || &artifact.bytes[4..8] != b"ftyp" {
                    return Err(ArtifactRejected::MalformedContainer(
                        "not a readable M4A payload".to_string(),
                    ));
                }
                return Ok(());
            }
        };

        if metadata.size_bytes != artifact.bytes.len() {
            return Err(ArtifactRejected::MetadataMismatch(format!(
                "declared size {} does not match payload size {}",
                metadata.size_bytes,
                artifact.bytes.len()
            )));
        }

        // 4. Sample rate and channel constraints.
        if !self.limits.allowed_sample_rates.contains(&info.sample_rate) {
            return Err(ArtifactRejected::UnsupportedSampleRate(info.sample_rate));
        }
        if info.channels != self.limits.required_channels {
            return Err(ArtifactRejected::BadChannelCount {
                expected: self.limits.required_channels,
                actual: info.channels,
            });
        }

        Ok(())
    }

    /// Shape check for an already-derived canonical path.
    pub fn validate_path(&self, relative_path: &str) -> bool {
        path::is_canonical(relative_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::artifact::model::test_support::wav_bytes;
    use crate::domain::command::Language;

    fn artifact(bytes: Vec<u8>) -> Artifact {
        Artifact::from_wav(bytes, Language::English, "LIGHTS_ON", "variation", "matt")
    }

    #[test]
    fn test_valid_wav_passes() {
        let validator = ArtifactValidator::default();
        assert!(validator.validate(&artifact(wav_bytes(16000, 1, 100))).is_ok());
    }

    #[test]
    fn test_size_ceiling_is_checked_first() {
        let validator = ArtifactValidator::new(ValidatorLimits {
            max_bytes: 16,
            ..ValidatorLimits::default()
        });
        // Oversized and malformed; the size check must win.
        let err = validator
            .validate(&artifact(vec![0u8; 64]))
            .unwrap_err();
        assert!(matches!(err, ArtifactRejected::TooLarge { .. }));
    }

    #[test]
    fn test_malformed_container_rejected() {
        let validator = ArtifactValidator::default();
        let err = validator
            .validate(&artifact(b"definitely not audio".to_vec()))
            .unwrap_err();
        assert!(matches!(err, ArtifactRejected::MalformedContainer(_)));
    }

    #[test]
    fn test_unusual_sample_rate_rejected() {
        let validator = ArtifactValidator::default();
        let err = validator
            .validate(&artifact(wav_bytes(8000, 1, 100)))
            .unwrap_err();
        assert!(matches!(err, ArtifactRejected::UnsupportedSampleRate(8000)));
    }

    #[test]
    fn test_stereo_rejected() {
        let validator = ArtifactValidator::default();
        let err = validator
            .validate(&artifact(wav_bytes(16000, 2, 100)))
            .unwrap_err();
        assert!(matches!(
            err,
            ArtifactRejected::BadChannelCount {
                expected: 1,
                actual: 2
            }
        ));
    }

    #[test]
    fn test_validate_path_shape() {
        let validator = ArtifactValidator::default();
        assert!(validator.validate_path("english/lights_on/turn-on-the-lights/matt.wav"));
        assert!(!validator.validate_path("english/lights_on/matt.wav"));
    }
}
