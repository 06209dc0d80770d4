use std::path::PathBuf;

use async_trait::async_trait;
use tokio::process::Command;

use crate::domain::artifact::AudioFormat;

const TARGET_SAMPLE_RATE: u32 = 16000;

#[derive(Debug, thiserror::Error)]
pub enum TranscodeError {
    #[error("transcoder binary not found: {0}")]
    MissingBinary(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("transcode command failed: {0}")]
    CommandFailed(String),
}

/// Optional pre-storage normalization step.
#[async_trait]
pub trait AudioTranscoder: Send + Sync {
    async fn transcode(
        &self,
        audio: &[u8],
        target: AudioFormat,
    ) -> Result<Vec<u8>, TranscodeError>;
}

/// Shells out to ffmpeg to normalize audio to 16 kHz mono in the target
/// container.
pub struct FfmpegTranscoder {
    binary: PathBuf,
}

impl FfmpegTranscoder {
    /// Locate ffmpeg on PATH.
    pub fn discover() -> Result<Self, TranscodeError> {
        let binary =
            which::which("ffmpeg").map_err(|e| TranscodeError::MissingBinary(e.to_string()))?;
        Ok(Self { binary })
    }

    fn codec_for(target: AudioFormat) -> &'static str {
        match target {
            AudioFormat::Wav => "pcm_s16le",
            AudioFormat::M4a => "aac",
        }
    }
}

#[async_trait]
impl AudioTranscoder for FfmpegTranscoder {
    async fn transcode(
        &self,
        audio: &[u8],
        target: AudioFormat,
    ) -> Result<Vec<u8>, TranscodeError> {
        let workdir = tempfile::tempdir()?;
        let input_path = workdir.path().join("input.audio");
        let output_path = workdir.path().join(format!("output.{}", target.as_str()));

        tokio::fs::write(&input_path, audio).await?;

        let output = Command::new(&self.binary)
            .arg("-i")
            .arg(&input_path)
            .args(["-ar", &TARGET_SAMPLE_RATE.to_string()])
            .args(["-ac", "1"])
            .args(["-acodec", Self::codec_for(target)])
            .arg("-y")
            .arg(&output_path)
            .output()
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            tracing::error!(
                status = ?output.status.code(),
                stderr = %stderr,
                "ffmpeg transcode failed"
            );
            return Err(TranscodeError::CommandFailed(stderr.into_owned()));
        }

        let converted = tokio::fs::read(&output_path).await?;
        tracing::debug!(
            input_size = audio.len(),
            output_size = converted.len(),
            target = %target,
            "Audio transcode completed"
        );
        Ok(converted)
    }
}
