#[derive(Debug, Clone, thiserror::Error)]
pub enum ArtifactRejected {
    #[error("payload of {size} bytes exceeds ceiling of {ceiling} bytes")]
    TooLarge { size: usize, ceiling: usize },

    #[error("format {0} is not in the supported set")]
    UnsupportedFormat(String),

    #[error("payload does not parse as declared format: {0}")]
    MalformedContainer(String),

    #[error("metadata mismatch: {0}")]
    MetadataMismatch(String),

    #[error("sample rate {0} Hz is not allowed")]
    UnsupportedSampleRate(u32),

    #[error("expected {expected} channel(s), payload has {actual}")]
    BadChannelCount { expected: u16, actual: u16 },
}
