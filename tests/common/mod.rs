#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap};
use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use voiceforge::domain::command::Language;
use voiceforge::domain::voice::VoiceProfile;
use voiceforge::infrastructure::repositories::{
    GenerationError, SynthesisError, SynthesisRepository, VariationRepository,
};
use voiceforge::infrastructure::storage::{
    ObjectMetadata, StorageBackend, StorageError, StoredLocation,
};

/// Mono 16-bit WAV payload of the given sample rate and duration.
pub fn wav_bytes(sample_rate: u32, channels: u16, millis: u64) -> Vec<u8> {
    let spec = hound::WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut buffer = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut buffer, spec).unwrap();
        let frames = sample_rate as u64 * millis / 1000;
        for _ in 0..frames * channels as u64 {
            writer.write_sample(0i16).unwrap();
        }
        writer.finalize().unwrap();
    }
    buffer.into_inner()
}

/// Variation generator backed by a fixed phrase → variations table; phrases
/// not in the table echo back as their own single variation.
pub struct MockVariationRepository {
    by_phrase: HashMap<String, Vec<String>>,
    pub calls: AtomicUsize,
}

impl MockVariationRepository {
    pub fn echo() -> Self {
        Self {
            by_phrase: HashMap::new(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_variations(phrase: &str, variations: &[&str]) -> Self {
        let mut repo = Self::echo();
        repo.add(phrase, variations);
        repo
    }

    pub fn add(&mut self, phrase: &str, variations: &[&str]) {
        self.by_phrase.insert(
            phrase.to_string(),
            variations.iter().map(|v| v.to_string()).collect(),
        );
    }
}

#[async_trait]
impl VariationRepository for MockVariationRepository {
    async fn generate(
        &self,
        phrase: &str,
        _language: Language,
        max_variations: usize,
    ) -> Result<Vec<String>, GenerationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let variations = self
            .by_phrase
            .get(phrase)
            .cloned()
            .unwrap_or_else(|| vec![phrase.to_string()]);
        Ok(variations.into_iter().take(max_variations).collect())
    }
}

/// Synthesizer returning a fixed valid WAV payload, with optional failure
/// and panic triggers keyed on the input text.
pub struct MockSynthesisRepository {
    pub wav: Vec<u8>,
    pub fail_on: Option<String>,
    pub panic_on: Option<String>,
    pub delay: Option<std::time::Duration>,
    pub calls: AtomicUsize,
}

impl MockSynthesisRepository {
    pub fn healthy() -> Self {
        Self {
            wav: wav_bytes(16000, 1, 100),
            fail_on: None,
            panic_on: None,
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing_on(marker: &str) -> Self {
        Self {
            fail_on: Some(marker.to_string()),
            ..Self::healthy()
        }
    }
}

#[async_trait]
impl SynthesisRepository for MockSynthesisRepository {
    async fn synthesize(
        &self,
        text: &str,
        _language: Language,
        _voice: &VoiceProfile,
    ) -> Result<Vec<u8>, SynthesisError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(marker) = &self.panic_on {
            if text.contains(marker.as_str()) {
                panic!("synthetic panic for {text}");
            }
        }
        if let Some(marker) = &self.fail_on {
            if text.contains(marker.as_str()) {
                return Err(SynthesisError::Provider(format!(
                    "engineered failure for {text}"
                )));
            }
        }
        Ok(self.wav.clone())
    }
}

/// In-memory storage backend standing in for the remote object store.
#[derive(Default)]
pub struct MemoryBackend {
    pub objects: Mutex<BTreeMap<String, Vec<u8>>>,
    pub fail_puts: bool,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            objects: Mutex::new(BTreeMap::new()),
            fail_puts: true,
        }
    }
}

#[async_trait]
impl StorageBackend for MemoryBackend {
    async fn put(
        &self,
        path: &str,
        bytes: &[u8],
        _metadata: &ObjectMetadata,
    ) -> Result<StoredLocation, StorageError> {
        if self.fail_puts {
            return Err(StorageError::Remote("engineered put failure".to_string()));
        }
        self.objects
            .lock()
            .unwrap()
            .insert(path.to_string(), bytes.to_vec());
        Ok(StoredLocation::Remote(format!("mem://{path}")))
    }

    async fn get(&self, path: &str) -> Result<Option<Vec<u8>>, StorageError> {
        Ok(self.objects.lock().unwrap().get(path).cloned())
    }

    async fn delete(&self, path: &str) -> Result<bool, StorageError> {
        Ok(self.objects.lock().unwrap().remove(path).is_some())
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
        Ok(self
            .objects
            .lock()
            .unwrap()
            .keys()
            .filter(|key| key.starts_with(prefix))
            .cloned()
            .collect())
    }
}
