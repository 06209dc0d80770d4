use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;

use super::error::CommandFailure;
use super::result::{BatchResult, CommandOutcome, UnitError};
use crate::domain::artifact::{Artifact, ArtifactValidator, AudioFormat};
use crate::domain::command::Command;
use crate::domain::voice::{VoiceProfile, VoiceRegistry};
use crate::infrastructure::repositories::{SynthesisRepository, VariationRepository};
use crate::infrastructure::storage::{self, ObjectMetadata, StorageRouter, StoredLocation};
use crate::infrastructure::transcode::AudioTranscoder;

/// One retained paraphrase of a command's phrase. Lives only for the
/// duration of processing that command.
#[derive(Debug, Clone)]
struct Variation {
    id: String,
    text: String,
}

#[derive(Debug, Clone)]
pub struct PipelineSettings {
    /// Worker pool size; hard bound on in-flight external calls.
    pub concurrency: usize,
    pub max_variations: usize,
    pub generation_timeout: Duration,
    pub synthesis_timeout: Duration,
    pub storage_timeout: Duration,
    pub synthesis_cache_enabled: bool,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            concurrency: 4,
            max_variations: 10,
            generation_timeout: Duration::from_secs(30),
            synthesis_timeout: Duration::from_secs(60),
            storage_timeout: Duration::from_secs(30),
            synthesis_cache_enabled: false,
        }
    }
}

/// Drives a set of commands through variation generation, synthesis,
/// validation and storage across a bounded worker pool.
///
/// Each worker fully drives one command through all stages before taking
/// the next; failures below the command boundary are recorded and never
/// escape a worker. The run blocks until every submitted command has
/// reached a terminal outcome.
pub struct BatchPipeline {
    variations: Arc<dyn VariationRepository>,
    synthesis: Arc<dyn SynthesisRepository>,
    transcoder: Option<Arc<dyn AudioTranscoder>>,
    validator: ArtifactValidator,
    registry: Arc<VoiceRegistry>,
    router: Arc<StorageRouter>,
    settings: PipelineSettings,
    synthesis_cache: Option<Cache<String, Arc<Vec<u8>>>>,
    cancel: CancellationToken,
}

impl BatchPipeline {
    pub fn new(
        variations: Arc<dyn VariationRepository>,
        synthesis: Arc<dyn SynthesisRepository>,
        transcoder: Option<Arc<dyn AudioTranscoder>>,
        validator: ArtifactValidator,
        registry: Arc<VoiceRegistry>,
        router: Arc<StorageRouter>,
        settings: PipelineSettings,
    ) -> Self {
        let synthesis_cache = if settings.synthesis_cache_enabled {
            Some(
                Cache::builder()
                    .max_capacity(512)
                    .time_to_idle(Duration::from_secs(30 * 60))
                    .build(),
            )
        } else {
            None
        };

        Self {
            variations,
            synthesis,
            transcoder,
            validator,
            registry,
            router,
            settings,
            synthesis_cache,
            cancel: CancellationToken::new(),
        }
    }

    /// Token an operator can use to abort the run; commands that have not
    /// started when it fires terminate as failed-with-cancelled.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Process all commands and return the aggregate result. Never returns
    /// an error: an all-failed batch is a valid outcome.
    pub async fn run(self: Arc<Self>, commands: Vec<Command>) -> BatchResult {
        let total = commands.len();
        tracing::info!(
            total_commands = total,
            concurrency = self.settings.concurrency,
            "Starting batch processing"
        );

        let semaphore = Arc::new(Semaphore::new(self.settings.concurrency.max(1)));
        let mut workers: JoinSet<(Command, CommandOutcome)> = JoinSet::new();

        for command in commands {
            let pipeline = Arc::clone(&self);
            let semaphore = Arc::clone(&semaphore);
            workers.spawn(async move {
                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => {
                        return (
                            command,
                            CommandOutcome::Failed {
                                variations: 0,
                                reason: CommandFailure::Crashed("worker pool closed".to_string()),
                                unit_errors: Vec::new(),
                            },
                        );
                    }
                };

                if pipeline.cancel.is_cancelled() {
                    return (
                        command,
                        CommandOutcome::Failed {
                            variations: 0,
                            reason: CommandFailure::Cancelled,
                            unit_errors: Vec::new(),
                        },
                    );
                }

                // The actual processing runs in its own task so a panic is
                // caught at the command boundary instead of tearing down
                // the pool.
                let worker = tokio::spawn({
                    let pipeline = Arc::clone(&pipeline);
                    let command = command.clone();
                    async move { pipeline.process_command(&command).await }
                });

                let outcome = match worker.await {
                    Ok(outcome) => outcome,
                    Err(e) => {
                        tracing::error!(
                            intent = %command.intent(),
                            error = %e,
                            "command worker crashed"
                        );
                        CommandOutcome::Failed {
                            variations: 0,
                            reason: CommandFailure::Crashed(e.to_string()),
                            unit_errors: Vec::new(),
                        }
                    }
                };

                (command, outcome)
            });
        }

        let mut result = BatchResult::new(total);
        let mut completed = 0usize;
        while let Some(joined) = workers.join_next().await {
            match joined {
                Ok((command, outcome)) => {
                    completed += 1;
                    tracing::info!(
                        completed,
                        total,
                        intent = %command.intent(),
                        "command reached terminal state"
                    );
                    result.absorb(&command, outcome);
                }
                Err(e) => {
                    completed += 1;
                    result.record_unattributed(format!("worker task failed: {e}"));
                }
            }
        }

        tracing::info!(
            total_commands = result.total_commands,
            total_variations = result.total_variations,
            total_artifacts = result.total_artifacts,
            failed_commands = result.failed_commands,
            error_count = result.errors.len(),
            "Batch processing completed"
        );
        result
    }

    /// Drive one command through generation, synthesis, validation and
    /// storage. All failures below the command boundary are converted into
    /// recorded unit errors.
    async fn process_command(&self, command: &Command) -> CommandOutcome {
        let mut unit_errors: Vec<UnitError> = Vec::new();

        let variations = match self.generate_variations(command, &mut unit_errors).await {
            Ok(variations) => variations,
            Err(failure) => {
                return CommandOutcome::Failed {
                    variations: 0,
                    reason: failure,
                    unit_errors,
                }
            }
        };

        if variations.is_empty() {
            return CommandOutcome::Failed {
                variations: 0,
                reason: CommandFailure::NoValidVariations,
                unit_errors,
            };
        }

        let voices = self.registry.voices_for(command.language());
        if voices.is_empty() {
            unit_errors.push(UnitError::artifact(format!(
                "no voices registered for language {}",
                command.language()
            )));
        }

        let mut locations: Vec<StoredLocation> = Vec::new();
        for variation in &variations {
            for voice in voices {
                match self.synthesize_and_store(command, variation, voice).await {
                    Ok((location, partial)) => {
                        locations.push(location);
                        if let Some(partial) = partial {
                            unit_errors.push(partial);
                        }
                    }
                    Err(unit) => unit_errors.push(unit),
                }
            }
        }

        if locations.is_empty() {
            return CommandOutcome::Failed {
                variations: variations.len(),
                reason: CommandFailure::NoArtifactsStored,
                unit_errors,
            };
        }

        CommandOutcome::Stored {
            variations: variations.len(),
            locations,
            unit_errors,
        }
    }

    /// Invoke the variation generator and apply the intent-preservation
    /// filter: every token of the intent must appear (case-insensitively)
    /// in the variation text. Duplicate variations collapse to one by id.
    async fn generate_variations(
        &self,
        command: &Command,
        unit_errors: &mut Vec<UnitError>,
    ) -> Result<Vec<Variation>, CommandFailure> {
        let generated = match timeout(
            self.settings.generation_timeout,
            self.variations.generate(
                command.phrase(),
                command.language(),
                self.settings.max_variations,
            ),
        )
        .await
        {
            Err(_) => {
                return Err(CommandFailure::Generation(format!(
                    "timed out after {:?}",
                    self.settings.generation_timeout
                )))
            }
            Ok(Err(e)) => return Err(CommandFailure::Generation(e.to_string())),
            Ok(Ok(generated)) => generated,
        };

        let intent_tokens: Vec<String> = command
            .intent()
            .to_lowercase()
            .split(['_', ' '])
            .filter(|token| !token.is_empty())
            .map(str::to_string)
            .collect();

        let mut seen = HashSet::new();
        let mut retained = Vec::new();
        for text in generated {
            let lowered = text.to_lowercase();
            if !intent_tokens.iter().all(|token| lowered.contains(token)) {
                tracing::debug!(
                    intent = %command.intent(),
                    variation = %text,
                    "variation dropped by intent-preservation filter"
                );
                continue;
            }

            let id = storage::sanitize_component(&text);
            if id.is_empty() {
                unit_errors.push(UnitError::variation(format!(
                    "variation {text:?}: empty path component after sanitization"
                )));
                continue;
            }

            if seen.insert(id.clone()) {
                retained.push(Variation { id, text });
            }
        }

        tracing::info!(
            intent = %command.intent(),
            retained = retained.len(),
            "variations retained after intent filter"
        );
        Ok(retained)
    }

    /// Synthesize one (variation, voice) pair, validate the payload, and
    /// write it through the storage router. Returns the primary stored
    /// location plus an optional unit error for a partial dual write.
    async fn synthesize_and_store(
        &self,
        command: &Command,
        variation: &Variation,
        voice: &VoiceProfile,
    ) -> Result<(StoredLocation, Option<UnitError>), UnitError> {
        let context = format!("variation '{}', voice '{}'", variation.id, voice.id);

        let mut audio = self
            .synthesize_cached(command, variation, voice)
            .await
            .map_err(|reason| UnitError::variation(format!("{context}: {reason}")))?;

        if let Some(transcoder) = &self.transcoder {
            audio = transcoder
                .transcode(&audio, AudioFormat::Wav)
                .await
                .map(Arc::new)
                .map_err(|e| {
                    UnitError::artifact(format!("{context}: transcode failed: {e}"))
                })?;
        }

        let artifact = Artifact::from_wav(
            audio.as_ref().clone(),
            command.language(),
            command.intent(),
            variation.id.clone(),
            voice.id.clone(),
        );

        self.validator
            .validate(&artifact)
            .map_err(|e| UnitError::artifact(format!("{context}: rejected: {e}")))?;

        let path = storage::canonical_path(
            command.language().as_str(),
            command.intent(),
            &variation.id,
            &voice.id,
        )
        .map_err(|e| UnitError::artifact(format!("{context}: {e}")))?;

        let metadata = ObjectMetadata::audio_wav()
            .with_attribute("language", command.language().as_str())
            .with_attribute("intent", command.intent())
            .with_attribute("variation", variation.id.clone())
            .with_attribute("voice", voice.id.clone());

        let report = match timeout(
            self.settings.storage_timeout,
            self.router.put(&path, &artifact.bytes, &metadata),
        )
        .await
        {
            Err(_) => {
                return Err(UnitError::artifact(format!(
                    "{context}: storage put timed out"
                )))
            }
            Ok(Err(e)) => {
                return Err(UnitError::artifact(format!(
                    "{context}: storage put failed: {e}"
                )))
            }
            Ok(Ok(report)) => report,
        };

        let partial = report.remote_error.as_ref().map(|e| {
            UnitError::artifact(format!(
                "{context}: remote write failed after local success: {e}"
            ))
        });

        let location = report
            .locations
            .into_iter()
            .next()
            .ok_or_else(|| UnitError::artifact(format!("{context}: no backend accepted the write")))?;

        Ok((location, partial))
    }

    /// Synthesis with the optional per-run cache. Identical (voice, text)
    /// pairs across commands reuse the first synthesized payload.
    async fn synthesize_cached(
        &self,
        command: &Command,
        variation: &Variation,
        voice: &VoiceProfile,
    ) -> Result<Arc<Vec<u8>>, String> {
        let key = format!("{}:{}", voice.id, variation.text);

        if let Some(cache) = &self.synthesis_cache {
            if let Some(audio) = cache.get(&key).await {
                tracing::debug!(voice = %voice.id, "synthesis cache hit");
                return Ok(audio);
            }
        }

        let audio = match timeout(
            self.settings.synthesis_timeout,
            self.synthesis
                .synthesize(&variation.text, command.language(), voice),
        )
        .await
        {
            Err(_) => {
                return Err(format!(
                    "synthesis timed out after {:?}",
                    self.settings.synthesis_timeout
                ))
            }
            Ok(Err(e)) => return Err(format!("synthesis failed: {e}")),
            Ok(Ok(audio)) => Arc::new(audio),
        };

        if let Some(cache) = &self.synthesis_cache {
            cache.insert(key, Arc::clone(&audio)).await;
        }

        Ok(audio)
    }
}
