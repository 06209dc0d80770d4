mod common;

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use common::{MemoryBackend, MockSynthesisRepository, MockVariationRepository};
use pretty_assertions::assert_eq;

use voiceforge::domain::artifact::ArtifactValidator;
use voiceforge::domain::batch::{BatchPipeline, ErrorStage, PipelineSettings};
use voiceforge::domain::command::{Command, CommandValidator, Language, RawCommandRow};
use voiceforge::domain::voice::{VoiceProfile, VoiceRegistry};
use voiceforge::infrastructure::repositories::{SynthesisRepository, VariationRepository};
use voiceforge::infrastructure::storage::{LocalBackend, StorageBackend, StorageRouter};

fn command(intent: &str, phrase: &str, language: &str) -> Command {
    CommandValidator::new()
        .validate(&RawCommandRow {
            intent: Some(intent.to_string()),
            phrase: Some(phrase.to_string()),
            language: Some(language.to_string()),
        })
        .unwrap()
}

fn single_voice_registry() -> Arc<VoiceRegistry> {
    Arc::new(VoiceRegistry::new(vec![VoiceProfile::new(
        "matt",
        "Matt",
        Language::English,
    )]))
}

fn pipeline(
    variations: Arc<dyn VariationRepository>,
    synthesis: Arc<dyn SynthesisRepository>,
    router: StorageRouter,
    settings: PipelineSettings,
) -> Arc<BatchPipeline> {
    Arc::new(BatchPipeline::new(
        variations,
        synthesis,
        None,
        ArtifactValidator::default(),
        single_voice_registry(),
        Arc::new(router),
        settings,
    ))
}

#[tokio::test]
async fn end_to_end_lights_on_scenario() {
    let storage_root = tempfile::tempdir().unwrap();
    let local = Arc::new(LocalBackend::new(storage_root.path()));

    let variations = MockVariationRepository::with_variations(
        "turn on the lights",
        &["turn on the lights", "switch the lights on"],
    );

    let pipeline = pipeline(
        Arc::new(variations),
        Arc::new(MockSynthesisRepository::healthy()),
        StorageRouter::local_only(local.clone()),
        PipelineSettings::default(),
    );

    let result = pipeline
        .run(vec![command("LIGHTS_ON", "turn on the lights", "english")])
        .await;

    assert_eq!(result.total_commands, 1);
    assert_eq!(result.total_variations, 2);
    assert_eq!(result.total_artifacts, 2);
    assert!(result.errors.is_empty());

    let stored = local.list("english/lights_on").await.unwrap();
    assert_eq!(stored.len(), 2);
    let validator = ArtifactValidator::default();
    for path in &stored {
        assert!(validator.validate_path(path), "unexpected path shape: {path}");
    }
}

#[tokio::test]
async fn synthesis_failure_is_isolated_to_one_command() {
    let storage_root = tempfile::tempdir().unwrap();

    let commands: Vec<Command> = (0..5)
        .map(|i| {
            let phrase = if i == 2 {
                "broken lights on".to_string()
            } else {
                format!("lights on please {i}")
            };
            command("LIGHTS_ON", &phrase, "english")
        })
        .collect();

    let pipeline = pipeline(
        Arc::new(MockVariationRepository::echo()),
        Arc::new(MockSynthesisRepository::failing_on("broken")),
        StorageRouter::local_only(Arc::new(LocalBackend::new(storage_root.path()))),
        PipelineSettings::default(),
    );

    let result = pipeline.run(commands).await;

    assert_eq!(result.total_commands, 5);
    assert_eq!(result.total_artifacts, 4);
    assert_eq!(result.failed_commands, 1);

    let command_errors: Vec<_> = result.command_errors().collect();
    assert_eq!(command_errors.len(), 1);
    assert!(command_errors[0].phrase.contains("broken"));
}

#[tokio::test]
async fn variations_that_drop_the_intent_fail_the_command() {
    let storage_root = tempfile::tempdir().unwrap();

    let variations = MockVariationRepository::with_variations(
        "shut everything down",
        &["completely unrelated text", "another stray paraphrase"],
    );

    let pipeline = pipeline(
        Arc::new(variations),
        Arc::new(MockSynthesisRepository::healthy()),
        StorageRouter::local_only(Arc::new(LocalBackend::new(storage_root.path()))),
        PipelineSettings::default(),
    );

    let result = pipeline
        .run(vec![command("SELF_DESTRUCT", "shut everything down", "english")])
        .await;

    assert_eq!(result.total_variations, 0);
    assert_eq!(result.total_artifacts, 0);
    assert_eq!(result.failed_commands, 1);

    let command_errors: Vec<_> = result.command_errors().collect();
    assert_eq!(command_errors.len(), 1);
    assert!(command_errors[0].reason.contains("preserved the intent"));
}

#[tokio::test]
async fn fifty_commands_all_reach_terminal_outcomes() {
    let storage_root = tempfile::tempdir().unwrap();
    let local = Arc::new(LocalBackend::new(storage_root.path()));

    let commands: Vec<Command> = (0..50)
        .map(|i| command(&format!("CMD_{i}"), &format!("cmd {i} lights"), "english"))
        .collect();

    let pipeline = pipeline(
        Arc::new(MockVariationRepository::echo()),
        Arc::new(MockSynthesisRepository::healthy()),
        StorageRouter::local_only(local.clone()),
        PipelineSettings {
            concurrency: 4,
            ..PipelineSettings::default()
        },
    );

    let result = pipeline.run(commands).await;

    assert_eq!(result.total_commands, 50);
    assert_eq!(result.total_artifacts, 50);
    assert!(result.errors.is_empty());

    // No duplicates, no missing commands.
    let stored = local.list("").await.unwrap();
    let unique: HashSet<_> = stored.iter().collect();
    assert_eq!(unique.len(), 50);
}

#[tokio::test]
async fn worker_panic_becomes_command_failure() {
    let storage_root = tempfile::tempdir().unwrap();

    let synthesis = MockSynthesisRepository {
        panic_on: Some("explosive".to_string()),
        ..MockSynthesisRepository::healthy()
    };

    let commands = vec![
        command("LIGHTS_ON", "lights on one", "english"),
        command("LIGHTS_ON", "explosive lights on", "english"),
        command("LIGHTS_ON", "lights on two", "english"),
    ];

    let pipeline = pipeline(
        Arc::new(MockVariationRepository::echo()),
        Arc::new(synthesis),
        StorageRouter::local_only(Arc::new(LocalBackend::new(storage_root.path()))),
        PipelineSettings::default(),
    );

    let result = pipeline.run(commands).await;

    assert_eq!(result.total_commands, 3);
    assert_eq!(result.total_artifacts, 2);
    assert_eq!(result.failed_commands, 1);
    let command_errors: Vec<_> = result.command_errors().collect();
    assert!(command_errors[0].reason.contains("crashed"));
}

#[tokio::test]
async fn cancellation_terminates_remaining_commands() {
    let storage_root = tempfile::tempdir().unwrap();

    let synthesis = MockSynthesisRepository {
        delay: Some(Duration::from_millis(50)),
        ..MockSynthesisRepository::healthy()
    };

    let commands: Vec<Command> = (0..10)
        .map(|i| command("LIGHTS_ON", &format!("lights on {i}"), "english"))
        .collect();

    let pipeline = pipeline(
        Arc::new(MockVariationRepository::echo()),
        Arc::new(synthesis),
        StorageRouter::local_only(Arc::new(LocalBackend::new(storage_root.path()))),
        PipelineSettings {
            concurrency: 1,
            ..PipelineSettings::default()
        },
    );

    let cancel = pipeline.cancellation_token();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        cancel.cancel();
    });

    let result = pipeline.run(commands).await;

    // Every submitted command still reaches exactly one terminal outcome.
    assert_eq!(result.total_commands, 10);
    assert_eq!(result.total_artifacts + result.failed_commands, 10);
    assert!(result.failed_commands >= 1);
    assert!(result
        .command_errors()
        .any(|entry| entry.reason.contains("cancelled")));
}

#[tokio::test]
async fn dual_write_remote_failure_is_partial_not_fatal() {
    let storage_root = tempfile::tempdir().unwrap();
    let local = Arc::new(LocalBackend::new(storage_root.path()));
    let remote = Arc::new(MemoryBackend::failing());

    let pipeline = pipeline(
        Arc::new(MockVariationRepository::echo()),
        Arc::new(MockSynthesisRepository::healthy()),
        StorageRouter::dual(local.clone(), remote, true),
        PipelineSettings::default(),
    );

    let result = pipeline
        .run(vec![command("LIGHTS_ON", "lights on", "english")])
        .await;

    // Local artifact retained, remote failure recorded, command not failed.
    assert_eq!(result.total_artifacts, 1);
    assert_eq!(result.failed_commands, 0);
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].stage, ErrorStage::Artifact);
    assert!(result.errors[0].reason.contains("remote write failed"));

    let stored = local.list("english").await.unwrap();
    assert_eq!(stored.len(), 1);
}

#[tokio::test]
async fn generation_error_fails_command_without_aborting_batch() {
    let storage_root = tempfile::tempdir().unwrap();

    // A variation repository that errors for one specific phrase.
    struct FlakyVariations;
    #[async_trait::async_trait]
    impl VariationRepository for FlakyVariations {
        async fn generate(
            &self,
            phrase: &str,
            _language: Language,
            _max_variations: usize,
        ) -> Result<Vec<String>, voiceforge::infrastructure::repositories::GenerationError> {
            if phrase.contains("flaky") {
                return Err(
                    voiceforge::infrastructure::repositories::GenerationError::Provider(
                        "rate limited".to_string(),
                    ),
                );
            }
            Ok(vec![phrase.to_string()])
        }
    }

    let commands = vec![
        command("LIGHTS_ON", "lights on one", "english"),
        command("LIGHTS_ON", "flaky lights on", "english"),
    ];

    let pipeline = pipeline(
        Arc::new(FlakyVariations),
        Arc::new(MockSynthesisRepository::healthy()),
        StorageRouter::local_only(Arc::new(LocalBackend::new(storage_root.path()))),
        PipelineSettings::default(),
    );

    let result = pipeline.run(commands).await;

    assert_eq!(result.total_artifacts, 1);
    assert_eq!(result.failed_commands, 1);
    assert!(result
        .command_errors()
        .any(|entry| entry.reason.contains("rate limited")));
}
