use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use voiceforge::domain::artifact::{ArtifactValidator, ValidatorLimits};
use voiceforge::domain::batch::{BatchPipeline, PipelineSettings};
use voiceforge::domain::command::CommandValidator;
use voiceforge::domain::voice::VoiceRegistry;
use voiceforge::infrastructure::config::{Config, LogFormat, SynthesisProvider};
use voiceforge::infrastructure::input::InputReader;
use voiceforge::infrastructure::repositories::{
    NarakeetSynthesisRepository, OpenAiVariationRepository, PollySynthesisRepository,
    SynthesisRepository, VariationRepository,
};
use voiceforge::infrastructure::storage::{
    LocalBackend, S3Backend, StorageBackend, StorageMode, StorageRouter,
};
use voiceforge::infrastructure::transcode::{AudioTranscoder, FfmpegTranscoder};

/// Generate audio-file variants for a list of voice-command phrases.
#[derive(Debug, Parser)]
#[command(name = "voiceforge", version)]
struct Cli {
    /// CSV input file with intent,phrase,language columns
    #[arg(long)]
    input: PathBuf,

    /// Lines to discard before the CSV header row
    #[arg(long, default_value_t = 0)]
    skip_header: usize,

    /// Override the configured worker count
    #[arg(long)]
    concurrency: Option<usize>,

    /// Override the configured storage mode (local, s3, dual)
    #[arg(long)]
    storage: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Load configuration
    let mut config = Config::from_env()?;
    if let Some(storage) = &cli.storage {
        config.storage_mode = StorageMode::parse(storage)
            .ok_or_else(|| format!("invalid --storage value: {storage}"))?;
    }
    if let Some(concurrency) = cli.concurrency {
        config.max_workers = concurrency.max(1);
    }

    // Initialize logging
    init_logging(&config);

    tracing::info!(
        input = %cli.input.display(),
        storage_mode = ?config.storage_mode,
        max_workers = config.max_workers,
        "Starting voiceforge batch run"
    );

    // Read and validate the input file; invalid rows are dropped here and
    // never consume a worker slot.
    let input_reader = InputReader::new(CommandValidator::new());
    let commands = input_reader.read_commands(&cli.input, cli.skip_header)?;
    if commands.is_empty() {
        return Err("no valid commands in input file".into());
    }
    tracing::info!(command_count = commands.len(), "input commands validated");

    // AWS clients are only constructed when a configured component needs
    // them (Polly synthesis, or an S3-backed storage mode).
    let needs_aws = config.synthesis_provider == SynthesisProvider::Polly
        || config.storage_mode != StorageMode::Local;
    let aws_config = if needs_aws {
        Some(
            aws_config::defaults(aws_config::BehaviorVersion::latest())
                .region(aws_config::Region::new(config.aws_region.clone()))
                .load()
                .await,
        )
    } else {
        None
    };

    // === DEPENDENCY INJECTION SETUP ===
    // 1. Provider repositories
    let variation_repo: Arc<dyn VariationRepository> = Arc::new(OpenAiVariationRepository::new(
        Arc::new(async_openai::Client::new()),
        config.openai_model.clone(),
    ));

    let synthesis_repo: Arc<dyn SynthesisRepository> = match config.synthesis_provider {
        SynthesisProvider::Polly => {
            let aws_config = aws_config
                .as_ref()
                .ok_or("AWS configuration missing for Polly")?;
            Arc::new(PollySynthesisRepository::new(Arc::new(
                aws_sdk_polly::Client::new(aws_config),
            )))
        }
        SynthesisProvider::Narakeet => {
            let api_key = config
                .narakeet_api_key
                .clone()
                .ok_or("NARAKEET_API_KEY is required when SYNTHESIS_PROVIDER=narakeet")?;
            let http = reqwest::Client::builder()
                .timeout(config.synthesis_timeout())
                .build()?;
            Arc::new(NarakeetSynthesisRepository::new(http, api_key))
        }
    };

    // 2. Storage backends and router
    let router = match config.storage_mode {
        StorageMode::Local => StorageRouter::local_only(Arc::new(LocalBackend::new(
            config.local_storage_path.clone(),
        ))),
        StorageMode::S3 => {
            let aws_config = aws_config.as_ref().ok_or("AWS configuration missing for S3")?;
            StorageRouter::remote_only(Arc::new(S3Backend::new(
                Arc::new(aws_sdk_s3::Client::new(aws_config)),
                config.s3_bucket.clone(),
            )))
        }
        StorageMode::Dual => {
            let aws_config = aws_config.as_ref().ok_or("AWS configuration missing for S3")?;
            let local: Arc<dyn StorageBackend> =
                Arc::new(LocalBackend::new(config.local_storage_path.clone()));
            let remote: Arc<dyn StorageBackend> = Arc::new(S3Backend::new(
                Arc::new(aws_sdk_s3::Client::new(aws_config)),
                config.s3_bucket.clone(),
            ));
            StorageRouter::dual(local, remote, config.prefer_local_reads)
        }
    };

    // 3. Optional ffmpeg normalization
    let transcoder: Option<Arc<dyn AudioTranscoder>> = if config.transcode_enabled {
        match FfmpegTranscoder::discover() {
            Ok(transcoder) => Some(Arc::new(transcoder)),
            Err(e) => {
                tracing::warn!(error = %e, "transcoding requested but unavailable, storing raw synthesis output");
                None
            }
        }
    } else {
        None
    };

    // 4. Pipeline
    let registry = Arc::new(VoiceRegistry::builtin());
    let validator = ArtifactValidator::new(ValidatorLimits {
        max_bytes: config.max_audio_bytes,
        ..ValidatorLimits::default()
    });
    let settings = PipelineSettings {
        concurrency: config.max_workers,
        max_variations: config.max_variations,
        generation_timeout: config.generation_timeout(),
        synthesis_timeout: config.synthesis_timeout(),
        storage_timeout: config.storage_timeout(),
        synthesis_cache_enabled: config.synthesis_cache_enabled,
    };
    let pipeline = Arc::new(BatchPipeline::new(
        variation_repo,
        synthesis_repo,
        transcoder,
        validator,
        registry,
        Arc::new(router),
        settings,
    ));

    // Ctrl-C aborts the batch between commands; in-flight commands finish.
    let cancel = pipeline.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupt received, cancelling remaining commands");
            cancel.cancel();
        }
    });

    let result = pipeline.run(commands).await;

    println!("{}", result.render_report());

    if result.total_artifacts == 0 {
        std::process::exit(1);
    }
    Ok(())
}

fn init_logging(config: &Config) {
    if config.log_format == LogFormat::Json {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "voiceforge=debug".into()),
            )
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "voiceforge=debug".into()),
            )
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }
}
