use std::env;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::infrastructure::storage::StorageMode;

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Production,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SynthesisProvider {
    Polly,
    Narakeet,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub environment: Environment,
    pub log_format: LogFormat,

    // Storage
    pub storage_mode: StorageMode,
    pub local_storage_path: PathBuf,
    pub s3_bucket: String,
    pub aws_region: String,
    pub prefer_local_reads: bool,

    // Providers
    pub synthesis_provider: SynthesisProvider,
    pub narakeet_api_key: Option<String>,
    pub openai_model: String,

    // Pipeline
    pub max_workers: usize,
    pub max_variations: usize,
    pub generation_timeout_secs: u64,
    pub synthesis_timeout_secs: u64,
    pub storage_timeout_secs: u64,
    pub max_audio_bytes: usize,
    pub synthesis_cache_enabled: bool,
    pub transcode_enabled: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        dotenvy::dotenv().ok();

        let storage_mode = env::var("STORAGE_MODE")
            .unwrap_or_else(|_| "local".to_string());
        let storage_mode = StorageMode::parse(&storage_mode)
            .ok_or_else(|| format!("invalid STORAGE_MODE: {storage_mode}"))?;

        let synthesis_provider = env::var("SYNTHESIS_PROVIDER")
            .unwrap_or_else(|_| "polly".to_string());
        let synthesis_provider = match synthesis_provider.to_lowercase().as_str() {
            "polly" => SynthesisProvider::Polly,
            "narakeet" => SynthesisProvider::Narakeet,
            other => return Err(format!("invalid SYNTHESIS_PROVIDER: {other}").into()),
        };

        let config = Config {
            environment: env::var("ENVIRONMENT")
                .unwrap_or_else(|_| "development".to_string())
                .parse::<String>()
                .map(|s| match s.as_str() {
                    "production" => Environment::Production,
                    _ => Environment::Development,
                })?,
            log_format: env::var("LOG_FORMAT")
                .unwrap_or_else(|_| "pretty".to_string())
                .parse::<String>()
                .map(|s| match s.as_str() {
                    "json" => LogFormat::Json,
                    _ => LogFormat::Pretty,
                })?,
            storage_mode,
            local_storage_path: env::var("LOCAL_STORAGE_PATH")
                .unwrap_or_else(|_| "./voice-commands".to_string())
                .into(),
            s3_bucket: env::var("S3_BUCKET")
                .unwrap_or_else(|_| "voiceforge-commands".to_string()),
            aws_region: env::var("AWS_REGION").unwrap_or_else(|_| "us-west-2".to_string()),
            prefer_local_reads: env::var("PREFER_LOCAL_READS")
                .unwrap_or_else(|_| "true".to_string())
                .parse::<String>()
                .map(|s| s.to_lowercase() == "true")
                .unwrap_or(true),
            synthesis_provider,
            narakeet_api_key: env::var("NARAKEET_API_KEY").ok(),
            openai_model: env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string()),
            max_workers: env::var("MAX_WORKERS")
                .unwrap_or_else(|_| "4".to_string())
                .parse()?,
            max_variations: env::var("MAX_VARIATIONS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()?,
            generation_timeout_secs: env::var("GENERATION_TIMEOUT_SECS")
                .unwrap_or_else(|_| "30".to_string())
                .parse()?,
            synthesis_timeout_secs: env::var("SYNTHESIS_TIMEOUT_SECS")
                .unwrap_or_else(|_| "60".to_string())
                .parse()?,
            storage_timeout_secs: env::var("STORAGE_TIMEOUT_SECS")
                .unwrap_or_else(|_| "30".to_string())
                .parse()?,
            max_audio_bytes: env::var("MAX_AUDIO_BYTES")
                .unwrap_or_else(|_| (10 * 1024 * 1024).to_string())
                .parse()?,
            synthesis_cache_enabled: env::var("SYNTHESIS_CACHE_ENABLED")
                .unwrap_or_else(|_| "false".to_string())
                .parse::<String>()
                .map(|s| s.to_lowercase() == "true")
                .unwrap_or(false),
            transcode_enabled: env::var("TRANSCODE_ENABLED")
                .unwrap_or_else(|_| "false".to_string())
                .parse::<String>()
                .map(|s| s.to_lowercase() == "true")
                .unwrap_or(false),
        };

        Ok(config)
    }

    pub fn is_development(&self) -> bool {
        self.environment == Environment::Development
    }

    pub fn generation_timeout(&self) -> Duration {
        Duration::from_secs(self.generation_timeout_secs)
    }

    pub fn synthesis_timeout(&self) -> Duration {
        Duration::from_secs(self.synthesis_timeout_secs)
    }

    pub fn storage_timeout(&self) -> Duration {
        Duration::from_secs(self.storage_timeout_secs)
    }
}
