use serde::Deserialize;

use crate::domain::ModelTier;

use super::Environment;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub broker: BrokerSettings,
    pub storage: StorageSettings,
    pub database: DatabaseSettings,
    pub transcription: TranscriptionSettings,
    pub llm: LlmSettings,
    pub worker: WorkerSettings,
    pub logging: LoggingSettings,
    pub submission: SubmissionSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BrokerSettings {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    #[serde(default = "default_vhost")]
    pub vhost: String,
    pub queue: String,
    pub prefetch: u16,
    #[serde(default)]
    pub requeue_malformed: bool,
    #[serde(default)]
    pub dead_letter_exchange: Option<String>,
    #[serde(default = "default_consumer_tag")]
    pub consumer_tag: String,
    #[serde(default = "default_connect_retries")]
    pub connect_retries: u32,
}

impl BrokerSettings {
    pub fn amqp_uri(&self) -> String {
        let vhost = if self.vhost == "/" {
            "%2f".to_string()
        } else {
            self.vhost.trim_start_matches('/').to_string()
        };
        format!(
            "amqp://{}:{}@{}:{}/{}",
            self.username, self.password, self.host, self.port, vhost
        )
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageProviderSetting {
    Local,
    S3,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageSettings {
    pub provider: StorageProviderSetting,
    #[serde(default)]
    pub local_path: String,
    #[serde(default)]
    pub bucket: String,
    #[serde(default)]
    pub s3_endpoint: Option<String>,
    #[serde(default = "default_region")]
    pub s3_region: String,
    #[serde(default)]
    pub s3_access_key: Option<String>,
    #[serde(default)]
    pub s3_secret_key: Option<String>,
    #[serde(default)]
    pub s3_secure: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: u32,
    #[serde(default = "default_connect_retries")]
    pub connect_retries: u32,
    #[serde(default = "default_acquire_timeout_secs")]
    pub acquire_timeout_secs: u64,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TranscriptionProviderSetting {
    Local,
    #[serde(rename = "openai")]
    OpenAi,
}

/// Model identifier per tier, as understood by the configured provider.
#[derive(Debug, Clone, Deserialize)]
pub struct TierModels {
    pub small: String,
    pub medium: String,
    pub base: String,
}

impl TierModels {
    pub fn for_tier(&self, tier: ModelTier) -> &str {
        match tier {
            ModelTier::Small => &self.small,
            ModelTier::Medium => &self.medium,
            ModelTier::Base => &self.base,
        }
    }
}

impl Default for TierModels {
    fn default() -> Self {
        Self {
            small: "openai/whisper-small".to_string(),
            medium: "openai/whisper-medium".to_string(),
            base: "openai/whisper-base".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TranscriptionSettings {
    pub provider: TranscriptionProviderSetting,
    #[serde(default)]
    pub models: TierModels,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_tier")]
    pub default_tier: ModelTier,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LlmSettings {
    pub base_url: String,
    pub api_key: String,
    pub default_model: String,
    #[serde(default)]
    pub summary_model: Option<String>,
    #[serde(default)]
    pub keypoints_model: Option<String>,
    #[serde(default)]
    pub interview_model: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WorkerSettings {
    /// Directory for transient audio copies. Defaults to the system temp dir.
    #[serde(default)]
    pub scratch_dir: Option<String>,
    #[serde(default)]
    pub preload_default_tier: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    pub level: String,
    pub enable_json: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubmissionSettings {
    pub max_upload_mb: u64,
}

impl SubmissionSettings {
    pub fn max_upload_bytes(&self) -> u64 {
        self.max_upload_mb * 1024 * 1024
    }
}

impl Settings {
    /// Layers `appsettings.<environment>.toml` under `APP__` prefixed
    /// environment variables, the latter winning.
    pub fn load() -> Result<(Environment, Self), config::ConfigError> {
        dotenvy::dotenv().ok();

        let environment: Environment = std::env::var("APP_ENVIRONMENT")
            .unwrap_or_else(|_| "local".to_string())
            .try_into()
            .map_err(config::ConfigError::Message)?;

        let settings = Self::load_from(".", environment)?;
        Ok((environment, settings))
    }

    pub fn load_from(
        config_dir: &str,
        environment: Environment,
    ) -> Result<Self, config::ConfigError> {
        let settings_path = format!("{}/{}", config_dir, environment.settings_file());

        config::Config::builder()
            .add_source(config::File::new(&settings_path, config::FileFormat::Toml).required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .try_parsing(true)
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()
    }
}

fn default_vhost() -> String {
    "/".to_string()
}

fn default_consumer_tag() -> String {
    "whispai-worker".to_string()
}

fn default_connect_retries() -> u32 {
    5
}

fn default_acquire_timeout_secs() -> u64 {
    10
}

fn default_region() -> String {
    "us-east-1".to_string()
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_tier() -> ModelTier {
    ModelTier::Base
}
