use std::time::Duration;

use config::{Config, ConfigError, File};
use serde::Deserialize;

use crate::application::ports::SummaryStyle;
use crate::domain::DEFAULT_MAX_RETRIES;

use super::Environment;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub translation: TranslationSettings,
    pub worker: WorkerSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    /// Unset means jobs live in process memory only.
    #[serde(default)]
    pub url: Option<String>,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TranslationSettings {
    pub base_url: String,
    pub request_timeout_secs: u64,
    pub summary_max_length: usize,
    pub summary_style: SummaryStyle,
}

impl TranslationSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct WorkerSettings {
    pub count: usize,
    pub poll_interval_ms: u64,
    pub store_timeout_secs: u64,
    pub default_max_retries: u32,
    pub estimated_seconds_per_task: u32,
}

impl WorkerSettings {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn store_timeout(&self) -> Duration {
        Duration::from_secs(self.store_timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    pub level: String,
    pub enable_json: bool,
}

impl Settings {
    /// Layers `appsettings.{environment}` (optional) and `APP_*` variables,
    /// e.g. `APP_DATABASE__URL`, over built-in defaults.
    pub fn load(environment: Environment) -> Result<Self, ConfigError> {
        Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8000_i64)?
            .set_default("database.max_connections", 10_i64)?
            .set_default("translation.base_url", "http://localhost:8001")?
            .set_default("translation.request_timeout_secs", 30_i64)?
            .set_default("translation.summary_max_length", 150_i64)?
            .set_default("translation.summary_style", "concise")?
            .set_default("worker.count", 2_i64)?
            .set_default("worker.poll_interval_ms", 1000_i64)?
            .set_default("worker.store_timeout_secs", 5_i64)?
            .set_default("worker.default_max_retries", i64::from(DEFAULT_MAX_RETRIES))?
            .set_default("worker.estimated_seconds_per_task", 3_i64)?
            .set_default("logging.level", "info")?
            .set_default("logging.enable_json", false)?
            .add_source(
                File::with_name(&format!("appsettings.{}", environment.file_suffix()))
                    .required(false),
            )
            .add_source(
                config::Environment::with_prefix("APP")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}
