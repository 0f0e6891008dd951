//! Configuration for slatectl

use serde::{Deserialize, Serialize};
use slate_engine::{InMemoryStorage, JsonFileStorage, SlateConfig, SlateStorage};
use std::path::PathBuf;
use std::sync::Arc;

/// Main CLI configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CliConfig {
    /// Engine configuration.
    #[serde(default)]
    pub engine: SlateConfig,

    /// Storage configuration.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Storage configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StorageConfig {
    /// Process-local storage; nothing survives the run.
    #[default]
    Memory,

    /// One JSON document per user and ledger.
    JsonFile {
        /// Directory holding the documents.
        dir: PathBuf,
    },
}

impl StorageConfig {
    pub fn build(&self) -> Arc<dyn SlateStorage> {
        match self {
            StorageConfig::Memory => Arc::new(InMemoryStorage::new()),
            StorageConfig::JsonFile { dir } => Arc::new(JsonFileStorage::new(dir.clone())),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// JSON format.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl CliConfig {
    /// Layer built-in defaults, an optional file, and `SLATE__`-prefixed
    /// environment variables (`SLATE__ENGINE__MAX_SLATE_SIZE=5`).
    pub fn load(path: Option<&str>) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder();

        builder = builder.add_source(config::Config::try_from(&CliConfig::default())?);

        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path).required(false));
        }

        builder = builder.add_source(
            config::Environment::with_prefix("SLATE")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        builder.build()?.try_deserialize()
    }
}
