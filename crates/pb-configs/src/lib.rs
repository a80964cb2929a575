//! # pb-configs
//!
//! Layered settings: built-in defaults, then an optional `pastebin.toml`,
//! then `PASTEBIN__SECTION__KEY` environment variables, then `PORT`.
//! A `.env` file is read into the environment first.

use config::{Config, Environment, File, FileFormat, Source};
use secrecy::SecretString;
use serde::Deserialize;
use std::path::PathBuf;
use thiserror::Error;

pub const CONFIG_FILE: &str = "pastebin";
pub const ENV_PREFIX: &str = "PASTEBIN";

const ID_LENGTH_RANGE: std::ops::RangeInclusive<usize> = 4..=21;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error(transparent)]
    Load(#[from] config::ConfigError),

    #[error("invalid setting {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

#[derive(Debug, Deserialize)]
pub struct AppConfig {
    pub server: ServerSettings,
    pub store: StoreSettings,
    pub paste: PasteSettings,
    pub clock: ClockSettings,
    pub cors: CorsSettings,
    pub log: LogSettings,
    /// The `.env` file read by [`AppConfig::load`], for logging once the
    /// subscriber is installed.
    #[serde(skip)]
    pub env_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// Base used for paste URLs. When unset the request's Host header is used.
    pub public_base_url: Option<String>,
    pub request_timeout_secs: u64,
    pub body_limit_bytes: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Memory,
    Redis,
}

#[derive(Debug, Deserialize)]
pub struct StoreSettings {
    pub backend: StoreBackend,
    pub redis_url: Option<SecretString>,
    pub key_prefix: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PasteSettings {
    pub id_length: usize,
    pub max_content_bytes: usize,
    pub max_update_attempts: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClockSettings {
    /// Only in test mode is the "now" override header honoured.
    pub test_mode: bool,
    pub header: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CorsSettings {
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Pretty,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogSettings {
    pub format: LogFormat,
    /// Used when `RUST_LOG` is not set.
    pub filter: String,
}

impl AppConfig {
    /// Reads `.env`, `pastebin.toml` (if present) and the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        let env_file = dotenvy::dotenv().ok();

        let mut settings = Self::assemble(
            Some(File::with_name(CONFIG_FILE).required(false)),
            environment(),
            std::env::var("PORT").ok(),
        )?;
        settings.env_file = env_file;
        Ok(settings)
    }

    /// Defaults overlaid with a TOML document. Ignores the process environment.
    pub fn from_toml(toml: &str) -> Result<Self, ConfigError> {
        Self::assemble(
            Some(File::from_str(toml, FileFormat::Toml)),
            environment().source(Some(config::Map::new())),
            None,
        )
    }

    fn assemble<S>(file: Option<S>, env: Environment, port: Option<String>) -> Result<Self, ConfigError>
    where
        S: Source + Send + Sync + 'static,
    {
        let mut builder = Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            .set_default("server.request_timeout_secs", 30)?
            .set_default("server.body_limit_bytes", 1024 * 1024)?
            .set_default("store.backend", "memory")?
            .set_default("store.key_prefix", "paste:")?
            .set_default("paste.id_length", 8)?
            .set_default("paste.max_content_bytes", 512 * 1024)?
            .set_default("paste.max_update_attempts", 16)?
            .set_default("clock.test_mode", false)?
            .set_default("clock.header", "x-test-now-ms")?
            .set_default("cors.allowed_origins", vec!["http://localhost:3000"])?
            .set_default("log.format", "json")?
            .set_default("log.filter", "info")?;

        if let Some(file) = file {
            builder = builder.add_source(file);
        }

        let settings: AppConfig = builder
            .add_source(env)
            .set_override_option("server.port", port)?
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.store.backend == StoreBackend::Redis && self.store.redis_url.is_none() {
            return Err(ConfigError::Invalid {
                key: "store.redis_url",
                reason: "required when store.backend = redis".into(),
            });
        }
        if !ID_LENGTH_RANGE.contains(&self.paste.id_length) {
            return Err(ConfigError::Invalid {
                key: "paste.id_length",
                reason: format!(
                    "must be within {}..={}",
                    ID_LENGTH_RANGE.start(),
                    ID_LENGTH_RANGE.end()
                ),
            });
        }
        if self.paste.max_update_attempts == 0 {
            return Err(ConfigError::Invalid {
                key: "paste.max_update_attempts",
                reason: "must be at least 1".into(),
            });
        }
        if self.cors.allowed_origins.iter().any(|origin| origin.trim() == "*") {
            return Err(ConfigError::Invalid {
                key: "cors.allowed_origins",
                reason: "`*` cannot be combined with credentials; list origins explicitly".into(),
            });
        }
        if self.clock.header.trim().is_empty() {
            return Err(ConfigError::Invalid {
                key: "clock.header",
                reason: "must not be empty".into(),
            });
        }
        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("__")
        .separator("__")
        .list_separator(",")
        .with_list_parse_key("cors.allowed_origins")
        .try_parsing(true)
}
