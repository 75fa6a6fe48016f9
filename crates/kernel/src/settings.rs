use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context};
use serde::Deserialize;

const DEFAULT_ENV: &str = "local";
const ENV_VAR_NAME: &str = "BOOKSTORE_ENV";
const CONFIG_DIR_ENV: &str = "BOOKSTORE_CONFIG_DIR";
const ENV_PREFIX: &str = "BOOKSTORE";

/// Deployment environment the application is running in.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Local,
    Staging,
    Production,
}

impl Environment {
    fn parse(name: &str) -> anyhow::Result<Self> {
        match name {
            "local" => Ok(Environment::Local),
            "staging" => Ok(Environment::Staging),
            "production" => Ok(Environment::Production),
            other => Err(anyhow!(
                "unsupported environment '{}'; expected local/staging/production",
                other
            )),
        }
    }
}

/// Top-level configuration structure loaded from layered sources.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub environment: Environment,
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub database: DatabaseSettings,
    #[serde(default)]
    pub telemetry: TelemetrySettings,
}

impl Settings {
    /// Load configuration by layering `.env`, base file, and environment overlay.
    pub fn load() -> anyhow::Result<Self> {
        // Allow missing `.env` files without failing.
        let _ = dotenvy::dotenv();

        let environment = std::env::var(ENV_VAR_NAME).unwrap_or_else(|_| DEFAULT_ENV.to_string());
        let config_dir = match std::env::var(CONFIG_DIR_ENV) {
            Ok(dir) => PathBuf::from(dir),
            // Default to repo root `config` directory.
            Err(_) => std::env::current_dir()
                .with_context(|| "unable to resolve current directory")?
                .join("config"),
        };

        Self::load_from(&config_dir, &environment)
    }

    /// Load configuration from an explicit directory and environment name.
    ///
    /// Reads `base.toml`, then `{environment}.toml`, then the plain `PORT` and
    /// `MONGODB_URI` variables, then `BOOKSTORE_*` variables where `__`
    /// separates nested keys (`BOOKSTORE_SERVER__PORT`).
    pub fn load_from(config_dir: &Path, environment: &str) -> anyhow::Result<Self> {
        Self::load_layered(config_dir, environment, PlainEnv::from_process())
    }

    fn load_layered(
        config_dir: &Path,
        environment: &str,
        plain_env: PlainEnv,
    ) -> anyhow::Result<Self> {
        let parsed_environment = Environment::parse(environment)?;

        let base_path = config_dir.join("base.toml");
        let environment_path = config_dir.join(format!("{}.toml", environment));

        let cfg = config::Config::builder()
            .add_source(config::File::from(base_path).required(false))
            .add_source(config::File::from(environment_path).required(false))
            .add_source(plain_env.into_source()?)
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .with_context(|| "failed to build configuration")?;

        let mut settings: Settings = cfg
            .try_deserialize()
            .with_context(|| "failed to deserialize configuration")?;

        settings.environment = parsed_environment;

        Ok(settings)
    }
}

/// Unprefixed variables understood by existing deployments (`PORT`, `MONGODB_URI`).
///
/// A set `MONGODB_URI` also selects the MongoDB backend. Prefixed
/// `BOOKSTORE_*` variables still take precedence over both.
#[derive(Debug, Clone, Default)]
struct PlainEnv {
    port: Option<String>,
    mongodb_uri: Option<String>,
}

impl PlainEnv {
    fn from_process() -> Self {
        Self {
            port: std::env::var("PORT").ok(),
            mongodb_uri: std::env::var("MONGODB_URI").ok(),
        }
    }

    fn into_source(self) -> anyhow::Result<config::Config> {
        let backend = self.mongodb_uri.as_ref().map(|_| "mongodb");

        config::Config::builder()
            .set_override_option("server.port", self.port)?
            .set_override_option("database.uri", self.mongodb_uri)?
            .set_override_option("database.backend", backend)?
            .build()
            .with_context(|| "failed to read PORT/MONGODB_URI")
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "ServerSettings::default_host")]
    pub host: String,
    #[serde(default = "ServerSettings::default_port")]
    pub port: u16,
    #[serde(default = "ServerSettings::default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl ServerSettings {
    fn default_host() -> String {
        "0.0.0.0".to_string()
    }

    fn default_port() -> u16 {
        5001
    }

    fn default_request_timeout_ms() -> u64 {
        15000
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: Self::default_host(),
            port: Self::default_port(),
            request_timeout_ms: Self::default_request_timeout_ms(),
        }
    }
}

/// Which storage backend holds the book collection.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseBackend {
    #[default]
    Memory,
    Mongodb,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    #[serde(default)]
    pub backend: DatabaseBackend,
    #[serde(default = "DatabaseSettings::default_uri")]
    pub uri: String,
    #[serde(default = "DatabaseSettings::default_name")]
    pub name: String,
    #[serde(default = "DatabaseSettings::default_collection")]
    pub collection: String,
}

impl DatabaseSettings {
    fn default_uri() -> String {
        "mongodb://localhost:27017".to_string()
    }

    fn default_name() -> String {
        "bookstore".to_string()
    }

    fn default_collection() -> String {
        "books".to_string()
    }
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            backend: DatabaseBackend::default(),
            uri: Self::default_uri(),
            name: Self::default_name(),
            collection: Self::default_collection(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelemetrySettings {
    #[serde(default = "TelemetrySettings::default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub log_format: LogFormat,
}

impl TelemetrySettings {
    fn default_log_level() -> String {
        "info".to_string()
    }
}

impl Default for TelemetrySettings {
    fn default() -> Self {
        Self {
            log_level: Self::default_log_level(),
            log_format: LogFormat::Pretty,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}
