pub mod database;
pub mod web;

pub use crate::{
    config::{database::DatabaseConfig, web::WebApiConfig},
    defaults,
};
pub use clap::{Args, Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::Error,
    path::{Path, PathBuf},
};
use strum::{AsRefStr, EnumString};
use thiserror::Error;

/// Error type returned by configuration operations.
#[derive(Error, Debug)]
pub enum TallyConfigError {
    #[error("Error parsing env variables from config")]
    EnvVarParseError(#[from] std::env::VarError),
    #[error("Error processing file: {0:?}")]
    ConfigFileError(#[from] Error),
    #[error("Error processing YAML file: {0:?}")]
    SerdeYamlError(#[from] serde_yaml::Error),
    #[error("URL parser error: {0:?}")]
    ParseError(#[from] url::ParseError),
    #[error("Database backend not supported: {0:?}")]
    UnsupportedDatabase(String),
}

/// Result type returned by configuration operations.
pub type TallyConfigResult<T> = core::result::Result<T, TallyConfigError>;

/// Environment variables consulted when a setting is not passed explicitly.
#[derive(Debug, EnumString, AsRefStr)]
pub enum EnvVar {
    #[strum(serialize = "TALLY_DATABASE_PATH")]
    DatabasePath,
}

/// Return the value of an environment variable or a default value.
pub fn env_or_default(var: EnvVar, default: String) -> String {
    std::env::var(var.as_ref()).unwrap_or(default)
}

#[derive(Debug, Parser, Clone)]
#[clap(name = "Tally API Server", about = "Tally web API", version)]
pub struct ApiServerArgs {
    /// Log level passed to the Tally service.
    #[clap(long, default_value = defaults::LOG_LEVEL, value_parser(["info", "debug", "error", "warn"]), help = "Log level passed to the Tally service.")]
    pub log_level: String,

    /// API server config file.
    #[clap(short, long, value_name = "FILE", help = "API server config file.")]
    pub config: Option<PathBuf>,

    /// Web API host.
    #[clap(long, help = "Web API host.", default_value = defaults::WEB_API_HOST)]
    pub web_api_host: String,

    /// Web API port.
    #[clap(long, help = "Web API port.", default_value = defaults::WEB_API_PORT)]
    pub web_api_port: String,

    /// Max body size for web API requests.
    #[clap(long, help = "Max body size for web API requests.", default_value_t = defaults::MAX_BODY_SIZE)]
    pub max_body_size: usize,

    /// Database type.
    #[clap(long, help = "Database type.", default_value = defaults::DATABASE, value_parser(["sqlite"]))]
    pub database: String,

    /// Path of the SQLite database file (`:memory:` for an in-memory database).
    #[clap(long, help = "Path of the SQLite database file.")]
    pub database_path: Option<String>,

    /// Enable verbose logging.
    #[clap(short, long, help = "Enable verbose logging.")]
    pub verbose: bool,
}

impl Default for ApiServerArgs {
    fn default() -> Self {
        Self {
            log_level: defaults::LOG_LEVEL.to_string(),
            config: None,
            web_api_host: defaults::WEB_API_HOST.to_string(),
            web_api_port: defaults::WEB_API_PORT.to_string(),
            max_body_size: defaults::MAX_BODY_SIZE,
            database: defaults::DATABASE.to_string(),
            database_path: None,
            verbose: defaults::VERBOSE_LOGGING,
        }
    }
}

pub trait Env {
    fn inject_opt_env_vars(&mut self) -> TallyConfigResult<()>;
}

/// Tally service configuration.
#[derive(Clone, Deserialize, Serialize, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct TallyConfig {
    pub log_level: String,
    pub verbose: bool,
    pub web_api: WebApiConfig,
    pub database: DatabaseConfig,
}

impl Default for TallyConfig {
    fn default() -> Self {
        Self {
            log_level: defaults::LOG_LEVEL.to_string(),
            verbose: defaults::VERBOSE_LOGGING,
            web_api: WebApiConfig::default(),
            database: DatabaseConfig::default(),
        }
    }
}

impl TryFrom<ApiServerArgs> for TallyConfig {
    type Error = TallyConfigError;

    fn try_from(args: ApiServerArgs) -> TallyConfigResult<Self> {
        let database = match args.database.as_str() {
            "sqlite" => DatabaseConfig::Sqlite {
                path: args.database_path.unwrap_or_else(|| {
                    env_or_default(
                        EnvVar::DatabasePath,
                        defaults::SQLITE_DATABASE_PATH.to_string(),
                    )
                }),
            },
            other => return Err(TallyConfigError::UnsupportedDatabase(other.into())),
        };

        let mut config = TallyConfig {
            log_level: args.log_level,
            verbose: args.verbose,
            web_api: WebApiConfig {
                host: args.web_api_host,
                port: args.web_api_port,
                max_body_size: args.max_body_size,
            },
            database,
        };

        config.inject_opt_env_vars()?;

        Ok(config)
    }
}

impl TallyConfig {
    // When building the config via a file, any missing section (e.g., web_api, database),
    // or any missing setting in a section (e.g., web_api.port), takes its default value.
    pub fn from_file(path: impl AsRef<Path>) -> TallyConfigResult<Self> {
        let file = File::open(path)?;
        let mut config: TallyConfig = serde_yaml::from_reader(file)?;
        config.inject_opt_env_vars()?;
        Ok(config)
    }
}

impl Env for TallyConfig {
    fn inject_opt_env_vars(&mut self) -> TallyConfigResult<()> {
        self.web_api.inject_opt_env_vars()?;
        self.database.inject_opt_env_vars()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_yaml_fills_missing_settings_with_defaults() {
        let yaml = r#"
log_level: debug
web_api:
  port: "8080"
"#;
        let config: TallyConfig = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.log_level, "debug");
        assert_eq!(config.web_api.port, "8080");
        assert_eq!(config.web_api.host, defaults::WEB_API_HOST);
        assert_eq!(config.web_api.max_body_size, defaults::MAX_BODY_SIZE);
        assert_eq!(config.database, DatabaseConfig::default());
    }

    #[test]
    fn test_config_from_args_uses_database_path() {
        let args = ApiServerArgs {
            database_path: Some(":memory:".to_string()),
            ..Default::default()
        };
        let config = TallyConfig::try_from(args).unwrap();

        assert_eq!(config.database.to_string(), "sqlite::memory:");
    }

    #[test]
    fn test_config_from_args_rejects_unknown_database() {
        let args = ApiServerArgs {
            database: "postgres".to_string(),
            ..Default::default()
        };

        assert!(matches!(
            TallyConfig::try_from(args),
            Err(TallyConfigError::UnsupportedDatabase(_))
        ));
    }
}
