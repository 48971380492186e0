use std::str::FromStr;

use crate::{
    config::{Env, TallyConfigError, TallyConfigResult},
    defaults,
    utils::{is_opt_env_var, trim_opt_env_key},
};
use serde::{Deserialize, Serialize};
use url::Url;

const SQLITE_IN_MEMORY_PATH: &str = ":memory:";

#[derive(Clone, Deserialize, Serialize, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DatabaseConfig {
    Sqlite { path: String },
}

impl DatabaseConfig {
    /// Whether this configuration points at a transient in-memory database.
    pub fn is_in_memory(&self) -> bool {
        match self {
            DatabaseConfig::Sqlite { path } => path == SQLITE_IN_MEMORY_PATH,
        }
    }
}

impl Env for DatabaseConfig {
    fn inject_opt_env_vars(&mut self) -> TallyConfigResult<()> {
        match self {
            DatabaseConfig::Sqlite { path } => {
                if is_opt_env_var(path) {
                    *path = std::env::var(trim_opt_env_key(path))?;
                }
            }
        }
        Ok(())
    }
}

impl std::fmt::Display for DatabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DatabaseConfig::Sqlite { path } if path == SQLITE_IN_MEMORY_PATH => {
                write!(f, "sqlite::memory:")
            }
            DatabaseConfig::Sqlite { path } => write!(f, "sqlite://{path}"),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        DatabaseConfig::Sqlite {
            path: defaults::SQLITE_DATABASE_PATH.into(),
        }
    }
}

impl FromStr for DatabaseConfig {
    type Err = TallyConfigError;

    fn from_str(db_url: &str) -> Result<Self, Self::Err> {
        let url = Url::parse(db_url)?;

        match url.scheme() {
            "sqlite" => {
                let path = db_url
                    .trim_start_matches("sqlite:")
                    .trim_start_matches("//");
                Ok(DatabaseConfig::Sqlite {
                    path: path.to_string(),
                })
            }
            other => Err(TallyConfigError::UnsupportedDatabase(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_url_round_trips_through_config() {
        for url in ["sqlite://tally.db", "sqlite:///var/lib/tally.db", "sqlite::memory:"] {
            let config = DatabaseConfig::from_str(url).unwrap();
            assert_eq!(config.to_string(), url);
        }
    }

    #[test]
    fn test_in_memory_database_is_detected() {
        let config = DatabaseConfig::from_str("sqlite::memory:").unwrap();
        assert!(config.is_in_memory());
        assert!(!DatabaseConfig::default().is_in_memory());
    }

    #[test]
    fn test_non_sqlite_url_is_rejected() {
        assert!(matches!(
            DatabaseConfig::from_str("postgres://localhost:5432/tally"),
            Err(TallyConfigError::UnsupportedDatabase(_))
        ));
    }
}
