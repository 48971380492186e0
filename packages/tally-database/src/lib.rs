pub use tally_database_types::DbType;
pub use tally_sqlite::JsonRow;
use tally_lib::{
    config::DatabaseConfig,
    defaults,
    utils::{attempt_database_connection, ServiceStatus},
};
use sqlx::{
    pool::PoolConnection,
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
    Error as SqlxError,
};
use std::{str::FromStr, time::Duration};
use thiserror::Error;
use tracing::info;

pub mod queries;
pub mod types {
    pub use tally_database_types::*;
}

#[derive(Debug, Error)]
pub enum TallyDatabaseError {
    #[error("Invalid connection string: {0:?}")]
    InvalidConnectionString(String),
    #[error("Database backend not supported: {0:?}")]
    BackendNotSupported(String),
    #[error("Error from sqlx: {0:#?}")]
    SqlxError(#[from] SqlxError),
}

#[derive(Debug)]
pub enum TallyConnection {
    Sqlite(PoolConnection<sqlx::Sqlite>),
}

/// A shared handle on the backing database.
///
/// The pool is cheap to clone and is passed explicitly to whatever needs
/// database access.
#[derive(Clone, Debug)]
pub enum TallyConnectionPool {
    Sqlite(sqlx::Pool<sqlx::Sqlite>),
}

impl From<sqlx::Pool<sqlx::Sqlite>> for TallyConnectionPool {
    fn from(pool: sqlx::Pool<sqlx::Sqlite>) -> Self {
        TallyConnectionPool::Sqlite(pool)
    }
}

fn sqlite_pool_options(in_memory: bool) -> SqlitePoolOptions {
    if in_memory {
        SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        SqlitePoolOptions::new()
            .max_connections(defaults::SQLITE_MAX_CONNECTIONS)
            .idle_timeout(Duration::from_secs(defaults::SQLITE_IDLE_TIMEOUT_SECS))
    }
}

impl TallyConnectionPool {
    pub fn database_type(&self) -> DbType {
        match self {
            TallyConnectionPool::Sqlite(_) => DbType::Sqlite,
        }
    }

    pub async fn connect(
        database_url: &str,
    ) -> Result<TallyConnectionPool, TallyDatabaseError> {
        let url = url::Url::parse(database_url).map_err(|_| {
            TallyDatabaseError::InvalidConnectionString(database_url.into())
        })?;

        match url.scheme() {
            "sqlite" => {
                let options = SqliteConnectOptions::from_str(database_url)?
                    .create_if_missing(true)
                    .journal_mode(SqliteJournalMode::Wal)
                    .foreign_keys(true)
                    .locking_mode(sqlx::sqlite::SqliteLockingMode::Normal);

                // An in-memory database lives only as long as its connections,
                // so it gets one connection that is never reaped.
                let in_memory = DatabaseConfig::from_str(database_url)
                    .map(|config| config.is_in_memory())
                    .unwrap_or(false);

                let pool = attempt_database_connection(|| {
                    sqlite_pool_options(in_memory).connect_with(options.clone())
                })
                .await?;

                info!("Connected to database at {database_url}.");

                Ok(TallyConnectionPool::Sqlite(pool))
            }
            err => Err(TallyDatabaseError::BackendNotSupported(err.into())),
        }
    }

    pub async fn is_connected(&self) -> sqlx::Result<ServiceStatus> {
        let mut conn = self.acquire().await?;
        match queries::ping(&mut conn).await? {
            true => Ok(ServiceStatus::OK),
            false => Ok(ServiceStatus::NotOk),
        }
    }

    pub async fn acquire(&self) -> sqlx::Result<TallyConnection> {
        match self {
            TallyConnectionPool::Sqlite(p) => Ok(TallyConnection::Sqlite(p.acquire().await?)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_pool_keeps_state_across_acquisitions() {
        let pool = TallyConnectionPool::connect("sqlite::memory:").await.unwrap();
        assert_eq!(pool.database_type(), DbType::Sqlite);

        {
            let mut conn = pool.acquire().await.unwrap();
            queries::execute_query(&mut conn, "CREATE TABLE t (id INTEGER)".into())
                .await
                .unwrap();
        }

        {
            let mut conn = pool.acquire().await.unwrap();
            let inserted =
                queries::execute_query(&mut conn, "INSERT INTO t (id) VALUES (1)".into())
                    .await
                    .unwrap();
            assert_eq!(inserted, 1);
        }

        assert_eq!(pool.is_connected().await.unwrap(), ServiceStatus::OK);
    }

    #[tokio::test]
    async fn test_unsupported_backend_is_rejected() {
        assert!(matches!(
            TallyConnectionPool::connect("postgres://localhost:5432/tally").await,
            Err(TallyDatabaseError::BackendNotSupported(_))
        ));
        assert!(matches!(
            TallyConnectionPool::connect("not a url").await,
            Err(TallyDatabaseError::InvalidConnectionString(_))
        ));
    }
}
