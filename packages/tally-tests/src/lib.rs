pub mod fixtures;

pub const WORKSPACE_ROOT: &str = env!("CARGO_MANIFEST_DIR");

use tally_database::TallyDatabaseError;
use tally_lib::config::TallyConfigError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TestError {
    #[error("Database error: {0:?}")]
    DatabaseError(#[from] sqlx::Error),
    #[error("Error creating database pool {0:?}")]
    PoolCreationError(#[from] TallyDatabaseError),
    #[error("TallyConfigError: {0:?}")]
    TallyConfigError(#[from] TallyConfigError),
}
