pub mod query;
pub mod resources;
pub mod schema;

use tally_database::TallyDatabaseError;
use tally_database_types::CursorError;
use thiserror::Error;

pub type GraphqlResult<T> = Result<T, GraphqlError>;

#[derive(Debug, Error)]
pub enum GraphqlError {
    #[error("Invalid pagination arguments: {0}")]
    InvalidArguments(String),
    #[error("Invalid cursor: {0:?}")]
    InvalidCursor(String),
    #[error("Database error: {0:?}")]
    Database(#[from] TallyDatabaseError),
    #[error("Sqlx error: {0:?}")]
    Sqlx(#[from] sqlx::Error),
    #[error("Unknown resource: {0:?}")]
    UnknownResource(String),
    #[error("Ordering not supported: {0:?}")]
    UnsupportedOrdering(String),
}

impl From<CursorError> for GraphqlError {
    fn from(e: CursorError) -> Self {
        match e {
            CursorError::InvalidCursor(cursor) => GraphqlError::InvalidCursor(cursor),
        }
    }
}

impl GraphqlError {
    /// Whether the error was caused by the request rather than the server.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            GraphqlError::InvalidArguments(_)
                | GraphqlError::InvalidCursor(_)
                | GraphqlError::UnknownResource(_)
                | GraphqlError::UnsupportedOrdering(_)
        )
    }
}
