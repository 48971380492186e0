use crate::{types::*, TallyConnection};
use sqlx::{sqlite::SqliteRow, FromRow};
use tally_sqlite as sqlite;

pub async fn execute_query(
    conn: &mut TallyConnection,
    query: String,
) -> sqlx::Result<usize> {
    match conn {
        TallyConnection::Sqlite(ref mut c) => sqlite::execute_query(c, query).await,
    }
}

pub async fn execute_query_with_binds(
    conn: &mut TallyConnection,
    query: &str,
    binds: &[BindValue],
) -> sqlx::Result<usize> {
    match conn {
        TallyConnection::Sqlite(ref mut c) => {
            sqlite::execute_query_with_binds(c, query, binds).await
        }
    }
}

pub async fn ping(conn: &mut TallyConnection) -> sqlx::Result<bool> {
    match conn {
        TallyConnection::Sqlite(ref mut c) => sqlite::ping(c).await,
    }
}

pub async fn run_connection_query<T>(
    conn: &mut TallyConnection,
    query: &str,
    binds: &[BindValue],
) -> sqlx::Result<ConnectionRows<T>>
where
    T: for<'r> FromRow<'r, SqliteRow>,
{
    match conn {
        TallyConnection::Sqlite(ref mut c) => {
            sqlite::run_connection_query(c, query, binds).await
        }
    }
}
