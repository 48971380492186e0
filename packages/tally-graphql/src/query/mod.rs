//! Relay-style connections over a SQL row source.
//! See: https://relay.dev/graphql/connections.htm

pub mod arguments;
pub mod prepare;

use sqlx::{sqlite::SqliteRow, FromRow};
use tally_database::{queries, TallyConnection};
use tally_database_types::{
    Connection, ConnectionQueryArgs, ConnectionRow, CursorCodec, Edge, PageInfo,
};
use tally_lib::utils::format_sql_query;
use tracing::debug;

pub use self::{
    arguments::{CursorBound, Paging},
    prepare::{ConnectionQuery, PreparedConnectionQuery, RestClause},
};
use crate::{GraphqlError, GraphqlResult};

/// Read one page of `query` as a connection.
///
/// Exactly one statement is executed. Mixed pagination directions are
/// rejected before anything runs, and a cursor whose row is not part of the
/// filtered set fails with [`GraphqlError::InvalidCursor`].
pub async fn query_to_connection<T>(
    conn: &mut TallyConnection,
    args: &ConnectionQueryArgs,
    query: &ConnectionQuery,
) -> GraphqlResult<Connection<T>>
where
    T: for<'r> FromRow<'r, SqliteRow>,
{
    let paging = Paging::try_from(args)?;
    let prepared = query.prepare(&paging, args.order_by.as_deref());

    debug!("{}", format_sql_query(prepared.to_string()));

    let fetched =
        queries::run_connection_query::<T>(conn, &prepared.sql, &prepared.binds).await?;

    if fetched.anchor_missing {
        let cursor = args.after.as_ref().or(args.before.as_ref());
        return Err(GraphqlError::InvalidCursor(
            cursor.cloned().unwrap_or_default(),
        ));
    }

    Ok(build_connection(fetched.rows, paging.is_backward()))
}

/// Assemble fetched window rows into a connection.
///
/// Rows of a backward window arrive in descending order and are flipped back
/// to ascending order first.
pub fn build_connection<T>(rows: Vec<ConnectionRow<T>>, backward: bool) -> Connection<T> {
    let rows: Vec<_> = if backward {
        rows.into_iter().rev().collect()
    } else {
        rows
    };

    let (first, last) = match (rows.first(), rows.last()) {
        (Some(first), Some(last)) => (first.meta, last.meta),
        _ => return Connection::empty(),
    };

    let page_info = PageInfo {
        start_cursor: CursorCodec::encode(first.first),
        end_cursor: CursorCodec::encode(last.last),
        has_previous_page: first.id != first.first,
        has_next_page: last.id != last.last,
    };

    let edges = rows
        .into_iter()
        .map(|ConnectionRow { node, meta }| Edge {
            node,
            cursor: CursorCodec::encode(meta.id),
        })
        .collect();

    Connection {
        total_count: u64::try_from(first.total_count).unwrap_or_default(),
        edges,
        page_info,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tally_database_types::RowMeta;

    // Rows of `test(id, char, number)` ordered by `number ASC`: ids 4, 3, 2, 1.
    fn row(id: i64, n: i64) -> ConnectionRow<i64> {
        ConnectionRow {
            node: id,
            meta: RowMeta {
                id,
                n,
                first: 4,
                last: 1,
                total_count: 4,
            },
        }
    }

    #[test]
    fn test_empty_window_yields_empty_connection() {
        let connection = build_connection::<i64>(vec![], false);
        assert_eq!(connection, Connection::empty());

        let connection = build_connection::<i64>(vec![], true);
        assert_eq!(connection.page_info, PageInfo::default());
    }

    #[test]
    fn test_forward_window_flags() {
        let connection = build_connection(vec![row(2, 3), row(1, 4)], false);

        assert_eq!(connection.total_count, 4);
        assert_eq!(connection.nodes().copied().collect::<Vec<_>>(), vec![2, 1]);
        assert_eq!(connection.edges[0].cursor, CursorCodec::encode(2));
        assert_eq!(connection.page_info.start_cursor, CursorCodec::encode(4));
        assert_eq!(connection.page_info.end_cursor, CursorCodec::encode(1));
        assert!(connection.page_info.has_previous_page);
        assert!(!connection.page_info.has_next_page);
    }

    #[test]
    fn test_backward_window_is_restored_to_ascending_order() {
        let connection = build_connection(vec![row(3, 2), row(4, 1)], true);

        assert_eq!(connection.nodes().copied().collect::<Vec<_>>(), vec![4, 3]);
        assert!(!connection.page_info.has_previous_page);
        assert!(connection.page_info.has_next_page);
    }

    #[test]
    fn test_single_row_set_has_no_neighbours() {
        let only = ConnectionRow {
            node: 9,
            meta: RowMeta {
                id: 9,
                n: 1,
                first: 9,
                last: 9,
                total_count: 1,
            },
        };
        let connection = build_connection(vec![only], false);

        assert_eq!(connection.total_count, 1);
        assert!(!connection.page_info.has_previous_page);
        assert!(!connection.page_info.has_next_page);
        assert_eq!(connection.page_info.start_cursor, connection.page_info.end_cursor);
    }
}
