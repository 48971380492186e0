//! Relay-style connection payloads.
//! See: https://relay.dev/graphql/connections.htm

use crate::cursor::Cursor;
use serde::{Deserialize, Serialize};

/// Row number of a row within the ordered, filtered set.
pub const ROW_NUMBER_COLUMN: &str = "_n";
/// Id of the first row of the ordered, filtered set.
pub const FIRST_ID_COLUMN: &str = "_first";
/// Id of the last row of the ordered, filtered set.
pub const LAST_ID_COLUMN: &str = "_last";
/// Size of the filtered set.
pub const TOTAL_COUNT_COLUMN: &str = "totalCount";
/// Row number of the row a cursor points at; `NULL` when the cursor is unknown.
pub const ANCHOR_COLUMN: &str = "_anchor";

/// Bookkeeping columns added to every row of a connection query. They are
/// never part of a node.
pub const INTERNAL_COLUMNS: [&str; 5] = [
    ROW_NUMBER_COLUMN,
    FIRST_ID_COLUMN,
    LAST_ID_COLUMN,
    TOTAL_COUNT_COLUMN,
    ANCHOR_COLUMN,
];

pub fn is_internal_column(name: &str) -> bool {
    INTERNAL_COLUMNS.contains(&name)
}

/// Pagination arguments of a connection request.
///
/// `first`/`after` paginate forward, `last`/`before` paginate backward.
/// `order_by` is a column (optionally followed by a direction) of the
/// paginated table; it is interpolated into SQL and must come from trusted,
/// server-side code.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionQueryArgs {
    pub first: Option<u64>,
    pub last: Option<u64>,
    pub after: Option<Cursor>,
    pub before: Option<Cursor>,
    pub order_by: Option<String>,
}

impl ConnectionQueryArgs {
    pub fn first(mut self, first: u64) -> Self {
        self.first = Some(first);
        self
    }

    pub fn last(mut self, last: u64) -> Self {
        self.last = Some(last);
        self
    }

    pub fn after(mut self, cursor: impl Into<Cursor>) -> Self {
        self.after = Some(cursor.into());
        self
    }

    pub fn before(mut self, cursor: impl Into<Cursor>) -> Self {
        self.before = Some(cursor.into());
        self
    }

    pub fn order_by(mut self, order_by: impl Into<String>) -> Self {
        self.order_by = Some(order_by.into());
        self
    }
}

/// Bookkeeping values carried by a row of a connection query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowMeta {
    /// The row's own id.
    pub id: i64,
    /// Position of the row in the ordered, filtered set (1-based).
    pub n: i64,
    /// Id of the first row of the ordered, filtered set.
    pub first: i64,
    /// Id of the last row of the ordered, filtered set.
    pub last: i64,
    pub total_count: i64,
}

/// A result row split into the caller's columns and the bookkeeping columns.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionRow<T> {
    pub node: T,
    pub meta: RowMeta,
}

/// Rows fetched by a connection query, before they are assembled into a
/// [`Connection`].
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionRows<T> {
    /// Window rows in the order the statement returned them.
    pub rows: Vec<ConnectionRow<T>>,
    /// Set when the statement probed for a cursor's row and found none.
    pub anchor_missing: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub start_cursor: Cursor,
    pub end_cursor: Cursor,
    pub has_previous_page: bool,
    pub has_next_page: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge<T> {
    pub node: T,
    pub cursor: Cursor,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection<T> {
    pub total_count: u64,
    pub edges: Vec<Edge<T>>,
    pub page_info: PageInfo,
}

impl<T> Connection<T> {
    /// The connection returned when a window holds no rows.
    pub fn empty() -> Self {
        Self {
            total_count: 0,
            edges: vec![],
            page_info: PageInfo::default(),
        }
    }

    pub fn nodes(&self) -> impl Iterator<Item = &T> {
        self.edges.iter().map(|edge| &edge.node)
    }

    pub fn map<U>(self, mut f: impl FnMut(T) -> U) -> Connection<U> {
        Connection {
            total_count: self.total_count,
            edges: self
                .edges
                .into_iter()
                .map(|Edge { node, cursor }| Edge {
                    node: f(node),
                    cursor,
                })
                .collect(),
            page_info: self.page_info,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_internal_columns() {
        for name in ["_n", "_first", "_last", "totalCount", "_anchor"] {
            assert!(is_internal_column(name));
        }
        for name in ["id", "name", "total_count", "n"] {
            assert!(!is_internal_column(name));
        }
    }

    #[test]
    fn test_empty_connection_serializes_with_empty_cursors() {
        let connection = Connection::<()>::empty();

        assert_eq!(
            serde_json::to_value(&connection).unwrap(),
            json!({
                "totalCount": 0,
                "edges": [],
                "pageInfo": {
                    "startCursor": "",
                    "endCursor": "",
                    "hasPreviousPage": false,
                    "hasNextPage": false,
                }
            })
        );
    }

    #[test]
    fn test_args_deserialize_from_camel_case() {
        let args: ConnectionQueryArgs =
            serde_json::from_value(json!({ "first": 2, "after": "Mw==", "orderBy": "number ASC" }))
                .unwrap();

        assert_eq!(
            args,
            ConnectionQueryArgs::default()
                .first(2)
                .after("Mw==")
                .order_by("number ASC")
        );
    }
}
