use base64::{engine::general_purpose::STANDARD, Engine};
use serde::Serialize;
use serde_json::{Map, Value as JsonValue};
use sqlx::{
    pool::PoolConnection,
    query::Query,
    sqlite::{SqliteArguments, SqliteRow},
    Column, FromRow, Row, Sqlite, TypeInfo, ValueRef,
};
use tally_database_types::*;
use tracing::debug;

/// A result row as an ordered JSON object, keyed by column name.
///
/// Bookkeeping columns of connection queries are never copied into it.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct JsonRow(pub Map<String, JsonValue>);

impl JsonRow {
    pub fn get(&self, column: &str) -> Option<&JsonValue> {
        self.0.get(column)
    }

    pub fn into_inner(self) -> Map<String, JsonValue> {
        self.0
    }
}

impl<'r> FromRow<'r, SqliteRow> for JsonRow {
    fn from_row(row: &'r SqliteRow) -> sqlx::Result<Self> {
        let mut map = Map::new();
        for column in row.columns() {
            if is_internal_column(column.name()) {
                continue;
            }
            let value = decode_json_value(row, column.ordinal())?;
            map.insert(column.name().to_string(), value);
        }
        Ok(JsonRow(map))
    }
}

fn decode_json_value(row: &SqliteRow, index: usize) -> sqlx::Result<JsonValue> {
    let type_name = {
        let raw = row.try_get_raw(index)?;
        if raw.is_null() {
            return Ok(JsonValue::Null);
        }
        raw.type_info().name().to_string()
    };

    let value = match type_name.as_str() {
        "INTEGER" | "BOOLEAN" => JsonValue::from(row.try_get::<i64, _>(index)?),
        "REAL" | "NUMERIC" => JsonValue::from(row.try_get::<f64, _>(index)?),
        "BLOB" => JsonValue::from(STANDARD.encode(row.try_get::<Vec<u8>, _>(index)?)),
        _ => JsonValue::from(row.try_get::<String, _>(index)?),
    };

    Ok(value)
}

/// Decode the bookkeeping columns of a connection row. Rows without a row
/// number are padding produced by the cursor probe and yield `None`.
fn decode_row_meta(row: &SqliteRow) -> sqlx::Result<Option<RowMeta>> {
    let n: Option<i64> = row.try_get(ROW_NUMBER_COLUMN)?;
    let Some(n) = n else {
        return Ok(None);
    };

    Ok(Some(RowMeta {
        id: row.try_get("id")?,
        n,
        first: row.try_get(FIRST_ID_COLUMN)?,
        last: row.try_get(LAST_ID_COLUMN)?,
        total_count: row.try_get(TOTAL_COUNT_COLUMN)?,
    }))
}

fn is_anchor_missing(row: &SqliteRow) -> sqlx::Result<bool> {
    let probed = row
        .columns()
        .iter()
        .any(|column| column.name() == ANCHOR_COLUMN);
    if !probed {
        return Ok(false);
    }
    let anchor: Option<i64> = row.try_get(ANCHOR_COLUMN)?;
    Ok(anchor.is_none())
}

fn bind_values<'q>(
    mut query: Query<'q, Sqlite, SqliteArguments<'q>>,
    binds: &'q [BindValue],
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    for value in binds {
        query = match value {
            BindValue::Null => query.bind(None::<i64>),
            BindValue::Integer(v) => query.bind(*v),
            BindValue::Real(v) => query.bind(*v),
            BindValue::Text(v) => query.bind(v.as_str()),
            BindValue::Boolean(v) => query.bind(*v),
        };
    }
    query
}

pub async fn execute_query(
    conn: &mut PoolConnection<Sqlite>,
    query: String,
) -> sqlx::Result<usize> {
    let result = sqlx::query(&query).execute(conn).await?;
    Ok(result.rows_affected() as usize)
}

pub async fn execute_query_with_binds(
    conn: &mut PoolConnection<Sqlite>,
    query: &str,
    binds: &[BindValue],
) -> sqlx::Result<usize> {
    let query = bind_values(sqlx::query(query), binds);
    let result = query.execute(conn).await?;
    Ok(result.rows_affected() as usize)
}

/// Check that the connection can serve a trivial statement.
pub async fn ping(conn: &mut PoolConnection<Sqlite>) -> sqlx::Result<bool> {
    let one: i64 = sqlx::query_scalar("SELECT 1").fetch_one(conn).await?;
    Ok(one == 1)
}

/// Run a prepared connection statement and split every row into the caller's
/// node and the bookkeeping columns.
pub async fn run_connection_query<T>(
    conn: &mut PoolConnection<Sqlite>,
    query: &str,
    binds: &[BindValue],
) -> sqlx::Result<ConnectionRows<T>>
where
    T: for<'r> FromRow<'r, SqliteRow>,
{
    let fetched = bind_values(sqlx::query(query), binds)
        .fetch_all(conn)
        .await?;

    let mut rows = Vec::with_capacity(fetched.len());
    let mut anchor_missing = false;
    for row in fetched.iter() {
        if is_anchor_missing(row)? {
            anchor_missing = true;
            continue;
        }
        if let Some(meta) = decode_row_meta(row)? {
            rows.push(ConnectionRow {
                node: T::from_row(row)?,
                meta,
            });
        }
    }

    debug!("Connection query returned {} row(s).", rows.len());

    Ok(ConnectionRows {
        rows,
        anchor_missing,
    })
}
