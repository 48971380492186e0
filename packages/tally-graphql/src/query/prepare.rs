use std::fmt;

use tally_database_types::{
    BindValue, ANCHOR_COLUMN, FIRST_ID_COLUMN, LAST_ID_COLUMN, ROW_NUMBER_COLUMN,
    TOTAL_COUNT_COLUMN,
};

use crate::query::arguments::{CursorBound, Paging};

/// SQL appended after `FROM <table>`: joins, `WHERE` and `GROUP BY`, never
/// `ORDER BY`. Values are passed through `?` placeholders and bound in order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RestClause {
    pub sql: String,
    pub binds: Vec<BindValue>,
}

impl RestClause {
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            binds: vec![],
        }
    }

    pub fn bind(mut self, value: impl Into<BindValue>) -> Self {
        self.binds.push(value.into());
        self
    }
}

/// The row source of a connection: which columns of which table, filtered how.
///
/// The column list, the table name and the rest clause's SQL are spliced into
/// the statement verbatim. They must come from server-side code, never from a
/// request. The column list must include the table's `id`.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionQuery {
    pub select_columns: Vec<String>,
    pub from_table: String,
    pub rest: Option<RestClause>,
}

impl ConnectionQuery {
    pub fn new<S: Into<String>>(
        select_columns: impl IntoIterator<Item = S>,
        from_table: impl Into<String>,
    ) -> Self {
        Self {
            select_columns: select_columns.into_iter().map(Into::into).collect(),
            from_table: from_table.into(),
            rest: None,
        }
    }

    pub fn rest(mut self, rest: RestClause) -> Self {
        self.rest = Some(rest);
        self
    }

    /// Build the single statement that reads one window of this row source.
    ///
    /// `order_by` is a column of `from_table`, optionally followed by a
    /// direction, and is qualified with the table name.
    pub fn prepare(&self, paging: &Paging, order_by: Option<&str>) -> PreparedConnectionQuery {
        let sort = format!("{}.{}", self.from_table, order_by.unwrap_or("id ASC"));

        let mut binds = vec![];
        let mut fragments = vec![format!(
            "WITH preset AS (SELECT {}, ROW_NUMBER() OVER (ORDER BY {sort}) AS {ROW_NUMBER_COLUMN}\nFROM {}",
            self.select_columns.join(", "),
            self.from_table
        )];

        if let Some(rest) = &self.rest {
            fragments.push(rest.sql.clone());
            binds.extend(rest.binds.iter().cloned());
        }

        fragments.push(format!("ORDER BY {sort}),"));
        fragments.push(format!(
            "\ntotal AS (SELECT COUNT(*) AS {TOTAL_COUNT_COLUMN} FROM preset),"
        ));
        fragments.push(format!(
            "\nfirst_row AS (SELECT id AS {FIRST_ID_COLUMN} FROM preset WHERE {ROW_NUMBER_COLUMN} = 1),"
        ));
        fragments.push(format!(
            "\nlast_row AS (SELECT id AS {LAST_ID_COLUMN} FROM preset WHERE {ROW_NUMBER_COLUMN} = (SELECT MAX({ROW_NUMBER_COLUMN}) FROM preset)),"
        ));
        fragments.push(format!(
            "\nresult AS (SELECT preset.*, first_row.{FIRST_ID_COLUMN}, last_row.{LAST_ID_COLUMN}, total.{TOTAL_COUNT_COLUMN}\nFROM preset, first_row, last_row, total)"
        ));

        match paging.bound {
            Some(bound) => {
                let (cursor_id, comparison, direction) = match bound {
                    CursorBound::After(id) => (id, ">", "ASC"),
                    CursorBound::Before(id) => (id, "<", "DESC"),
                };

                // `anchor` always holds exactly one row and sits outside the
                // limit. A cursor whose row is not part of the filtered set
                // leaves `_anchor` NULL on the single padding row.
                fragments.push(format!(
                    ",\nanchor AS (SELECT preset.{ROW_NUMBER_COLUMN} AS {ROW_NUMBER_COLUMN} FROM (SELECT ? AS id) AS probe LEFT JOIN preset ON preset.id = probe.id)"
                ));
                binds.push(BindValue::Integer(cursor_id));

                fragments.push(format!(
                    ",\npage AS (SELECT result.* FROM result, anchor WHERE result.{ROW_NUMBER_COLUMN} {comparison} anchor.{ROW_NUMBER_COLUMN}\nORDER BY result.{ROW_NUMBER_COLUMN} {direction}{})",
                    limit_clause(paging.limit, &mut binds)
                ));
                fragments.push(format!(
                    "\nSELECT page.*, anchor.{ROW_NUMBER_COLUMN} AS {ANCHOR_COLUMN}\nFROM anchor LEFT JOIN page ON 1 = 1\nORDER BY page.{ROW_NUMBER_COLUMN} {direction}"
                ));
            }
            None => {
                fragments.push(format!(
                    "\nSELECT * FROM result ORDER BY {ROW_NUMBER_COLUMN} ASC{}",
                    limit_clause(paging.limit, &mut binds)
                ));
            }
        }

        PreparedConnectionQuery {
            sql: fragments.join(" "),
            binds,
        }
    }
}

fn limit_clause(limit: Option<i64>, binds: &mut Vec<BindValue>) -> &'static str {
    match limit {
        Some(limit) => {
            binds.push(BindValue::Integer(limit));
            " LIMIT ?"
        }
        None => "",
    }
}

/// A connection statement ready to run, with its values in placeholder order.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedConnectionQuery {
    pub sql: String,
    pub binds: Vec<BindValue>,
}

impl fmt::Display for PreparedConnectionQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.sql)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tally_lib::utils::format_sql_query;

    fn test_query() -> ConnectionQuery {
        ConnectionQuery::new(["id", "char", "number"], "test")
            .rest(RestClause::new("WHERE char != ?").bind("D"))
    }

    #[test]
    fn test_unbounded_window_reads_every_row_in_order() {
        let prepared = ConnectionQuery::new(["id", "char", "number"], "test")
            .prepare(&Paging::default(), None);

        assert_eq!(
            format_sql_query(prepared.to_string()),
            "WITH preset AS (SELECT id, char, number, ROW_NUMBER() OVER (ORDER BY test.id ASC) AS _n \
             FROM test ORDER BY test.id ASC), \
             total AS (SELECT COUNT(*) AS totalCount FROM preset), \
             first_row AS (SELECT id AS _first FROM preset WHERE _n = 1), \
             last_row AS (SELECT id AS _last FROM preset WHERE _n = (SELECT MAX(_n) FROM preset)), \
             result AS (SELECT preset.*, first_row._first, last_row._last, total.totalCount \
             FROM preset, first_row, last_row, total) \
             SELECT * FROM result ORDER BY _n ASC"
        );
        assert!(prepared.binds.is_empty());
    }

    #[test]
    fn test_placeholders_are_bound_in_statement_order() {
        let paging = Paging {
            limit: Some(2),
            bound: Some(CursorBound::After(3)),
        };
        let prepared = test_query().prepare(&paging, Some("number ASC"));

        assert_eq!(
            prepared.binds,
            vec![
                BindValue::Text("D".to_string()),
                BindValue::Integer(3),
                BindValue::Integer(2),
            ]
        );

        let sql = format_sql_query(prepared.sql);
        assert!(sql.contains("FROM test WHERE char != ? ORDER BY test.number ASC)"));
        assert!(sql.contains(
            "page AS (SELECT result.* FROM result, anchor WHERE result._n > anchor._n ORDER BY result._n ASC LIMIT ?)"
        ));
        assert_eq!(sql.matches('?').count(), 3);
    }

    #[test]
    fn test_backward_window_reads_descending_from_cursor() {
        let paging = Paging {
            limit: Some(1),
            bound: Some(CursorBound::Before(2)),
        };
        let sql = format_sql_query(test_query().prepare(&paging, Some("char ASC")).sql);

        assert!(sql.contains("ROW_NUMBER() OVER (ORDER BY test.char ASC)"));
        assert!(sql.contains("WHERE result._n < anchor._n ORDER BY result._n DESC LIMIT ?)"));
        assert!(sql.ends_with(
            "SELECT page.*, anchor._n AS _anchor FROM anchor LEFT JOIN page ON 1 = 1 ORDER BY page._n DESC"
        ));
    }

    #[test]
    fn test_limit_without_cursor_trims_ascending_rows() {
        let paging = Paging {
            limit: Some(1),
            bound: None,
        };
        let prepared = test_query().prepare(&paging, None);

        assert!(prepared.sql.ends_with("ORDER BY _n ASC LIMIT ?"));
        assert_eq!(
            prepared.binds,
            vec![BindValue::Text("D".to_string()), BindValue::Integer(1)]
        );
    }

    #[test]
    fn test_anchor_is_never_limited() {
        let paging = Paging {
            limit: Some(0),
            bound: Some(CursorBound::After(99)),
        };
        let sql = format_sql_query(test_query().prepare(&paging, None).sql);

        let limit_at = sql.find("LIMIT ?").unwrap();
        let select_at = sql.rfind("SELECT page.*").unwrap();
        assert!(limit_at < select_at);
        assert!(!sql[select_at..].contains("LIMIT"));
    }
}
