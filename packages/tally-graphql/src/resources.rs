//! The paginated lists of the backend.

use std::str::FromStr;

use strum::{EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};
use tally_database::{JsonRow, TallyConnection};
use tally_database_types::{Connection, ConnectionQueryArgs};

use crate::{
    query::{query_to_connection, ConnectionQuery, RestClause},
    GraphqlError, GraphqlResult,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, IntoStaticStr, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum Resource {
    Clients,
    Projects,
    Tasks,
    Sessions,
    Taxes,
    Users,
}

impl Resource {
    /// Resolve a resource from its path segment, e.g. `clients`.
    pub fn from_name(name: &str) -> GraphqlResult<Self> {
        Resource::from_str(name).map_err(|_| GraphqlError::UnknownResource(name.into()))
    }

    pub fn all() -> impl Iterator<Item = Resource> {
        Resource::iter()
    }

    pub fn table(&self) -> &'static str {
        (*self).into()
    }

    pub fn columns(&self) -> &'static [&'static str] {
        match self {
            Resource::Clients => &["id", "name", "email", "phone", "address", "created_at"],
            Resource::Projects => &[
                "id",
                "client_id",
                "name",
                "description",
                "hourly_rate",
                "created_at",
            ],
            Resource::Tasks => &["id", "project_id", "title", "status", "created_at"],
            Resource::Sessions => &["id", "task_id", "started_at", "ended_at", "duration"],
            Resource::Taxes => &["id", "name", "rate"],
            Resource::Users => &["id", "email", "name", "role", "created_at"],
        }
    }

    /// Columns a list of this resource can be ordered by.
    pub fn sortable(&self) -> &'static [&'static str] {
        match self {
            Resource::Clients => &["id", "name", "created_at"],
            Resource::Projects => &["id", "name", "hourly_rate", "created_at"],
            Resource::Tasks => &["id", "title", "status", "created_at"],
            Resource::Sessions => &["id", "started_at", "duration"],
            Resource::Taxes => &["id", "name", "rate"],
            Resource::Users => &["id", "email", "name", "created_at"],
        }
    }

    /// Column referencing the owning resource, for resources listed per parent.
    pub fn parent_column(&self) -> Option<&'static str> {
        match self {
            Resource::Projects => Some("client_id"),
            Resource::Tasks => Some("project_id"),
            Resource::Sessions => Some("task_id"),
            _ => None,
        }
    }

    /// Translate a requested ordering (`field` or `field:desc`) into an
    /// `ORDER BY` fragment, refusing any field outside the sortable list.
    pub fn order_by(&self, requested: &str) -> GraphqlResult<String> {
        let unsupported = || GraphqlError::UnsupportedOrdering(requested.to_string());

        let (field, direction) = match requested.split_once(':') {
            Some((field, direction)) => (field, direction),
            None => (requested, "asc"),
        };

        let direction = match direction.to_lowercase().as_str() {
            "asc" => "ASC",
            "desc" => "DESC",
            _ => return Err(unsupported()),
        };

        let field = self
            .sortable()
            .iter()
            .find(|column| **column == field)
            .ok_or_else(unsupported)?;

        Ok(format!("{field} {direction}"))
    }

    /// The row source of this resource, optionally narrowed to one parent.
    pub fn connection_query(&self, parent_id: Option<i64>) -> GraphqlResult<ConnectionQuery> {
        let query = ConnectionQuery::new(self.columns().iter().copied(), self.table());

        match (parent_id, self.parent_column()) {
            (None, _) => Ok(query),
            (Some(id), Some(column)) => Ok(query.rest(
                RestClause::new(format!("WHERE {}.{column} = ?", self.table())).bind(id),
            )),
            (Some(_), None) => Err(GraphqlError::InvalidArguments(format!(
                "{} cannot be filtered by parent",
                self.table()
            ))),
        }
    }
}

/// List one page of a resource.
pub async fn list_resource(
    conn: &mut TallyConnection,
    resource: Resource,
    args: ConnectionQueryArgs,
    parent_id: Option<i64>,
) -> GraphqlResult<Connection<JsonRow>> {
    let query = resource.connection_query(parent_id)?;
    let order_by = args
        .order_by
        .as_deref()
        .map(|requested| resource.order_by(requested))
        .transpose()?;
    let args = ConnectionQueryArgs { order_by, ..args };

    query_to_connection(conn, &args, &query).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use tally_database_types::BindValue;

    #[test]
    fn test_resources_resolve_from_path_segments() {
        assert_eq!(Resource::from_name("clients").unwrap(), Resource::Clients);
        assert_eq!(Resource::from_name("taxes").unwrap().table(), "taxes");
        assert!(matches!(
            Resource::from_name("invoices"),
            Err(GraphqlError::UnknownResource(_))
        ));
        assert_eq!(Resource::all().count(), 6);
    }

    #[test]
    fn test_every_resource_selects_id_and_sorts_by_known_columns() {
        for resource in Resource::all() {
            assert!(resource.columns().contains(&"id"));
            for column in resource.sortable() {
                assert!(resource.columns().contains(column));
            }
        }
    }

    #[test]
    fn test_order_by_is_whitelisted() {
        let resource = Resource::Projects;

        assert_eq!(resource.order_by("name").unwrap(), "name ASC");
        assert_eq!(resource.order_by("hourly_rate:desc").unwrap(), "hourly_rate DESC");
        for requested in ["description", "name:sideways", "id; DROP TABLE projects", ""] {
            assert!(matches!(
                resource.order_by(requested),
                Err(GraphqlError::UnsupportedOrdering(_))
            ));
        }
    }

    #[test]
    fn test_parent_filter_is_bound() {
        let query = Resource::Tasks.connection_query(Some(7)).unwrap();
        let rest = query.rest.unwrap();

        assert_eq!(rest.sql, "WHERE tasks.project_id = ?");
        assert_eq!(rest.binds, vec![BindValue::Integer(7)]);

        assert!(Resource::Tasks.connection_query(None).unwrap().rest.is_none());
        assert!(matches!(
            Resource::Taxes.connection_query(Some(1)),
            Err(GraphqlError::InvalidArguments(_))
        ));
    }
}
