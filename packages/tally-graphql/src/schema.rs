use async_graphql::{
    Context, EmptyMutation, EmptySubscription, Json, Object, Schema, SimpleObject,
};
use serde_json::{Map, Value};
use tally_database::{JsonRow, TallyConnectionPool};
use tally_database_types::{Connection, ConnectionQueryArgs};

use crate::resources::{list_resource, Resource};

pub type TallySchema = Schema<QueryRoot, EmptyMutation, EmptySubscription>;

/// Build the schema served by the web API. Resolvers acquire connections from
/// `pool`.
pub fn build_schema(pool: TallyConnectionPool) -> TallySchema {
    Schema::build(QueryRoot, EmptyMutation, EmptySubscription)
        .data(pool)
        .finish()
}

/// See: https://relay.dev/graphql/connections.htm#sec-PageInfo
#[derive(SimpleObject)]
#[graphql(name = "PageInfo")]
pub struct PageInfoObject {
    pub has_previous_page: bool,
    pub has_next_page: bool,
    pub start_cursor: String,
    pub end_cursor: String,
}

#[derive(SimpleObject)]
#[graphql(name = "Edge")]
pub struct EdgeObject {
    pub node: Json<Map<String, Value>>,
    pub cursor: String,
}

#[derive(SimpleObject)]
pub struct ResourceConnection {
    pub total_count: u64,
    pub edges: Vec<EdgeObject>,
    pub page_info: PageInfoObject,
}

impl From<Connection<JsonRow>> for ResourceConnection {
    fn from(connection: Connection<JsonRow>) -> Self {
        let page_info = connection.page_info;
        Self {
            total_count: connection.total_count,
            edges: connection
                .edges
                .into_iter()
                .map(|edge| EdgeObject {
                    node: Json(edge.node.into_inner()),
                    cursor: edge.cursor,
                })
                .collect(),
            page_info: PageInfoObject {
                has_previous_page: page_info.has_previous_page,
                has_next_page: page_info.has_next_page,
                start_cursor: page_info.start_cursor,
                end_cursor: page_info.end_cursor,
            },
        }
    }
}

async fn resolve(
    ctx: &Context<'_>,
    resource: Resource,
    args: ConnectionQueryArgs,
    parent_id: Option<i64>,
) -> async_graphql::Result<ResourceConnection> {
    let pool = ctx.data::<TallyConnectionPool>()?;
    let mut conn = pool.acquire().await?;
    let connection = list_resource(&mut conn, resource, args, parent_id).await?;
    Ok(connection.into())
}

fn paging(
    first: Option<u64>,
    last: Option<u64>,
    after: Option<String>,
    before: Option<String>,
    order_by: Option<String>,
) -> ConnectionQueryArgs {
    ConnectionQueryArgs {
        first,
        last,
        after,
        before,
        order_by,
    }
}

pub struct QueryRoot;

#[Object]
impl QueryRoot {
    async fn clients(
        &self,
        ctx: &Context<'_>,
        first: Option<u64>,
        last: Option<u64>,
        after: Option<String>,
        before: Option<String>,
        order_by: Option<String>,
    ) -> async_graphql::Result<ResourceConnection> {
        let args = paging(first, last, after, before, order_by);
        resolve(ctx, Resource::Clients, args, None).await
    }

    async fn projects(
        &self,
        ctx: &Context<'_>,
        first: Option<u64>,
        last: Option<u64>,
        after: Option<String>,
        before: Option<String>,
        order_by: Option<String>,
        client_id: Option<i64>,
    ) -> async_graphql::Result<ResourceConnection> {
        let args = paging(first, last, after, before, order_by);
        resolve(ctx, Resource::Projects, args, client_id).await
    }

    async fn tasks(
        &self,
        ctx: &Context<'_>,
        first: Option<u64>,
        last: Option<u64>,
        after: Option<String>,
        before: Option<String>,
        order_by: Option<String>,
        project_id: Option<i64>,
    ) -> async_graphql::Result<ResourceConnection> {
        let args = paging(first, last, after, before, order_by);
        resolve(ctx, Resource::Tasks, args, project_id).await
    }

    async fn sessions(
        &self,
        ctx: &Context<'_>,
        first: Option<u64>,
        last: Option<u64>,
        after: Option<String>,
        before: Option<String>,
        order_by: Option<String>,
        task_id: Option<i64>,
    ) -> async_graphql::Result<ResourceConnection> {
        let args = paging(first, last, after, before, order_by);
        resolve(ctx, Resource::Sessions, args, task_id).await
    }

    async fn taxes(
        &self,
        ctx: &Context<'_>,
        first: Option<u64>,
        last: Option<u64>,
        after: Option<String>,
        before: Option<String>,
        order_by: Option<String>,
    ) -> async_graphql::Result<ResourceConnection> {
        let args = paging(first, last, after, before, order_by);
        resolve(ctx, Resource::Taxes, args, None).await
    }

    async fn users(
        &self,
        ctx: &Context<'_>,
        first: Option<u64>,
        last: Option<u64>,
        after: Option<String>,
        before: Option<String>,
        order_by: Option<String>,
    ) -> async_graphql::Result<ResourceConnection> {
        let args = paging(first, last, after, before, order_by);
        resolve(ctx, Resource::Users, args, None).await
    }
}
