use crate::{
    api::{ApiResult, HttpError},
    models::ListParams,
};
use async_graphql::http::{playground_source, GraphQLPlaygroundConfig};
use async_graphql_axum::{GraphQLRequest, GraphQLResponse};
use axum::{
    extract::{Extension, Json, Path, Query},
    response::Html,
};
use serde_json::{json, Value};
use std::{sync::Arc, time::Instant};
use tally_database::TallyConnectionPool;
use tally_graphql::{
    resources::{self, Resource},
    schema::TallySchema,
};
use tally_lib::utils::ServiceStatus;

pub(crate) async fn health_check(
    Extension(pool): Extension<TallyConnectionPool>,
    Extension(start_time): Extension<Arc<Instant>>,
) -> ApiResult<Json<Value>> {
    let db_status = pool.is_connected().await.unwrap_or(ServiceStatus::NotOk);
    let uptime = start_time.elapsed().as_secs().to_string();

    Ok(Json(json!({
        "uptime(seconds)": uptime,
        "database_status": db_status,
    })))
}

pub(crate) async fn list_resource(
    Path(name): Path<String>,
    Query(params): Query<ListParams>,
    Extension(pool): Extension<TallyConnectionPool>,
) -> ApiResult<Json<Value>> {
    let resource = Resource::from_name(&name).map_err(|_| HttpError::NotFound(name))?;
    let (args, parent_id) = params.into_parts();

    let mut conn = pool.acquire().await?;
    let connection = resources::list_resource(&mut conn, resource, args, parent_id).await?;

    Ok(Json(serde_json::to_value(connection)?))
}

pub(crate) async fn query_graph(
    Extension(schema): Extension<TallySchema>,
    req: GraphQLRequest,
) -> GraphQLResponse {
    schema.execute(req.into_inner()).await.into()
}

pub(crate) async fn gql_playground() -> Html<String> {
    Html(playground_source(
        GraphQLPlaygroundConfig::new("/api/graph")
            .with_setting("schema.polling.enable", false),
    ))
}
