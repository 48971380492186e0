use crate::uses::{gql_playground, health_check, list_resource, query_graph};
use axum::{
    extract::{DefaultBodyLimit, Extension, Json},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use hyper::Error as HyperError;
use serde_json::json;
use std::{net::SocketAddr, sync::Arc, time::Instant};
use tally_database::{TallyConnectionPool, TallyDatabaseError};
use tally_graphql::{schema::build_schema, GraphqlError};
use tally_lib::config::TallyConfig;
use thiserror::Error;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

pub type ApiResult<T> = core::result::Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("Bad request.")]
    BadRequest,
    #[error("Not found. {0:#?}")]
    NotFound(String),
    #[error("Error.")]
    InternalServer,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Query error {0:?}")]
    Graphql(#[from] GraphqlError),
    #[error("Serialization error {0:?}")]
    Serde(#[from] serde_json::Error),
    #[error("Database error {0:?}")]
    Database(#[from] TallyDatabaseError),
    #[error("Sqlx error {0:?}")]
    Sqlx(#[from] sqlx::Error),
    #[error("Http error {0:?}")]
    Http(#[from] HttpError),
    #[error("Hyper error: {0:?}")]
    HyperError(#[from] HyperError),
}

impl Default for ApiError {
    fn default() -> Self {
        ApiError::Http(HttpError::InternalServer)
    }
}

impl From<StatusCode> for ApiError {
    fn from(status: StatusCode) -> Self {
        match status {
            StatusCode::BAD_REQUEST => ApiError::Http(HttpError::BadRequest),
            _ => ApiError::Http(HttpError::InternalServer),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let generic_err_msg = "Internal server error.".to_string();
        let (status, err_msg) = match &self {
            ApiError::Graphql(e) if e.is_client_error() => {
                (StatusCode::BAD_REQUEST, e.to_string())
            }
            ApiError::Http(e @ HttpError::BadRequest) => {
                (StatusCode::BAD_REQUEST, e.to_string())
            }
            ApiError::Http(e @ HttpError::NotFound(_)) => {
                (StatusCode::NOT_FOUND, e.to_string())
            }
            _ => (StatusCode::INTERNAL_SERVER_ERROR, generic_err_msg),
        };

        error!("{:?} - {}", status, self);

        (
            status,
            Json(json!({
                "success": "false",
                "details": err_msg,
            })),
        )
            .into_response()
    }
}

pub struct WebApi;

impl WebApi {
    /// Assemble the `/api` router on top of `pool`.
    pub fn build(config: TallyConfig, pool: TallyConnectionPool) -> Router {
        let start_time = Arc::new(Instant::now());
        let schema = build_schema(pool.clone());

        let api_routes = Router::new()
            .route("/health", get(health_check))
            .route("/graph", get(gql_playground).post(query_graph))
            .route("/:resource", get(list_resource))
            .layer(Extension(schema))
            .layer(Extension(pool))
            .layer(Extension(start_time));

        Router::new().nest("/api", api_routes).layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(DefaultBodyLimit::max(config.web_api.max_body_size)),
        )
    }

    pub async fn run(config: TallyConfig, pool: TallyConnectionPool) -> ApiResult<()> {
        let listen_on: SocketAddr = config.web_api.clone().into();
        let app = WebApi::build(config, pool);

        info!("Web API listening on {listen_on}.");

        axum::Server::bind(&listen_on)
            .serve(app.into_make_service())
            .await?;

        Ok(())
    }
}
