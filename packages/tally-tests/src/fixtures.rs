use crate::TestError;
use axum::{
    body::Body,
    http::Request,
    Router,
};
use serde_json::Value;
use tally_api_server::api::WebApi;
use tally_database::{queries, TallyConnectionPool};
use tally_graphql::query::{ConnectionQuery, RestClause};
use tally_lib::config::{DatabaseConfig, TallyConfig};
use tower::ServiceExt;

/// A row of the `test` table.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct TestRow {
    pub id: i64,
    pub char: String,
    pub number: i64,
}

const TEST_TABLE: &str = "
    CREATE TABLE test (id INTEGER PRIMARY KEY, char TEXT NOT NULL, number INTEGER NOT NULL);
    INSERT INTO test (id, char, number) VALUES (1, 'A', 4), (2, 'C', 3), (3, 'B', 2), (4, 'D', 1);
";

const RESOURCE_TABLES: &str = "
    CREATE TABLE clients (id INTEGER PRIMARY KEY, name TEXT NOT NULL, email TEXT, phone TEXT, address TEXT, created_at TEXT NOT NULL);
    CREATE TABLE projects (id INTEGER PRIMARY KEY, client_id INTEGER NOT NULL REFERENCES clients (id), name TEXT NOT NULL, description TEXT, hourly_rate REAL NOT NULL, created_at TEXT NOT NULL);
    CREATE TABLE tasks (id INTEGER PRIMARY KEY, project_id INTEGER NOT NULL REFERENCES projects (id), title TEXT NOT NULL, status TEXT NOT NULL, created_at TEXT NOT NULL);
    CREATE TABLE sessions (id INTEGER PRIMARY KEY, task_id INTEGER NOT NULL REFERENCES tasks (id), started_at TEXT NOT NULL, ended_at TEXT, duration INTEGER);
    CREATE TABLE taxes (id INTEGER PRIMARY KEY, name TEXT NOT NULL, rate REAL NOT NULL);
    CREATE TABLE users (id INTEGER PRIMARY KEY, email TEXT NOT NULL, name TEXT NOT NULL, role TEXT NOT NULL, password TEXT NOT NULL, created_at TEXT NOT NULL);

    INSERT INTO clients (id, name, email, phone, address, created_at) VALUES
        (1, 'Acme', 'billing@acme.test', NULL, '1 Main St', '2024-01-03'),
        (2, 'Globex', 'ap@globex.test', '555-0100', NULL, '2024-01-01'),
        (3, 'Initech', NULL, NULL, NULL, '2024-01-02');
    INSERT INTO projects (id, client_id, name, description, hourly_rate, created_at) VALUES
        (1, 1, 'Website', NULL, 95.0, '2024-02-01'),
        (2, 1, 'Mobile app', 'iOS first', 110.5, '2024-02-02'),
        (3, 2, 'Audit', NULL, 150.0, '2024-02-03');
    INSERT INTO tasks (id, project_id, title, status, created_at) VALUES
        (1, 1, 'Wireframes', 'done', '2024-03-01'),
        (2, 1, 'Landing page', 'open', '2024-03-02'),
        (3, 2, 'Login screen', 'open', '2024-03-03');
    INSERT INTO sessions (id, task_id, started_at, ended_at, duration) VALUES
        (1, 1, '2024-03-01T09:00', '2024-03-01T11:00', 7200),
        (2, 1, '2024-03-02T09:00', NULL, NULL);
    INSERT INTO taxes (id, name, rate) VALUES (1, 'VAT', 0.2), (2, 'Reduced VAT', 0.05);
    INSERT INTO users (id, email, name, role, password, created_at) VALUES
        (1, 'ada@tally.test', 'Ada', 'admin', 'x', '2024-01-01');
";

/// A fresh, empty in-memory database.
pub async fn memory_pool() -> Result<TallyConnectionPool, TestError> {
    let config = DatabaseConfig::Sqlite {
        path: ":memory:".to_string(),
    };
    Ok(TallyConnectionPool::connect(&config.to_string()).await?)
}

async fn execute(pool: &TallyConnectionPool, sql: &str) -> Result<(), TestError> {
    let mut conn = pool.acquire().await?;
    queries::execute_query(&mut conn, sql.to_string()).await?;
    Ok(())
}

/// An in-memory database holding the `test(id, char, number)` table with rows
/// `(1,'A',4) (2,'C',3) (3,'B',2) (4,'D',1)`.
pub async fn test_table_pool() -> Result<TallyConnectionPool, TestError> {
    let pool = memory_pool().await?;
    execute(&pool, TEST_TABLE).await?;
    Ok(pool)
}

/// An in-memory database holding every listed resource.
pub async fn resources_pool() -> Result<TallyConnectionPool, TestError> {
    let pool = memory_pool().await?;
    execute(&pool, RESOURCE_TABLES).await?;
    Ok(pool)
}

/// Every column of the `test` table.
pub fn test_query() -> ConnectionQuery {
    ConnectionQuery::new(["id", "char", "number"], "test")
}

/// The `test` table without the `'D'` row.
pub fn test_query_without_d() -> ConnectionQuery {
    test_query().rest(RestClause::new("WHERE char != ?").bind("D"))
}

pub fn web_api(pool: TallyConnectionPool) -> Router {
    WebApi::build(TallyConfig::default(), pool)
}

/// Send `request` through `app` and return the status with the JSON body.
pub async fn send(app: Router, request: Request<Body>) -> (u16, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status().as_u16();
    let bytes = hyper::body::to_bytes(response.into_body()).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}
