//! Test helper functions for app and database setup.

#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::Value;
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;
use tower::ServiceExt;

use aittea::config::{
    Config, DatabaseConfig, EmailConfig, JwtConfig, NotifierConfig, ObservabilityConfig,
    ServerConfig,
};
use aittea::routes::{AppState, router};

pub const TEST_JWT_SECRET: &str = "test-secret-0123456789-0123456789-0123456789";

pub fn test_config() -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
        },
        database: DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
        },
        jwt: JwtConfig {
            secret: TEST_JWT_SECRET.to_string(),
            expiration_secs: 3600,
        },
        email: EmailConfig::default(),
        notifier: NotifierConfig::default(),
        observability: ObservabilityConfig::default(),
    }
}

/// In-memory SQLite with all migrations applied. A single connection keeps
/// every handle on the same database.
pub async fn setup_pool() -> anyhow::Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await?;
    sqlx::migrate!("./migrations").run(&pool).await?;
    Ok(pool)
}

pub async fn setup_app() -> anyhow::Result<(Router, SqlitePool)> {
    let pool = setup_pool().await?;
    let state = AppState {
        config: test_config(),
        pool: pool.clone(),
    };
    Ok((router(state), pool))
}

/// A bearer token accepted by the auth middleware.
pub fn test_token(persona_id: &str, rol: &str) -> String {
    aittea::auth::generate_token(persona_id.to_string(), rol.to_string(), TEST_JWT_SECRET, 3600)
        .expect("token generation")
}

pub async fn request(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);

    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }

    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .expect("request"),
        None => builder.body(Body::empty()).expect("request"),
    };

    app.clone().oneshot(request).await.expect("response")
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("json body")
}

/// Send a request and assert the status, returning the JSON body.
pub async fn request_json(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
    expected: StatusCode,
) -> Value {
    let response = request(app, method, uri, token, body).await;
    assert_eq!(response.status(), expected, "unexpected status for {uri}");
    body_json(response).await
}
