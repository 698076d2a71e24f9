#![allow(dead_code)]

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use feteer_orders::config::AppConfig;
use feteer_orders::database::{OrderStore, SqliteOrderStore};
use feteer_orders::services::seed_admin;
use feteer_orders::AppState;

pub const ADMIN: (&str, &str) = ("admin", "admin");

/// Development config with quiet logging, seeding `admin`/`admin`
pub fn test_config() -> AppConfig {
    let mut config = AppConfig::development();
    config.server.enable_request_logging = false;
    config.database.url = "sqlite::memory:".to_string();
    config
}

/// Fresh in-memory store and the router around it
pub async fn app() -> Result<(Router, AppState)> {
    let store: Arc<dyn OrderStore> = Arc::new(SqliteOrderStore::in_memory().await?);
    let config = test_config();
    seed_admin(store.as_ref(), &config.security).await?;
    let state = AppState::new(store, config)?;
    Ok((feteer_orders::router(state.clone()), state))
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: axum::http::HeaderMap,
    pub body: Value,
}

/// Drive one request through the router without a socket
pub async fn call(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Result<TestResponse> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&body)?))?,
        None => builder.body(Body::empty())?,
    };

    let response = app.clone().oneshot(request).await?;
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = response.into_body().collect().await?.to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };

    Ok(TestResponse { status, headers, body })
}

/// Sign in and return the bearer token
pub async fn login(app: &Router, username: &str, password: &str) -> Result<String> {
    let res = call(
        app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(serde_json::json!({ "username": username, "password": password })),
    )
    .await?;
    anyhow::ensure!(res.status == StatusCode::OK, "login failed: {} {}", res.status, res.body);
    res.body["token"]
        .as_str()
        .map(str::to_string)
        .context("login response has no token")
}

pub async fn admin_token(app: &Router) -> Result<String> {
    login(app, ADMIN.0, ADMIN.1).await
}

/// Real listener on an unused port, for the HTTP sync client
pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    pub async fn spawn() -> Result<Self> {
        let (router, _) = app().await?;
        Self::serve(router).await
    }

    pub async fn serve(router: Router) -> Result<Self> {
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);
        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port)).await?;

        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });

        let server = Self { port, base_url, handle };
        server.wait_ready(Duration::from_secs(5)).await?;
        Ok(server)
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            if let Ok(resp) = client.get(format!("{}/health", self.base_url)).send().await {
                if resp.status() == reqwest::StatusCode::OK || resp.status() == reqwest::StatusCode::SERVICE_UNAVAILABLE {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
