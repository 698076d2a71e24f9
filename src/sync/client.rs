//! HTTP client for the order API with bounded retry and typed failures.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Method, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};
use url::Url;

use super::error::SyncError;
use crate::config::SyncConfig;
use crate::types::{MenuItem, MenuKind, Order, OrderDraft, Role};

/// Exponential backoff: `min(base * 2^attempt, max)` between attempts `0..=max_retries`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            base_delay: Duration::from_millis(1000),
            max_delay: Duration::from_millis(5000),
        }
    }
}

impl RetryPolicy {
    pub fn from_config(config: &SyncConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            base_delay: Duration::from_millis(config.retry_base_delay_ms),
            max_delay: Duration::from_millis(config.retry_max_delay_ms),
        }
    }

    pub fn with_max_retries(self, max_retries: u32) -> Self {
        Self { max_retries, ..self }
    }

    /// Delay to wait after failed attempt number `attempt` (zero-based)
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }
}

/// Run `op` until it succeeds, fails with a non-retryable error, or the
/// policy's attempts are used up; the last error is returned.
pub async fn with_retry<T, F, Fut>(policy: &RetryPolicy, mut op: F) -> Result<T, SyncError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, SyncError>>,
{
    let mut attempt = 0;
    loop {
        match op(attempt).await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_retryable() && attempt < policy.max_retries => {
                let delay = policy.delay_for(attempt);
                warn!(
                    "Attempt {}/{} failed ({}); retrying in {:?}",
                    attempt + 1,
                    policy.max_retries + 1,
                    err,
                    delay
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}

/// The four order calls the sync layer depends on
#[async_trait]
pub trait OrderApi: Send + Sync {
    async fn list_orders(&self, status: Option<&str>) -> Result<Vec<Order>, SyncError>;
    async fn create_order(&self, draft: &OrderDraft) -> Result<Order, SyncError>;
    async fn update_order_status(&self, id: i64, status: &str) -> Result<(), SyncError>;
    async fn delete_order(&self, id: i64) -> Result<(), SyncError>;
}

/// One request as issued by [`ApiClient::fetch`]
#[derive(Debug, Clone)]
pub struct FetchRequest<'a> {
    pub method: Method,
    pub path: &'a str,
    pub status: Option<&'a str>,
    pub body: Option<Value>,
    pub max_retries: u32,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SessionUser {
    pub id: i64,
    pub username: String,
    pub role: Role,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub user: SessionUser,
    pub token: String,
    pub expires_in: i64,
}

/// reqwest-backed client for the order API
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    token: Option<String>,
    policy: RetryPolicy,
    last_nonce: AtomicU64,
}

impl ApiClient {
    pub fn new(base_url: &str, policy: RetryPolicy) -> Result<Self, url::ParseError> {
        Ok(Self {
            http: reqwest::Client::new(),
            base_url: Url::parse(base_url)?,
            token: None,
            policy,
            last_nonce: AtomicU64::new(0),
        })
    }

    pub fn from_config(config: &SyncConfig) -> Result<Self, url::ParseError> {
        Self::new(&config.base_url, RetryPolicy::from_config(config))
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Strictly increasing millisecond stamp used to defeat intermediary caches
    fn next_nonce(&self) -> u64 {
        let now = u64::try_from(chrono::Utc::now().timestamp_millis()).unwrap_or(0);
        let previous = self
            .last_nonce
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| Some(now.max(last + 1)))
            .unwrap_or_else(|last| last);
        now.max(previous + 1)
    }

    fn endpoint(&self, path: &str, status: Option<&str>, nonce: u64) -> Result<Url, SyncError> {
        let mut url = self
            .base_url
            .join(path)
            .map_err(|e| SyncError::DataIntegrity(format!("invalid request path '{}': {}", path, e)))?;
        {
            let mut query = url.query_pairs_mut();
            if let Some(status) = status {
                query.append_pair("status", status);
            }
            query.append_pair("_t", &nonce.to_string());
        }
        Ok(url)
    }

    async fn send_once(&self, request: &FetchRequest<'_>) -> Result<Option<Value>, SyncError> {
        let nonce = self.next_nonce();
        let url = self.endpoint(request.path, request.status, nonce)?;
        debug!("{} {}", request.method, url);

        let mut builder = self
            .http
            .request(request.method.clone(), url)
            .header(header::CACHE_CONTROL, "no-store")
            .header(header::PRAGMA, "no-cache")
            .header("X-Request-Timestamp", nonce.to_string());
        if let Some(token) = &self.token {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| SyncError::network(None, e.to_string()))?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            let body = response.text().await.unwrap_or_default();
            return Err(SyncError::Auth(error_message(&body, status)));
        }
        if status == StatusCode::NOT_FOUND && request.method == Method::DELETE {
            debug!("{} already gone", request.path);
            return Ok(None);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SyncError::network(Some(status.as_u16()), error_message(&body, status)));
        }

        let text = response
            .text()
            .await
            .map_err(|e| SyncError::network(Some(status.as_u16()), e.to_string()))?;
        if text.trim().is_empty() {
            return Ok(None);
        }
        serde_json::from_str(&text)
            .map(Some)
            .map_err(|e| SyncError::DataIntegrity(format!("response is not valid JSON: {}", e)))
    }

    /// Issue a request, retrying network-class failures per the retry policy
    pub async fn fetch(&self, request: FetchRequest<'_>) -> Result<Option<Value>, SyncError> {
        let policy = self.policy.with_max_retries(request.max_retries);
        with_retry(&policy, |_| self.send_once(&request)).await
    }

    /// Sign in and keep the returned token for later calls
    pub async fn login(&mut self, username: &str, password: &str) -> Result<LoginResponse, SyncError> {
        let value = self
            .fetch(FetchRequest {
                method: Method::POST,
                path: "/api/auth/login",
                status: None,
                body: Some(json!({ "username": username, "password": password })),
                max_retries: 0,
            })
            .await?;
        let login: LoginResponse = decode(value, "login")?;
        self.token = Some(login.token.clone());
        Ok(login)
    }

    pub async fn logout(&self) -> Result<(), SyncError> {
        self.fetch(FetchRequest {
            method: Method::POST,
            path: "/api/auth/logout",
            status: None,
            body: None,
            max_retries: 0,
        })
        .await?;
        Ok(())
    }

    pub async fn me(&self) -> Result<SessionUser, SyncError> {
        let value = self
            .fetch(FetchRequest {
                method: Method::GET,
                path: "/api/auth/me",
                status: None,
                body: None,
                max_retries: self.policy.max_retries,
            })
            .await?;
        decode(value, "session")
    }

    /// Reachability check against `/health`; any HTTP answer counts, even 503
    pub async fn ping(&self) -> Result<(), SyncError> {
        let result = self
            .fetch(FetchRequest {
                method: Method::GET,
                path: "/health",
                status: None,
                body: None,
                max_retries: 0,
            })
            .await;
        match result {
            Err(err) if err.is_unreachable() => Err(err),
            _ => Ok(()),
        }
    }

    pub async fn list_menu(&self, kind: Option<MenuKind>) -> Result<Vec<MenuItem>, SyncError> {
        let path = match kind {
            Some(kind) => format!("/api/menu?kind={}", kind.as_str()),
            None => "/api/menu".to_string(),
        };
        let value = self
            .fetch(FetchRequest {
                method: Method::GET,
                path: &path,
                status: None,
                body: None,
                max_retries: self.policy.max_retries,
            })
            .await?;
        decode_list(value, "menu")
    }
}

/// Prefer the server's `message` field, fall back to the status reason
fn error_message(body: &str, status: StatusCode) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("request failed").to_string())
}

fn decode<T: serde::de::DeserializeOwned>(value: Option<Value>, what: &str) -> Result<T, SyncError> {
    let value = value.ok_or_else(|| SyncError::DataIntegrity(format!("empty {} response", what)))?;
    serde_json::from_value(value).map_err(|e| SyncError::DataIntegrity(format!("malformed {} response: {}", what, e)))
}

/// List endpoints must answer with a JSON array; anything else is not coerced
fn decode_list<T: serde::de::DeserializeOwned>(value: Option<Value>, what: &str) -> Result<Vec<T>, SyncError> {
    match value {
        Some(array @ Value::Array(_)) => decode(Some(array), what),
        Some(other) => Err(SyncError::DataIntegrity(format!(
            "expected a JSON array of {}, got {}",
            what,
            json_kind(&other)
        ))),
        None => Err(SyncError::DataIntegrity(format!("empty {} response", what))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[async_trait]
impl OrderApi for ApiClient {
    async fn list_orders(&self, status: Option<&str>) -> Result<Vec<Order>, SyncError> {
        let value = self
            .fetch(FetchRequest {
                method: Method::GET,
                path: "/api/orders",
                status,
                body: None,
                max_retries: self.policy.max_retries,
            })
            .await?;
        decode_list(value, "orders")
    }

    /// Not retried: a POST that timed out may still have created the order
    async fn create_order(&self, draft: &OrderDraft) -> Result<Order, SyncError> {
        let body = serde_json::to_value(draft)
            .map_err(|e| SyncError::DataIntegrity(format!("order draft is not serializable: {}", e)))?;
        let value = self
            .fetch(FetchRequest {
                method: Method::POST,
                path: "/api/orders",
                status: None,
                body: Some(body),
                max_retries: 0,
            })
            .await?;
        decode(value, "order")
    }

    async fn update_order_status(&self, id: i64, status: &str) -> Result<(), SyncError> {
        let path = format!("/api/orders/{}", id);
        self.fetch(FetchRequest {
            method: Method::PATCH,
            path: &path,
            status: None,
            body: Some(json!({ "status": status })),
            max_retries: self.policy.max_retries,
        })
        .await?;
        Ok(())
    }

    async fn delete_order(&self, id: i64) -> Result<(), SyncError> {
        let path = format!("/api/orders/{}", id);
        self.fetch(FetchRequest {
            method: Method::DELETE,
            path: &path,
            status: None,
            body: None,
            max_retries: self.policy.max_retries,
        })
        .await?;
        Ok(())
    }
}
