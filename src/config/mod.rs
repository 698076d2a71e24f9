use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

use crate::types::StatusDomain;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub security: SecurityConfig,
    pub orders: OrderConfig,
    pub sync: SyncConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub enable_request_logging: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// `postgres://...` or `sqlite:...`; the scheme picks the backend
    pub url: String,
    pub max_connections: u32,
    pub connection_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub jwt_secret: String,
    pub jwt_expiry_hours: u64,
    pub cookie_name: String,
    pub secure_cookies: bool,
    pub enable_cors: bool,
    pub cors_origins: Vec<String>,
    pub bcrypt_cost: u32,
    pub admin_username: String,
    pub admin_password: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderConfig {
    /// Every status the server accepts on PATCH /api/orders/:id
    pub statuses: Vec<String>,
    /// Status given to new orders (the kitchen queue)
    pub queue_status: String,
    pub completed_status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    pub base_url: String,
    pub max_retries: u32,
    pub retry_base_delay_ms: u64,
    pub retry_max_delay_ms: u64,
    pub poll_interval_secs: u64,
    pub mutation_debounce_ms: u64,
    pub visibility_debounce_ms: u64,
}

impl OrderConfig {
    pub fn status_domain(&self) -> StatusDomain {
        StatusDomain {
            queue: self.queue_status.clone(),
            completed: self.completed_status.clone(),
        }
    }

    pub fn is_known_status(&self, status: &str) -> bool {
        self.statuses.iter().any(|s| s == status)
    }
}

impl SyncConfig {
    /// Never shorter than one second; a zero period cannot drive an interval
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs.max(1))
    }

    pub fn mutation_debounce(&self) -> Duration {
        Duration::from_millis(self.mutation_debounce_ms)
    }

    pub fn visibility_debounce(&self) -> Duration {
        Duration::from_millis(self.visibility_debounce_ms)
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Server overrides
        if let Some(v) = env::var("FETEER_PORT").ok().or_else(|| env::var("PORT").ok()) {
            self.server.port = v.parse().unwrap_or(self.server.port);
        }
        if let Ok(v) = env::var("FETEER_HOST") {
            self.server.host = v;
        }
        if let Ok(v) = env::var("API_ENABLE_REQUEST_LOGGING") {
            self.server.enable_request_logging = v.parse().unwrap_or(self.server.enable_request_logging);
        }

        // Database overrides
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = v;
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }

        // Security overrides
        if let Ok(v) = env::var("JWT_SECRET") {
            self.security.jwt_secret = v;
        }
        if let Ok(v) = env::var("JWT_EXPIRY_HOURS") {
            self.security.jwt_expiry_hours = v.parse().unwrap_or(self.security.jwt_expiry_hours);
        }
        if let Ok(v) = env::var("AUTH_COOKIE_NAME") {
            self.security.cookie_name = v;
        }
        if let Ok(v) = env::var("SECURE_COOKIES") {
            self.security.secure_cookies = v.parse().unwrap_or(self.security.secure_cookies);
        }
        if let Ok(v) = env::var("SECURITY_ENABLE_CORS") {
            self.security.enable_cors = v.parse().unwrap_or(self.security.enable_cors);
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = split_list(&v);
        }
        if let Ok(v) = env::var("BCRYPT_COST") {
            self.security.bcrypt_cost = v.parse().unwrap_or(self.security.bcrypt_cost);
        }
        if let Ok(v) = env::var("ADMIN_USERNAME") {
            self.security.admin_username = v;
        }
        if let Ok(v) = env::var("ADMIN_PASSWORD") {
            self.security.admin_password = Some(v).filter(|p| !p.is_empty());
        }

        // Order workflow overrides
        if let Ok(v) = env::var("ORDER_STATUSES") {
            let statuses = split_list(&v);
            if !statuses.is_empty() {
                self.orders.statuses = statuses;
            }
        }
        if let Ok(v) = env::var("ORDER_QUEUE_STATUS") {
            self.orders.queue_status = v;
        }
        if let Ok(v) = env::var("ORDER_COMPLETED_STATUS") {
            self.orders.completed_status = v;
        }

        // Sync client overrides
        if let Ok(v) = env::var("SYNC_BASE_URL") {
            self.sync.base_url = v;
        }
        if let Ok(v) = env::var("SYNC_MAX_RETRIES") {
            self.sync.max_retries = v.parse().unwrap_or(self.sync.max_retries);
        }
        if let Ok(v) = env::var("SYNC_RETRY_BASE_DELAY_MS") {
            self.sync.retry_base_delay_ms = v.parse().unwrap_or(self.sync.retry_base_delay_ms);
        }
        if let Ok(v) = env::var("SYNC_RETRY_MAX_DELAY_MS") {
            self.sync.retry_max_delay_ms = v.parse().unwrap_or(self.sync.retry_max_delay_ms);
        }
        if let Ok(v) = env::var("SYNC_POLL_INTERVAL_SECS") {
            self.sync.poll_interval_secs = v.parse().unwrap_or(self.sync.poll_interval_secs);
        }
        if let Ok(v) = env::var("SYNC_MUTATION_DEBOUNCE_MS") {
            self.sync.mutation_debounce_ms = v.parse().unwrap_or(self.sync.mutation_debounce_ms);
        }
        if let Ok(v) = env::var("SYNC_VISIBILITY_DEBOUNCE_MS") {
            self.sync.visibility_debounce_ms = v.parse().unwrap_or(self.sync.visibility_debounce_ms);
        }

        self
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
                enable_request_logging: true,
            },
            database: DatabaseConfig {
                url: "sqlite:feteer.db".to_string(),
                max_connections: 5,
                connection_timeout: 30,
            },
            security: SecurityConfig {
                jwt_secret: "dev-secret-change-me".to_string(),
                jwt_expiry_hours: 24 * 7, // 1 week
                cookie_name: "auth_token".to_string(),
                secure_cookies: false,
                enable_cors: true,
                cors_origins: vec!["http://localhost:3000".to_string()],
                bcrypt_cost: 4,
                admin_username: "admin".to_string(),
                admin_password: Some("admin".to_string()),
            },
            orders: OrderConfig::default(),
            sync: SyncConfig::default(),
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
                enable_request_logging: true,
            },
            database: DatabaseConfig {
                url: "sqlite:feteer-staging.db".to_string(),
                max_connections: 10,
                connection_timeout: 10,
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                jwt_expiry_hours: 24,
                cookie_name: "auth_token".to_string(),
                secure_cookies: true,
                enable_cors: true,
                cors_origins: vec!["https://staging.example.com".to_string()],
                bcrypt_cost: 10,
                admin_username: "admin".to_string(),
                admin_password: None,
            },
            orders: OrderConfig::default(),
            sync: SyncConfig::default(),
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
                enable_request_logging: false,
            },
            database: DatabaseConfig {
                url: "postgres://localhost/feteer".to_string(),
                max_connections: 20,
                connection_timeout: 5,
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                jwt_expiry_hours: 12,
                cookie_name: "auth_token".to_string(),
                secure_cookies: true,
                enable_cors: false,
                cors_origins: Vec::new(),
                bcrypt_cost: 12,
                admin_username: "admin".to_string(),
                admin_password: None,
            },
            orders: OrderConfig::default(),
            sync: SyncConfig::default(),
        }
    }
}

impl Default for OrderConfig {
    fn default() -> Self {
        Self {
            statuses: vec!["ordered".to_string(), "completed".to_string()],
            queue_status: "ordered".to_string(),
            completed_status: "completed".to_string(),
        }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
            max_retries: 2,
            retry_base_delay_ms: 1000,
            retry_max_delay_ms: 5000,
            poll_interval_secs: 30,
            mutation_debounce_ms: 500,
            visibility_debounce_ms: 1000,
        }
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}

#[macro_export]
macro_rules! is_production {
    () => {
        matches!($crate::config::CONFIG.environment, $crate::config::Environment::Production)
    };
}
