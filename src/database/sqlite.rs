use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

use crate::config::DatabaseConfig;
use crate::database::manager::{Backend, DatabaseError};
use crate::database::store::impl_order_store;

/// SQLite-backed order store, used for single-counter installs and tests
pub struct SqliteOrderStore {
    pool: SqlitePool,
}

impl SqliteOrderStore {
    const SCHEMA: &'static [&'static str] = &[
        r#"
        CREATE TABLE IF NOT EXISTS orders (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            customer_name TEXT NOT NULL,
            item_type TEXT NOT NULL,
            feteer_type TEXT,
            sweet_type TEXT,
            sweet_selections TEXT,
            meat_selection TEXT,
            status TEXT NOT NULL,
            price REAL NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL,
            notes TEXT
        )
        "#,
        "CREATE INDEX IF NOT EXISTS idx_orders_status ON orders (status)",
        "CREATE INDEX IF NOT EXISTS idx_orders_created_at ON orders (created_at)",
        r#"
        CREATE TABLE IF NOT EXISTS menu_items (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            kind TEXT NOT NULL,
            name TEXT NOT NULL,
            price REAL NOT NULL,
            available BOOLEAN NOT NULL DEFAULT 1,
            UNIQUE (kind, name)
        )
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            username TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            role TEXT NOT NULL,
            created_at TEXT NOT NULL
        )
        "#,
    ];

    pub async fn connect(config: &DatabaseConfig) -> Result<Self, DatabaseError> {
        let options = SqliteConnectOptions::from_str(&config.url)?.create_if_missing(true);

        // Every connection to `:memory:` opens its own database, so keep exactly one alive
        let in_memory = config.url.contains(":memory:") || config.url.contains("mode=memory");
        let mut pool_options = SqlitePoolOptions::new()
            .acquire_timeout(Duration::from_secs(config.connection_timeout));
        pool_options = if in_memory {
            pool_options.max_connections(1).idle_timeout(None).max_lifetime(None)
        } else {
            pool_options.max_connections(config.max_connections)
        };

        let pool = pool_options.connect_with(options).await?;
        Ok(Self { pool })
    }

    /// Fresh in-memory store with the schema applied
    pub async fn in_memory() -> Result<Self, DatabaseError> {
        use crate::database::store::OrderStore;

        let store = Self::connect(&DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
            connection_timeout: 5,
        })
        .await?;
        store.migrate().await?;
        Ok(store)
    }
}

impl_order_store!(SqliteOrderStore, Backend::Sqlite);
