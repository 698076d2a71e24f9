use std::sync::Arc;
use thiserror::Error;
use tracing::info;

use crate::config::DatabaseConfig;
use crate::database::postgres::PgOrderStore;
use crate::database::sqlite::SqliteOrderStore;
use crate::database::store::OrderStore;

/// Errors from the order store
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Unsupported database URL scheme: {0}")]
    UnsupportedBackend(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

impl DatabaseError {
    /// Map a write failure, turning unique-constraint violations into `Conflict`
    pub(crate) fn from_write(err: sqlx::Error, conflict_message: String) -> Self {
        match &err {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                DatabaseError::Conflict(conflict_message)
            }
            _ => DatabaseError::Sqlx(err),
        }
    }
}

/// Storage engines the facade can run on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Postgres,
    Sqlite,
}

impl Backend {
    /// Pick the backend from the connection URL scheme
    pub fn from_url(url: &str) -> Result<Self, DatabaseError> {
        let url = url.trim();
        if url.is_empty() {
            return Err(DatabaseError::ConfigMissing("DATABASE_URL"));
        }
        if url.starts_with("postgres://") || url.starts_with("postgresql://") {
            Ok(Backend::Postgres)
        } else if url.starts_with("sqlite:") {
            Ok(Backend::Sqlite)
        } else {
            let scheme = url.split(':').next().unwrap_or(url);
            Err(DatabaseError::UnsupportedBackend(scheme.to_string()))
        }
    }
}

/// Builds the store selected by configuration
pub struct DatabaseManager;

impl DatabaseManager {
    /// Connect to the configured database; the URL scheme picks the backend
    pub async fn connect(config: &DatabaseConfig) -> Result<Arc<dyn OrderStore>, DatabaseError> {
        let backend = Backend::from_url(&config.url)?;
        let store: Arc<dyn OrderStore> = match backend {
            Backend::Postgres => Arc::new(PgOrderStore::connect(config).await?),
            Backend::Sqlite => Arc::new(SqliteOrderStore::connect(config).await?),
        };
        info!("Connected order store: {:?}", backend);
        Ok(store)
    }

    /// Connect and create the schema
    pub async fn connect_and_migrate(config: &DatabaseConfig) -> Result<Arc<dyn OrderStore>, DatabaseError> {
        let store = Self::connect(config).await?;
        store.migrate().await?;
        Ok(store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selects_backend_from_scheme() {
        assert_eq!(Backend::from_url("postgres://u:p@localhost/feteer").unwrap(), Backend::Postgres);
        assert_eq!(Backend::from_url("postgresql://localhost/feteer").unwrap(), Backend::Postgres);
        assert_eq!(Backend::from_url("sqlite::memory:").unwrap(), Backend::Sqlite);
        assert_eq!(Backend::from_url("sqlite:feteer.db").unwrap(), Backend::Sqlite);
    }

    #[test]
    fn rejects_unknown_or_missing_url() {
        assert!(matches!(
            Backend::from_url("mysql://localhost/feteer"),
            Err(DatabaseError::UnsupportedBackend(s)) if s == "mysql"
        ));
        assert!(matches!(Backend::from_url("  "), Err(DatabaseError::ConfigMissing(_))));
    }

    #[tokio::test]
    async fn connects_to_in_memory_sqlite() {
        let config = DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 4,
            connection_timeout: 5,
        };
        let store = DatabaseManager::connect_and_migrate(&config).await.unwrap();
        assert_eq!(store.backend(), Backend::Sqlite);
        store.health_check().await.unwrap();
    }
}
