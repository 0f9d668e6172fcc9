//! SeaORM storage backend
//!
//! Owns the `urls` and `clicks` tables; supports SQLite, MySQL/MariaDB and
//! PostgreSQL with the backend inferred from the database URL.

mod click_sink;
mod connection;
mod models;
mod mutations;
mod query;
pub mod retry;

use std::sync::Arc;

use sea_orm::DatabaseConnection;
use tracing::info;

use crate::analytics::ClickSink;
use crate::errors::{LinkhopError, Result};

pub use connection::{connect_generic, connect_sqlite, run_migrations};
pub use models::{ShortUrl, UrlFilter, model_to_short_url, short_url_to_active_model};

/// Infer the database backend from the URL
pub fn infer_backend_from_url(database_url: &str) -> Result<String> {
    if database_url.starts_with("sqlite://")
        || database_url.ends_with(".db")
        || database_url.ends_with(".sqlite")
        || database_url == ":memory:"
    {
        Ok("sqlite".to_string())
    } else if database_url.starts_with("mysql://") || database_url.starts_with("mariadb://") {
        Ok("mysql".to_string())
    } else if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://") {
        Ok("postgres".to_string())
    } else {
        Err(LinkhopError::database_config(format!(
            "Cannot infer database backend from URL: {}. Supported: sqlite://, mysql://, mariadb://, postgres://",
            database_url
        )))
    }
}

/// SeaORM-backed store for links and clicks
#[derive(Clone)]
pub struct UrlStore {
    db: DatabaseConnection,
    backend_name: String,
    retry_config: retry::RetryConfig,
}

impl UrlStore {
    pub async fn new(database_url: &str, backend_name: &str) -> Result<Self> {
        if database_url.is_empty() {
            return Err(LinkhopError::database_config(
                "database_url is not set".to_string(),
            ));
        }

        let config = crate::config::get_config();
        let retry_config = retry::RetryConfig {
            max_retries: config.database.retry_count,
            base_delay_ms: config.database.retry_base_delay_ms,
            max_delay_ms: config.database.retry_max_delay_ms,
        };

        let db = if backend_name == "sqlite" {
            connect_sqlite(database_url).await?
        } else {
            connect_generic(database_url, backend_name).await?
        };

        let store = UrlStore {
            db,
            backend_name: backend_name.to_string(),
            retry_config,
        };

        run_migrations(&store.db).await?;

        info!("{} storage initialized", store.backend_name.to_uppercase());
        Ok(store)
    }

    pub fn backend_name(&self) -> &str {
        &self.backend_name
    }

    /// Datastore round-trip, used by the health endpoint
    pub async fn ping(&self) -> Result<()> {
        self.db.ping().await.map_err(Into::into)
    }

    pub fn as_click_sink(self: &Arc<Self>) -> Arc<dyn ClickSink> {
        Arc::clone(self) as Arc<dyn ClickSink>
    }

    pub(crate) fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    pub(crate) fn retry_config(&self) -> retry::RetryConfig {
        self.retry_config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infer_backend_from_url() {
        assert_eq!(infer_backend_from_url("sqlite://test.db").unwrap(), "sqlite");
        assert_eq!(infer_backend_from_url("links.db").unwrap(), "sqlite");
        assert_eq!(infer_backend_from_url(":memory:").unwrap(), "sqlite");
        assert_eq!(
            infer_backend_from_url("mysql://user@host/db").unwrap(),
            "mysql"
        );
        assert_eq!(
            infer_backend_from_url("mariadb://user@host/db").unwrap(),
            "mysql"
        );
        assert_eq!(
            infer_backend_from_url("postgres://user@host/db").unwrap(),
            "postgres"
        );
        assert!(infer_backend_from_url("redis://nope").is_err());
    }
}
