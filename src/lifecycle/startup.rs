//! Startup orchestration.

use std::sync::Arc;

use thiserror::Error;

use crate::config::{ConfigError, DatabaseConfig};
use crate::http::server::ServerError;
use crate::observability::logging::LoggingError;
use crate::store::{InMemoryUserRepository, PgUserRepository, StoreError, UserRepository};

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("logging: {0}")]
    Logging(#[from] LoggingError),

    #[error("record store: {0}")]
    Store(#[from] StoreError),

    #[error("http server: {0}")]
    Server(#[from] ServerError),

    #[error("listener: {0}")]
    Io(#[from] std::io::Error),
}

/// Connect the configured record store.
///
/// PostgreSQL when a database URL is set (the `users` table is created if
/// missing), otherwise an in-memory store.
pub async fn build_repository(config: &DatabaseConfig) -> Result<Arc<dyn UserRepository>, StartupError> {
    if config.url.is_none() {
        tracing::warn!("No database URL configured, keeping users in memory");
        return Ok(Arc::new(InMemoryUserRepository::new()));
    }

    let repo = PgUserRepository::connect(config).await?;
    repo.ensure_schema().await?;
    tracing::info!(
        max_connections = config.max_connections,
        "Connected to PostgreSQL"
    );
    Ok(Arc::new(repo))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::NewUser;

    #[tokio::test]
    async fn test_in_memory_without_url() {
        let repo = build_repository(&DatabaseConfig::default()).await.unwrap();
        let user = repo.create(NewUser::new("Alice", "a@x.com")).await.unwrap();
        assert_eq!(repo.list().await.unwrap(), vec![user]);
    }
}
