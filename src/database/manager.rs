use std::time::Duration;

use sqlx::{postgres::PgPoolOptions, PgPool};
use thiserror::Error;
use tracing::{info, warn};

use crate::config::StorageConfig;

/// Errors from DatabaseManager
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    #[error("Invalid collection or database name: {0}")]
    InvalidName(String),

    #[error("Timed out connecting to {0} after {1:?}")]
    ConnectTimeout(String, Duration),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Opens and verifies the connection pool for the character database.
pub struct DatabaseManager;

impl DatabaseManager {
    /// Connect, retrying once with the longer timeout when the first attempt fails.
    pub async fn connect_with_retry(config: &StorageConfig) -> Result<PgPool, DatabaseError> {
        match Self::connect(config, config.connect_timeout()).await {
            Ok(pool) => Ok(pool),
            Err(e) => {
                warn!("Failed to initialize database client with error: {}, trying again", e);
                Self::connect(config, config.retry_timeout()).await
            }
        }
    }

    /// Connect to the configured database and ping it within `timeout`.
    pub async fn connect(config: &StorageConfig, timeout: Duration) -> Result<PgPool, DatabaseError> {
        if !Self::is_valid_name(&config.database) {
            return Err(DatabaseError::InvalidName(config.database.clone()));
        }
        let base = config
            .database_url
            .as_deref()
            .ok_or(DatabaseError::ConfigMissing("DATABASE_URL"))?;
        let connection_string = Self::build_connection_string(base, &config.database)?;

        let connect = async {
            let pool = PgPoolOptions::new()
                .acquire_timeout(timeout)
                .connect(&connection_string)
                .await?;
            Self::health_check(&pool).await?;
            Ok::<_, DatabaseError>(pool)
        };

        let pool = tokio::time::timeout(timeout, connect)
            .await
            .map_err(|_| DatabaseError::ConnectTimeout(config.database.clone(), timeout))??;

        info!("Created database pool for: {}", config.database);
        Ok(pool)
    }

    fn build_connection_string(base: &str, database_name: &str) -> Result<String, DatabaseError> {
        let mut url = url::Url::parse(base).map_err(|_| DatabaseError::InvalidDatabaseUrl)?;
        // Replace the path with the database name (ensure leading slash)
        url.set_path(&format!("/{}", database_name));
        Ok(url.into())
    }

    /// Pings the pool to ensure connectivity
    pub async fn health_check(pool: &PgPool) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(pool).await?;
        Ok(())
    }

    /// Quote SQL identifier to prevent injection
    pub fn quote_identifier(name: &str) -> String {
        format!("\"{}\"", name.replace('"', "\"\""))
    }

    /// Database and collection names: a letter or underscore followed by
    /// `[a-zA-Z0-9_]`, at most 63 bytes.
    pub fn is_valid_name(name: &str) -> bool {
        let mut chars = name.chars();
        match chars.next() {
            Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
            _ => return false,
        }
        name.len() <= 63 && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
    }
}
