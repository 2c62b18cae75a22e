//! Environment-driven configuration.

use rowvault_core::{naming, Error, Result};

use crate::pool::PoolConfig;

/// Database connection settings, read from the environment.
///
/// `DATABASE_URL` is required; `ARCHIVE_SCHEMA` overrides the default
/// mirrored schema. Binaries and tests load `.env` via `dotenvy` before
/// calling [`DatabaseConfig::from_env`].
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub database_url: String,
    pub schema: String,
    pub pool: PoolConfig,
}

impl DatabaseConfig {
    pub fn from_env() -> Result<Self> {
        let database_url = std::env::var("DATABASE_URL")
            .map_err(|_| Error::Config("DATABASE_URL is not set".to_string()))?;
        let schema = std::env::var("ARCHIVE_SCHEMA")
            .unwrap_or_else(|_| naming::DEFAULT_SCHEMA.to_string());
        Ok(Self {
            database_url,
            schema,
            pool: PoolConfig::default(),
        })
    }

    /// Override the schema.
    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = schema.into();
        self
    }

    /// Override the pool configuration.
    pub fn with_pool(mut self, pool: PoolConfig) -> Self {
        self.pool = pool;
        self
    }
}
