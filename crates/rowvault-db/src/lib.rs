//! # rowvault-db
//!
//! PostgreSQL layer for rowvault.
//!
//! This crate provides:
//! - Connection pool management
//! - Schema snapshot reading from the system catalogs
//! - Archive table planning and DDL emission
//! - Delete-archival and parent-propagation trigger generation
//! - The per-object synchronization orchestrator
//! - Record deletion and archive-plan status lookups
//!
//! ## Example
//!
//! ```rust,ignore
//! use rowvault_db::{ArchiveRequest, ArchiveSyncRepository, Database};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::connect("postgres://localhost/rowvault").await?;
//!
//!     db.archives
//!         .sync_objects(&[
//!             ArchiveRequest::new("account"),
//!             ArchiveRequest::with_parent("contentversion", "account", "parentid"),
//!         ])
//!         .await?;
//!     Ok(())
//! }
//! ```

pub mod archive_sync;
pub mod archive_tables;
pub mod config;
pub mod ddl;
pub mod identifiers;
pub mod pool;
pub mod records;
pub mod snapshot;
pub mod status;
pub mod triggers;

// Test fixtures for integration tests
// Note: Always compiled so integration tests (in tests/) can use DEFAULT_TEST_DATABASE_URL
pub mod test_fixtures;

// Re-export core types
pub use rowvault_core::*;

// Re-export repository implementations and building blocks
pub use archive_sync::PgArchiveSyncRepository;
pub use config::DatabaseConfig;
pub use identifiers::{validate_identifier, validate_object_name};
pub use pool::{create_pool, create_pool_with_config, log_pool_metrics, PoolConfig};
pub use records::PgRecordRepository;
pub use snapshot::PgSchemaReader;
pub use status::PgArchiveStatusRepository;

use sqlx::postgres::PgPool;

/// Combined database context with all repositories.
pub struct Database {
    /// The underlying connection pool.
    pub pool: PgPool,
    /// Archive synchronization and trigger management.
    pub archives: PgArchiveSyncRepository,
    /// Live-row deletion by surrogate id.
    pub records: PgRecordRepository,
    /// Archive-plan status lookups.
    pub status: PgArchiveStatusRepository,
}

impl Database {
    /// Repositories against the default mirrored schema.
    pub fn new(pool: PgPool) -> Self {
        Self::with_schema(pool, naming::DEFAULT_SCHEMA)
    }

    /// Repositories against an explicit schema.
    pub fn with_schema(pool: PgPool, schema: impl Into<String>) -> Self {
        let schema = schema.into();
        Self {
            archives: PgArchiveSyncRepository::with_schema(pool.clone(), schema.clone()),
            records: PgRecordRepository::with_schema(pool.clone(), schema.clone()),
            status: PgArchiveStatusRepository::with_schema(pool.clone(), schema),
            pool,
        }
    }

    /// Connect with default pool settings.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = create_pool(database_url).await?;
        Ok(Self::new(pool))
    }

    /// Connect from an environment-derived configuration.
    pub async fn from_config(config: &DatabaseConfig) -> Result<Self> {
        let pool = create_pool_with_config(&config.database_url, config.pool.clone()).await?;
        Ok(Self::with_schema(pool, config.schema.clone()))
    }
}
