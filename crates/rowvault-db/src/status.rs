//! Archive-plan status lookups.

use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::postgres::PgPool;
use sqlx::Row;

use rowvault_core::{naming, ArchivePlanStatus, ArchiveStatusRepository, Result};

use crate::identifiers::validate_identifier;

/// PostgreSQL implementation of [`ArchiveStatusRepository`], reading the
/// archive-plan table of the mirrored schema.
pub struct PgArchiveStatusRepository {
    pool: PgPool,
    schema: String,
}

impl PgArchiveStatusRepository {
    pub fn new(pool: PgPool) -> Self {
        Self::with_schema(pool, naming::DEFAULT_SCHEMA)
    }

    pub fn with_schema(pool: PgPool, schema: impl Into<String>) -> Self {
        Self {
            pool,
            schema: schema.into(),
        }
    }
}

#[async_trait]
impl ArchiveStatusRepository for PgArchiveStatusRepository {
    async fn find_by_ids(&self, ids: &[String]) -> Result<Vec<ArchivePlanStatus>> {
        validate_identifier(&self.schema)?;

        let statement = format!(
            "SELECT sfid, lastmodifieddate FROM {}.{} WHERE sfid = ANY($1)",
            self.schema,
            naming::ARCHIVE_PLAN_TABLE
        );

        let rows = sqlx::query(&statement)
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;

        let mut statuses = Vec::with_capacity(rows.len());
        for row in &rows {
            let record_id: String = row.try_get("sfid")?;
            let modified: Option<NaiveDateTime> = row.try_get("lastmodifieddate")?;
            statuses.push(ArchivePlanStatus {
                record_id,
                timestamp: modified.map(|t| t.and_utc().timestamp_millis()),
            });
        }

        Ok(statuses)
    }
}
