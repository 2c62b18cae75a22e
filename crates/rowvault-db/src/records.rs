//! Live-row deletion by surrogate id.
//!
//! The write-side companion of the synchronization engine: deleting a
//! live row fires the installed delete-archival trigger, which copies the
//! row into its archive table. Deletes commit per record with the same
//! partial-failure aggregation as the sync batch.

use async_trait::async_trait;
use sqlx::postgres::{PgConnection, PgPool};
use sqlx::Connection;
use tracing::{info, warn};

use rowvault_core::{
    naming, BatchReport, Error, ObjectOutcome, RecordRef, RecordRepository, Result,
};

use crate::identifiers::{validate_identifier, validate_object_name};

/// PostgreSQL implementation of [`RecordRepository`].
pub struct PgRecordRepository {
    pool: PgPool,
    schema: String,
}

impl PgRecordRepository {
    pub fn new(pool: PgPool) -> Self {
        Self::with_schema(pool, naming::DEFAULT_SCHEMA)
    }

    pub fn with_schema(pool: PgPool, schema: impl Into<String>) -> Self {
        Self {
            pool,
            schema: schema.into(),
        }
    }

    /// Delete one record in its own transaction. Returns the executed
    /// statement, or None when no row matched.
    async fn delete_one(
        &self,
        conn: &mut PgConnection,
        record: &RecordRef,
    ) -> Result<Option<String>> {
        validate_identifier(&self.schema)?;
        validate_object_name(&record.object)?;

        let statement = format!(
            "DELETE FROM {}.{} WHERE sfid = $1",
            self.schema, record.object
        );

        let mut tx = conn.begin().await?;
        let result = sqlx::query(&statement)
            .bind(&record.id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await.map_err(|e| Error::Commit(e.to_string()))?;

        if result.rows_affected() == 0 {
            Ok(None)
        } else {
            Ok(Some(statement))
        }
    }
}

#[async_trait]
impl RecordRepository for PgRecordRepository {
    async fn delete_records(&self, records: &[RecordRef]) -> Result<BatchReport> {
        let mut conn = self.pool.acquire().await?;

        let mut report = BatchReport::new();
        for record in records {
            match self.delete_one(&mut conn, record).await {
                Ok(Some(statement)) => {
                    info!(
                        subsystem = "archive",
                        component = "records",
                        op = "delete_record",
                        db_table = record.object.as_str(),
                        "Record deleted"
                    );
                    report.push(ObjectOutcome::Committed {
                        object: record.object.clone(),
                        statements: vec![statement],
                    });
                }
                Ok(None) => {
                    let message = format!(
                        "row of object {} with sfid={} wasn't deleted. Row doesn't exist",
                        record.object, record.id
                    );
                    warn!(
                        subsystem = "archive",
                        component = "records",
                        op = "delete_record",
                        db_table = record.object.as_str(),
                        error = message.as_str(),
                        "Record deletion matched no row"
                    );
                    report.push(ObjectOutcome::Failed {
                        object: record.object.clone(),
                        message,
                    });
                }
                Err(e) => {
                    warn!(
                        subsystem = "archive",
                        component = "records",
                        op = "delete_record",
                        db_table = record.object.as_str(),
                        error = %e,
                        "Record deletion failed"
                    );
                    report.push(ObjectOutcome::Failed {
                        object: record.object.clone(),
                        message: e.to_string(),
                    });
                }
            }
        }

        report.into_result()
    }
}
