//! Archive synchronization orchestrator.
//!
//! Processes one batch of objects against one shared schema snapshot,
//! per-object transactions with commit-per-object and rollback-on-error.
//! The snapshot, the pooled connection, and their transactions are owned
//! by this batch invocation alone.

use std::time::Instant;

use async_trait::async_trait;
use sqlx::postgres::{PgConnection, PgPool};
use sqlx::Connection;
use tracing::{debug, info, warn};

use rowvault_core::{
    naming, ArchiveRequest, ArchiveSyncRepository, BatchReport, Error, ObjectOutcome, Result,
    SchemaSnapshot,
};

use crate::archive_tables::plan_archive_table;
use crate::ddl::render_pending;
use crate::identifiers::validate_object_name;
use crate::snapshot::PgSchemaReader;
use crate::triggers::{
    archive_trigger_statements, drop_archive_trigger_statement, parent_ext_trigger_statements,
};

/// PostgreSQL implementation of [`ArchiveSyncRepository`].
pub struct PgArchiveSyncRepository {
    pool: PgPool,
    schema: String,
}

impl PgArchiveSyncRepository {
    /// Repository against the default mirrored schema.
    pub fn new(pool: PgPool) -> Self {
        Self::with_schema(pool, naming::DEFAULT_SCHEMA)
    }

    /// Repository against an explicit schema.
    pub fn with_schema(pool: PgPool, schema: impl Into<String>) -> Self {
        Self {
            pool,
            schema: schema.into(),
        }
    }

    /// Schema this repository synchronizes.
    pub fn schema(&self) -> &str {
        &self.schema
    }

    /// Plan, emit, and execute one object inside its own transaction.
    ///
    /// Pending changes are drained from the snapshot before execution, so
    /// a failure here never leaks this object's DDL into the next
    /// object's script. The transaction rolls back on drop when any
    /// statement fails.
    async fn process_object(
        &self,
        conn: &mut PgConnection,
        snapshot: &mut SchemaSnapshot,
        request: &ArchiveRequest,
    ) -> Result<Vec<String>> {
        validate_object_name(&request.child_object)?;

        plan_archive_table(snapshot, request)?;
        let pending = snapshot.take_pending();

        let mut statements = render_pending(&self.schema, &pending)?;
        statements.extend(archive_trigger_statements(
            &self.schema,
            &request.child_object,
        )?);
        if let Some((_, ref_field)) = request.parent_propagation() {
            statements.extend(parent_ext_trigger_statements(
                &self.schema,
                &request.child_object,
                ref_field,
                request.is_multi_parent(),
            )?);
        }

        let mut tx = conn.begin().await?;
        for statement in &statements {
            debug!(
                subsystem = "archive",
                component = "sync",
                op = "execute",
                db_table = request.child_object.as_str(),
                sql = statement.as_str(),
                "Executing archive statement"
            );
            sqlx::query(statement)
                .execute(&mut *tx)
                .await
                .map_err(|e| Error::Ddl(e.to_string()))?;
        }
        tx.commit().await.map_err(|e| Error::Commit(e.to_string()))?;

        Ok(statements)
    }

    /// Remove one table's delete-archival trigger in its own transaction.
    async fn drop_one_trigger(&self, conn: &mut PgConnection, table: &str) -> Result<String> {
        let statement = drop_archive_trigger_statement(&self.schema, table)?;
        let mut tx = conn.begin().await?;
        sqlx::query(&statement)
            .execute(&mut *tx)
            .await
            .map_err(|e| Error::Ddl(e.to_string()))?;
        tx.commit().await.map_err(|e| Error::Commit(e.to_string()))?;
        Ok(statement)
    }
}

#[async_trait]
impl ArchiveSyncRepository for PgArchiveSyncRepository {
    async fn sync_objects(&self, objects: &[ArchiveRequest]) -> Result<BatchReport> {
        let start = Instant::now();

        // One connection and one snapshot for the whole batch; a failure
        // on either aborts before any object is touched.
        let mut conn = self.pool.acquire().await?;
        let mut snapshot = PgSchemaReader::read(&mut conn, &self.schema).await?;

        info!(
            subsystem = "archive",
            component = "sync",
            op = "sync_batch",
            db_schema = self.schema.as_str(),
            object_count = objects.len(),
            "Starting archive synchronization batch"
        );

        let mut report = BatchReport::new();
        for request in objects {
            match self
                .process_object(&mut conn, &mut snapshot, request)
                .await
            {
                Ok(statements) => {
                    info!(
                        subsystem = "archive",
                        component = "sync",
                        op = "sync_object",
                        db_table = request.child_object.as_str(),
                        statement_count = statements.len(),
                        "Archive synchronized"
                    );
                    report.push(ObjectOutcome::Committed {
                        object: request.child_object.clone(),
                        statements,
                    });
                }
                Err(e) => {
                    warn!(
                        subsystem = "archive",
                        component = "sync",
                        op = "sync_object",
                        db_table = request.child_object.as_str(),
                        error = %e,
                        "Archive synchronization failed for object"
                    );
                    report.push(ObjectOutcome::Failed {
                        object: request.child_object.clone(),
                        message: e.to_string(),
                    });
                }
            }
        }

        info!(
            subsystem = "archive",
            component = "sync",
            op = "sync_batch",
            db_schema = self.schema.as_str(),
            object_count = objects.len(),
            success = report.is_success(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Archive synchronization batch finished"
        );

        report.into_result()
    }

    async fn drop_triggers(&self, tables: &[String]) -> Result<BatchReport> {
        let mut conn = self.pool.acquire().await?;

        let mut report = BatchReport::new();
        for table in tables {
            match self.drop_one_trigger(&mut conn, table).await {
                Ok(statement) => {
                    info!(
                        subsystem = "archive",
                        component = "sync",
                        op = "drop_trigger",
                        db_table = table.as_str(),
                        "Archive trigger removed"
                    );
                    report.push(ObjectOutcome::Committed {
                        object: table.clone(),
                        statements: vec![statement],
                    });
                }
                Err(e) => {
                    warn!(
                        subsystem = "archive",
                        component = "sync",
                        op = "drop_trigger",
                        db_table = table.as_str(),
                        error = %e,
                        "Archive trigger removal failed"
                    );
                    report.push(ObjectOutcome::Failed {
                        object: table.clone(),
                        message: e.to_string(),
                    });
                }
            }
        }

        report.into_result()
    }
}
