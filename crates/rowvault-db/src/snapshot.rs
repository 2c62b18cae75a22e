//! Schema snapshot reader.
//!
//! Reads the tables of one live schema (columns in catalog order, primary
//! keys, secondary indexes) into a [`SchemaSnapshot`] that a
//! synchronization batch then owns and mutates. Read-only against the
//! database.

use std::time::Instant;

use sqlx::postgres::PgConnection;
use sqlx::Row;
use tracing::info;

use rowvault_core::{Column, Error, Index, Result, SchemaSnapshot, Table};

use crate::identifiers::validate_identifier;

/// Catalog-backed implementation of the snapshot read.
pub struct PgSchemaReader;

impl PgSchemaReader {
    /// Read every ordinary table of `schema` into a snapshot.
    ///
    /// Fails with [`Error::SchemaRead`] when the catalog cannot be
    /// enumerated; a failure here aborts the batch before any object is
    /// processed.
    pub async fn read(conn: &mut PgConnection, schema: &str) -> Result<SchemaSnapshot> {
        validate_identifier(schema)?;
        let start = Instant::now();

        let mut snapshot = SchemaSnapshot::new(schema);

        // Ordinary tables only; extension-owned relations are not ours to mirror.
        let tables: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT c.relname::text
            FROM pg_class c
            JOIN pg_namespace n ON c.relnamespace = n.oid
            WHERE n.nspname = $1
                AND c.relkind = 'r'
                AND NOT EXISTS (
                    SELECT 1 FROM pg_depend d
                    WHERE d.objid = c.oid AND d.deptype = 'e'
                )
            ORDER BY c.relname
            "#,
        )
        .bind(schema)
        .fetch_all(&mut *conn)
        .await
        .map_err(|e| Error::SchemaRead(e.to_string()))?;

        for table in &tables {
            snapshot.insert(Table::new(table.clone()));
        }

        // Columns in ordinal order, with identity/serial detection.
        let column_rows = sqlx::query(
            r#"
            SELECT
                table_name::text AS table_name,
                column_name::text AS column_name,
                data_type::text AS data_type,
                character_maximum_length::int4 AS max_length,
                (is_nullable = 'NO') AS required,
                (is_identity = 'YES'
                    OR COALESCE(column_default, '') LIKE 'nextval(%') AS auto_increment
            FROM information_schema.columns
            WHERE table_schema = $1
            ORDER BY table_name, ordinal_position
            "#,
        )
        .bind(schema)
        .fetch_all(&mut *conn)
        .await
        .map_err(|e| Error::SchemaRead(e.to_string()))?;

        for row in &column_rows {
            let table_name: String = row.get("table_name");
            let mut column = Column::new(
                row.get::<String, _>("column_name"),
                row.get::<String, _>("data_type"),
            );
            column.size = row.get::<Option<i32>, _>("max_length");
            column.required = row.get("required");
            column.auto_increment = row.get("auto_increment");
            if let Some(table) = snapshot.get_mut(&table_name) {
                table.push_column(column);
            }
        }

        // Primary-key membership.
        let pk_rows = sqlx::query(
            r#"
            SELECT c.relname::text AS table_name, a.attname::text AS column_name
            FROM pg_index i
            JOIN pg_class c ON c.oid = i.indrelid
            JOIN pg_namespace n ON c.relnamespace = n.oid
            JOIN pg_attribute a ON a.attrelid = c.oid AND a.attnum = ANY(i.indkey)
            WHERE n.nspname = $1 AND i.indisprimary
            "#,
        )
        .bind(schema)
        .fetch_all(&mut *conn)
        .await
        .map_err(|e| Error::SchemaRead(e.to_string()))?;

        for row in &pk_rows {
            let table_name: String = row.get("table_name");
            let column_name: String = row.get("column_name");
            if let Some(table) = snapshot.get_mut(&table_name) {
                for column in &mut table.columns {
                    if column.name_matches(&column_name) {
                        column.primary_key = true;
                    }
                }
            }
        }

        // Secondary indexes (unique and non-unique), primary keys excluded.
        let index_rows = sqlx::query(
            r#"
            SELECT
                c.relname::text AS table_name,
                ic.relname::text AS index_name,
                i.indisunique AS is_unique,
                array_agg(a.attname::text ORDER BY a.attnum) AS columns
            FROM pg_index i
            JOIN pg_class c ON c.oid = i.indrelid
            JOIN pg_class ic ON ic.oid = i.indexrelid
            JOIN pg_namespace n ON c.relnamespace = n.oid
            JOIN pg_attribute a ON a.attrelid = c.oid AND a.attnum = ANY(i.indkey)
            WHERE n.nspname = $1 AND NOT i.indisprimary
            GROUP BY c.relname, ic.relname, i.indisunique
            ORDER BY c.relname, ic.relname
            "#,
        )
        .bind(schema)
        .fetch_all(&mut *conn)
        .await
        .map_err(|e| Error::SchemaRead(e.to_string()))?;

        for row in &index_rows {
            let table_name: String = row.get("table_name");
            let index = Index {
                name: row.get("index_name"),
                unique: row.get("is_unique"),
                columns: row.get("columns"),
            };
            if let Some(table) = snapshot.get_mut(&table_name) {
                table.indexes.push(index);
            }
        }

        info!(
            subsystem = "database",
            component = "snapshot",
            op = "read_snapshot",
            db_schema = schema,
            table_count = snapshot.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Schema snapshot read"
        );

        Ok(snapshot)
    }
}
