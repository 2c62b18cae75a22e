//! DDL emission.
//!
//! Renders the pending changes a batch recorded against its snapshot into
//! `CREATE TABLE` / `ALTER TABLE` statements. Emission is repeat-safe:
//! `IF NOT EXISTS` on both forms means statements already applied produce
//! no further changes.
//!
//! Identifiers are validated before interpolation; type names are taken
//! verbatim from the catalog read (or from the tracking-column constants)
//! and are never caller-supplied.

use rowvault_core::{Column, PendingChange, Result, Table};

use crate::identifiers::{ensure_generated_fits, validate_identifier};

/// Render the drained pending changes of one object into executable
/// statements, in application order.
pub fn render_pending(schema: &str, changes: &[PendingChange]) -> Result<Vec<String>> {
    validate_identifier(schema)?;

    let mut statements = Vec::with_capacity(changes.len());
    for change in changes {
        match change {
            PendingChange::CreateTable(table) => {
                statements.push(render_create_table(schema, table)?);
            }
            PendingChange::AddColumn { table, column } => {
                statements.push(render_add_column(schema, table, column)?);
            }
        }
    }
    Ok(statements)
}

fn render_create_table(schema: &str, table: &Table) -> Result<String> {
    ensure_generated_fits(&table.name)?;
    validate_identifier(&table.name)?;

    let mut definitions = Vec::with_capacity(table.columns.len() + 1);
    for column in &table.columns {
        definitions.push(render_column(column)?);
    }

    let pk: Vec<&str> = table
        .primary_key_columns()
        .iter()
        .map(|c| c.name.as_str())
        .collect();
    if !pk.is_empty() {
        definitions.push(format!("PRIMARY KEY ({})", pk.join(", ")));
    }

    Ok(format!(
        "CREATE TABLE IF NOT EXISTS {}.{} (\n    {}\n)",
        schema,
        table.name,
        definitions.join(",\n    ")
    ))
}

fn render_add_column(schema: &str, table: &str, column: &Column) -> Result<String> {
    ensure_generated_fits(table)?;
    validate_identifier(table)?;
    let definition = render_column(column)?;
    Ok(format!(
        "ALTER TABLE {}.{} ADD COLUMN IF NOT EXISTS {}",
        schema, table, definition
    ))
}

fn render_column(column: &Column) -> Result<String> {
    validate_identifier(&column.name)?;
    let mut definition = format!("{} {}", column.name, render_type(column));
    if column.required {
        definition.push_str(" NOT NULL");
    }
    Ok(definition)
}

fn render_type(column: &Column) -> String {
    match column.size {
        Some(size) if type_takes_length(&column.type_name) => {
            format!("{}({})", column.type_name, size)
        }
        _ => column.type_name.clone(),
    }
}

fn type_takes_length(type_name: &str) -> bool {
    matches!(
        type_name.to_lowercase().as_str(),
        "varchar" | "character varying" | "char" | "character" | "bit" | "bit varying"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rowvault_core::Error;

    fn archive_account() -> Table {
        let mut t = Table::new("a__account");
        t.push_column(Column::new("id", "integer"));
        t.push_column(
            Column::new("sfid", "character varying")
                .with_size(18)
                .primary_key(),
        );
        t.push_column(Column::new("name", "character varying").with_size(255));
        t.push_column(Column::new("createddate", "timestamp without time zone"));
        t
    }

    #[test]
    fn test_create_table_statement_shape() {
        let sql = render_create_table("salesforce", &archive_account()).unwrap();
        assert!(sql.starts_with("CREATE TABLE IF NOT EXISTS salesforce.a__account ("));
        assert!(sql.contains("sfid character varying(18)"));
        assert!(sql.contains("name character varying(255)"));
        assert!(sql.contains("createddate timestamp without time zone"));
        assert!(sql.contains("PRIMARY KEY (sfid)"));
    }

    #[test]
    fn test_create_table_without_primary_key() {
        let mut table = Table::new("a__note");
        table.push_column(Column::new("body", "text"));
        let sql = render_create_table("salesforce", &table).unwrap();
        assert!(!sql.contains("PRIMARY KEY"));
    }

    #[test]
    fn test_nullable_columns_carry_no_not_null() {
        let sql = render_create_table("salesforce", &archive_account()).unwrap();
        assert!(!sql.contains("NOT NULL"));
    }

    #[test]
    fn test_required_column_renders_not_null() {
        let definition = render_column(&Column::new("name", "text").required()).unwrap();
        assert_eq!(definition, "name text NOT NULL");
    }

    #[test]
    fn test_size_ignored_for_non_character_types() {
        let mut column = Column::new("amount", "numeric");
        column.size = Some(10);
        assert_eq!(render_type(&column), "numeric");
    }

    #[test]
    fn test_add_column_statement_shape() {
        let sql = render_add_column(
            "salesforce",
            "a__account",
            &Column::new("rating", "character varying").with_size(40),
        )
        .unwrap();
        assert_eq!(
            sql,
            "ALTER TABLE salesforce.a__account ADD COLUMN IF NOT EXISTS rating character varying(40)"
        );
    }

    #[test]
    fn test_render_pending_preserves_order() {
        let changes = vec![
            PendingChange::CreateTable(archive_account()),
            PendingChange::AddColumn {
                table: "a__account".to_string(),
                column: Column::new("parentextid", "varchar").with_size(18),
            },
        ];
        let statements = render_pending("salesforce", &changes).unwrap();
        assert_eq!(statements.len(), 2);
        assert!(statements[0].starts_with("CREATE TABLE IF NOT EXISTS"));
        assert!(statements[1].starts_with("ALTER TABLE"));
    }

    #[test]
    fn test_render_pending_empty() {
        assert!(render_pending("salesforce", &[]).unwrap().is_empty());
    }

    #[test]
    fn test_invalid_schema_rejected() {
        let err = render_pending("bad-schema", &[]).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn test_oversized_archive_name_fails_as_ddl_error() {
        let table = Table::new(format!("a__{}", "x".repeat(70)));
        match render_create_table("salesforce", &table) {
            Err(Error::Ddl(msg)) => assert!(msg.contains("63")),
            other => panic!("expected Ddl error, got {:?}", other),
        }
    }

    #[test]
    fn test_injection_in_column_name_rejected() {
        let mut table = Table::new("a__account");
        table.push_column(Column::new("x; DROP TABLE account; --", "text"));
        assert!(render_create_table("salesforce", &table).is_err());
    }
}
