//! Trigger SQL generation.
//!
//! Pure string builders for the delete-archival trigger, the
//! parent-reference propagation trigger, and trigger teardown. No database
//! access; the orchestrator executes what these return.
//!
//! The delete-archival function enumerates the live table's columns from
//! `INFORMATION_SCHEMA.COLUMNS` at trigger-fire time instead of baking the
//! column list into the trigger body, so the trigger keeps working after
//! later column additions without regeneration. Column names are cast to
//! `VARCHAR(100)` inside the body, comfortably past any identifier the
//! platform accepts.
//!
//! Multi-statement scripts are returned as one string per statement;
//! nothing here (or downstream) ever splits SQL text on `;`.

use rowvault_core::{naming, Result};

use crate::identifiers::{ensure_generated_fits, validate_identifier, validate_object_name};

/// Name of the delete-archival trigger function for a table.
pub fn archive_function_name(table: &str) -> String {
    format!("archive_procedure_{}", table)
}

/// Name of the delete-archival trigger installed on the live table.
pub fn delete_trigger_name(table: &str) -> String {
    format!("a__{}_delete", table)
}

/// Name of the parent-propagation trigger function for a table.
pub fn parent_ext_function_name(table: &str) -> String {
    format!("update_parent_ext_id_procedure_{}", table)
}

/// Name of the parent-propagation trigger installed on the archive table.
pub fn insert_trigger_name(table: &str) -> String {
    format!("a__{}_insert", table)
}

fn validate_trigger_target(schema: &str, table: &str) -> Result<()> {
    validate_identifier(schema)?;
    validate_object_name(table)?;
    ensure_generated_fits(&naming::archive_table_name(table))?;
    Ok(())
}

/// Statements installing the delete-archival trigger for `table`: the
/// trigger function, removal of any prior trigger instance, and the
/// trigger itself. `DROP TRIGGER IF EXISTS` before `CREATE TRIGGER`
/// guarantees a single instance however often this runs.
pub fn archive_trigger_statements(schema: &str, table: &str) -> Result<Vec<String>> {
    validate_trigger_target(schema, table)?;
    let function = archive_function_name(table);
    let trigger = delete_trigger_name(table);
    ensure_generated_fits(&function)?;
    ensure_generated_fits(&trigger)?;
    let archive = naming::archive_table_name(table);

    let create_function = format!(
        r#"CREATE OR REPLACE FUNCTION {function}()
    RETURNS trigger AS
$BODY$
BEGIN
    EXECUTE 'INSERT INTO {schema}.{archive}(' || ARRAY_TO_STRING(ARRAY(
            SELECT COLUMN_NAME::VARCHAR(100)
            FROM INFORMATION_SCHEMA.COLUMNS
            WHERE TABLE_NAME = '{table}'
              AND TABLE_SCHEMA = '{schema}'
            ORDER BY ORDINAL_POSITION
        ), ', ') || ')'
        || ' SELECT $1.' || ARRAY_TO_STRING(ARRAY(
            SELECT COLUMN_NAME::VARCHAR(100)
            FROM INFORMATION_SCHEMA.COLUMNS
            WHERE TABLE_NAME = '{table}'
              AND TABLE_SCHEMA = '{schema}'
            ORDER BY ORDINAL_POSITION
        ), ', $1.')
        USING OLD;
    RETURN OLD;
END;
$BODY$
LANGUAGE plpgsql"#,
        function = function,
        schema = schema,
        archive = archive,
        table = table,
    );

    let drop_trigger = format!(
        "DROP TRIGGER IF EXISTS {} ON {}.{}",
        trigger, schema, table
    );
    let create_trigger = format!(
        "CREATE TRIGGER {} BEFORE DELETE ON {}.{} FOR EACH ROW EXECUTE PROCEDURE {}()",
        trigger, schema, table, function
    );

    Ok(vec![create_function, drop_trigger, create_trigger])
}

/// Statements installing the parent-propagation trigger on the archive
/// table of `table`: a BEFORE INSERT trigger setting each tracking column
/// (one, or three for the multi-parent kind) to `NEW.<ref_field>`,
/// replacing any prior trigger of the same name.
pub fn parent_ext_trigger_statements(
    schema: &str,
    table: &str,
    ref_field: &str,
    multi_parent: bool,
) -> Result<Vec<String>> {
    validate_trigger_target(schema, table)?;
    validate_identifier(ref_field)?;
    let function = parent_ext_function_name(table);
    let trigger = insert_trigger_name(table);
    ensure_generated_fits(&function)?;
    ensure_generated_fits(&trigger)?;
    let archive = naming::archive_table_name(table);

    let assignments: String = naming::parent_extension_columns(multi_parent)
        .iter()
        .map(|column| format!("    NEW.{} = NEW.{};\n", column, ref_field))
        .collect();

    let create_function = format!(
        r#"CREATE OR REPLACE FUNCTION {function}()
    RETURNS trigger AS
$BODY$
BEGIN
{assignments}    RETURN NEW;
END;
$BODY$
LANGUAGE plpgsql"#,
        function = function,
        assignments = assignments,
    );

    let drop_trigger = format!(
        "DROP TRIGGER IF EXISTS {} ON {}.{}",
        trigger, schema, archive
    );
    let create_trigger = format!(
        "CREATE TRIGGER {} BEFORE INSERT ON {}.{} FOR EACH ROW EXECUTE PROCEDURE {}()",
        trigger, schema, archive, function
    );

    Ok(vec![create_function, drop_trigger, create_trigger])
}

/// Teardown statement decommissioning archival for `table`. `IF EXISTS`
/// makes removal of a never-installed trigger a reportable success.
pub fn drop_archive_trigger_statement(schema: &str, table: &str) -> Result<String> {
    validate_trigger_target(schema, table)?;
    Ok(format!(
        "DROP TRIGGER IF EXISTS {} ON {}.{}",
        delete_trigger_name(table),
        schema,
        table
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rowvault_core::Error;

    #[test]
    fn test_trigger_and_function_names() {
        assert_eq!(archive_function_name("account"), "archive_procedure_account");
        assert_eq!(delete_trigger_name("account"), "a__account_delete");
        assert_eq!(
            parent_ext_function_name("account"),
            "update_parent_ext_id_procedure_account"
        );
        assert_eq!(insert_trigger_name("account"), "a__account_insert");
    }

    #[test]
    fn test_archive_trigger_statement_set() {
        let statements = archive_trigger_statements("salesforce", "account").unwrap();
        assert_eq!(statements.len(), 3);
        assert!(statements[0].starts_with("CREATE OR REPLACE FUNCTION archive_procedure_account()"));
        assert_eq!(
            statements[1],
            "DROP TRIGGER IF EXISTS a__account_delete ON salesforce.account"
        );
        assert_eq!(
            statements[2],
            "CREATE TRIGGER a__account_delete BEFORE DELETE ON salesforce.account \
             FOR EACH ROW EXECUTE PROCEDURE archive_procedure_account()"
        );
    }

    #[test]
    fn test_archive_function_enumerates_columns_at_fire_time() {
        let statements = archive_trigger_statements("salesforce", "account").unwrap();
        let body = &statements[0];
        // Column lists come from the catalog when the trigger fires; the
        // body must not carry a baked-in column list.
        assert_eq!(body.matches("INFORMATION_SCHEMA.COLUMNS").count(), 2);
        assert_eq!(body.matches("ORDER BY ORDINAL_POSITION").count(), 2);
        assert!(body.contains("INSERT INTO salesforce.a__account("));
        assert!(body.contains("' SELECT $1.'"));
        assert!(body.contains("USING OLD"));
        assert!(body.contains("RETURN OLD"));
        assert!(!body.contains("sfid"));
    }

    #[test]
    fn test_archive_function_filters_on_live_table() {
        let statements = archive_trigger_statements("salesforce", "contact").unwrap();
        assert!(statements[0].contains("TABLE_NAME = 'contact'"));
        assert!(statements[0].contains("TABLE_SCHEMA = 'salesforce'"));
    }

    #[test]
    fn test_parent_ext_trigger_single_parent() {
        let statements =
            parent_ext_trigger_statements("salesforce", "contentversion", "parentid", false)
                .unwrap();
        assert_eq!(statements.len(), 3);
        let body = &statements[0];
        assert!(body.starts_with(
            "CREATE OR REPLACE FUNCTION update_parent_ext_id_procedure_contentversion()"
        ));
        assert!(body.contains("NEW.ParentExtID = NEW.parentid;"));
        assert!(!body.contains("ParentExtID1"));
        assert!(body.contains("RETURN NEW"));
        assert_eq!(
            statements[1],
            "DROP TRIGGER IF EXISTS a__contentversion_insert ON salesforce.a__contentversion"
        );
        assert_eq!(
            statements[2],
            "CREATE TRIGGER a__contentversion_insert BEFORE INSERT ON salesforce.a__contentversion \
             FOR EACH ROW EXECUTE PROCEDURE update_parent_ext_id_procedure_contentversion()"
        );
    }

    #[test]
    fn test_parent_ext_trigger_multi_parent_sets_all_three() {
        let statements =
            parent_ext_trigger_statements("salesforce", "attachment", "parentid", true).unwrap();
        let body = &statements[0];
        assert!(body.contains("NEW.ParentExtID1 = NEW.parentid;"));
        assert!(body.contains("NEW.ParentExtID2 = NEW.parentid;"));
        assert!(body.contains("NEW.ParentExtID3 = NEW.parentid;"));
    }

    #[test]
    fn test_drop_archive_trigger_statement() {
        let sql = drop_archive_trigger_statement("salesforce", "account").unwrap();
        assert_eq!(
            sql,
            "DROP TRIGGER IF EXISTS a__account_delete ON salesforce.account"
        );
    }

    #[test]
    fn test_injection_in_table_name_rejected() {
        assert!(archive_trigger_statements("salesforce", "account; DROP TABLE x").is_err());
        assert!(drop_archive_trigger_statement("salesforce", "account'--").is_err());
    }

    #[test]
    fn test_injection_in_ref_field_rejected() {
        let result =
            parent_ext_trigger_statements("salesforce", "account", "parentid; DELETE", false);
        assert!(result.is_err());
    }

    #[test]
    fn test_long_object_name_fails_as_ddl_error() {
        // Accepted at the API boundary (under 100 chars) but the derived
        // function name overflows the PostgreSQL identifier limit.
        let name = "x".repeat(60);
        match archive_trigger_statements("salesforce", &name) {
            Err(Error::Ddl(msg)) => assert!(msg.contains("63")),
            other => panic!("expected Ddl error, got {:?}", other),
        }
    }
}
