//! Archive table planning.
//!
//! Given a live table and its (possibly absent) `a__` counterpart in the
//! snapshot, computes the structural state the archive table must reach
//! and records the additions as pending changes. Pure over the in-memory
//! model; the DDL emitter turns the recorded changes into SQL.
//!
//! Archive tables only ever grow: existing columns, indexes, and the
//! primary key are never altered once written, so rows archived under an
//! older shape stay readable.

use rowvault_core::{naming, ArchiveRequest, Column, Error, Result, SchemaSnapshot, Table};

/// The parent-extension columns still missing from a table, built to the
/// declared tracking-column shape (`varchar(18)`, nullable).
pub fn missing_parent_extension_columns(table: &Table, multi_parent: bool) -> Vec<Column> {
    naming::parent_extension_columns(multi_parent)
        .iter()
        .filter(|name| !table.has_column(name))
        .map(|name| Column::new(*name, "varchar").with_size(naming::PARENT_EXT_ID_SIZE))
        .collect()
}

/// Bring the snapshot to the state the archive table of
/// `request.child_object` must reach, recording every addition as a
/// pending change. Returns the archive table name.
///
/// No archive table yet: the original is cloned whole with constraints
/// stripped, `sfid` becomes the sole primary key, every secondary index is
/// dropped, and the parent-extension columns are folded into the new
/// table. Archive table present: original columns missing from it
/// (case-insensitive) are appended as stripped clones, then the
/// parent-extension columns are appended if absent.
///
/// Fails with [`Error::ObjectNotFound`] when the live table is not in the
/// snapshot; the caller records that as the object's failure.
pub fn plan_archive_table(snapshot: &mut SchemaSnapshot, request: &ArchiveRequest) -> Result<String> {
    let table_name = &request.child_object;
    let archive_name = naming::archive_table_name(table_name);

    let original = snapshot
        .get(table_name)
        .cloned()
        .ok_or_else(|| Error::ObjectNotFound(table_name.clone()))?;

    let multi_parent = request.is_multi_parent();
    let wants_parent = request.parent().is_some();

    if snapshot.contains(&archive_name) {
        let new_columns: Vec<Column> = snapshot
            .get(&archive_name)
            .map(|archive| {
                original
                    .columns
                    .iter()
                    .filter(|c| !archive.has_column(&c.name))
                    .map(|c| c.cloned(true))
                    .collect()
            })
            .unwrap_or_default();

        for column in new_columns {
            snapshot.add_column(&archive_name, column);
        }

        if wants_parent {
            let missing = snapshot
                .get(&archive_name)
                .map(|archive| missing_parent_extension_columns(archive, multi_parent))
                .unwrap_or_default();
            for column in missing {
                snapshot.add_column(&archive_name, column);
            }
        }
    } else {
        let mut archive = original.clone();
        archive.name = archive_name.clone();

        for column in &mut archive.columns {
            *column = column.cloned(true);
            if column.name_matches(naming::SURROGATE_ID_COLUMN) {
                column.primary_key = true;
            }
        }
        archive.clear_indexes();

        if wants_parent {
            for column in missing_parent_extension_columns(&archive, multi_parent) {
                archive.push_column(column);
            }
        }

        snapshot.register_new_table(archive);
    }

    Ok(archive_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rowvault_core::{Index, PendingChange};

    fn live_account() -> Table {
        let mut t = Table::new("account");
        t.push_column(Column::new("id", "integer").required().auto_increment());
        t.push_column(Column::new("sfid", "character varying").with_size(18).primary_key());
        t.push_column(Column::new("name", "character varying").with_size(255).required());
        t.push_column(Column::new("isdeleted", "boolean"));
        t.indexes.push(Index {
            name: "account_sfid_idx".to_string(),
            unique: true,
            columns: vec!["sfid".to_string()],
        });
        t.indexes.push(Index {
            name: "account_name_idx".to_string(),
            unique: false,
            columns: vec!["name".to_string()],
        });
        t
    }

    fn snapshot_with_account() -> SchemaSnapshot {
        let mut s = SchemaSnapshot::new("salesforce");
        s.insert(live_account());
        s
    }

    #[test]
    fn test_missing_object_fails_per_object() {
        let mut snapshot = SchemaSnapshot::new("salesforce");
        let err = plan_archive_table(&mut snapshot, &ArchiveRequest::new("ghost")).unwrap_err();
        assert_eq!(err.to_string(), "object ghost doesn't exist");
        assert!(snapshot.pending().is_empty());
    }

    #[test]
    fn test_first_time_archival_clones_whole_table() {
        let mut snapshot = snapshot_with_account();
        let name = plan_archive_table(&mut snapshot, &ArchiveRequest::new("account")).unwrap();
        assert_eq!(name, "a__account");

        let archive = snapshot.get("a__account").expect("archive registered");
        assert_eq!(archive.columns.len(), 4);
        // Constraints are stripped on every clone.
        for column in &archive.columns {
            assert!(!column.required, "column {} must be nullable", column.name);
            assert!(!column.auto_increment);
        }
        // sfid is the sole primary key.
        let pk = archive.primary_key_columns();
        assert_eq!(pk.len(), 1);
        assert_eq!(pk[0].name, "sfid");
        // The archive carries no secondary indexes.
        assert!(archive.indexes.is_empty());
    }

    #[test]
    fn test_first_time_archival_records_create_table() {
        let mut snapshot = snapshot_with_account();
        plan_archive_table(&mut snapshot, &ArchiveRequest::new("account")).unwrap();
        let pending = snapshot.take_pending();
        assert_eq!(pending.len(), 1);
        match &pending[0] {
            PendingChange::CreateTable(t) => assert_eq!(t.name, "a__account"),
            other => panic!("unexpected pending change: {:?}", other),
        }
    }

    #[test]
    fn test_first_time_archival_without_parent_adds_no_tracking_columns() {
        let mut snapshot = snapshot_with_account();
        plan_archive_table(&mut snapshot, &ArchiveRequest::new("account")).unwrap();
        let archive = snapshot.get("a__account").unwrap();
        assert!(!archive.has_column("ParentExtID"));
        assert!(!archive.has_column("ParentExtID1"));
    }

    #[test]
    fn test_first_time_archival_with_parent_folds_tracking_into_create() {
        let mut snapshot = snapshot_with_account();
        let request = ArchiveRequest::with_parent("account", "parentacct", "parentid");
        plan_archive_table(&mut snapshot, &request).unwrap();

        let archive = snapshot.get("a__account").unwrap();
        assert!(archive.has_column("ParentExtID"));
        let col = archive.column("parentextid").unwrap();
        assert_eq!(col.type_name, "varchar");
        assert_eq!(col.size, Some(18));

        // One CreateTable, no separate AddColumn entries for a fresh table.
        let pending = snapshot.take_pending();
        assert_eq!(pending.len(), 1);
    }

    #[test]
    fn test_multi_parent_gets_three_tracking_columns() {
        let mut snapshot = SchemaSnapshot::new("salesforce");
        let mut attachment = Table::new("attachment");
        attachment.push_column(Column::new("sfid", "character varying").with_size(18).primary_key());
        attachment.push_column(Column::new("parentid", "character varying").with_size(18));
        snapshot.insert(attachment);

        let request = ArchiveRequest::with_parent("attachment", "account", "parentid");
        plan_archive_table(&mut snapshot, &request).unwrap();

        let archive = snapshot.get("a__attachment").unwrap();
        assert!(archive.has_column("ParentExtID1"));
        assert!(archive.has_column("ParentExtID2"));
        assert!(archive.has_column("ParentExtID3"));
        assert!(!archive.has_column("ParentExtID"));
    }

    #[test]
    fn test_parent_without_ref_field_still_adds_tracking_columns() {
        // Tracking columns follow the parent object alone; only the
        // propagation trigger needs the reference field.
        let mut snapshot = snapshot_with_account();
        let mut request = ArchiveRequest::new("account");
        request.parent_object = Some("parentacct".to_string());
        plan_archive_table(&mut snapshot, &request).unwrap();
        assert!(snapshot.get("a__account").unwrap().has_column("ParentExtID"));
    }

    #[test]
    fn test_existing_archive_gains_only_missing_columns() {
        let mut snapshot = snapshot_with_account();
        // Archive from a previous run, before `isdeleted` existed upstream.
        let mut archive = Table::new("a__account");
        archive.push_column(Column::new("id", "integer"));
        archive.push_column(Column::new("sfid", "character varying").with_size(18).primary_key());
        archive.push_column(Column::new("name", "character varying").with_size(255));
        snapshot.insert(archive);

        plan_archive_table(&mut snapshot, &ArchiveRequest::new("account")).unwrap();

        let archive = snapshot.get("a__account").unwrap();
        assert_eq!(archive.columns.len(), 4);
        let added = archive.column("isdeleted").unwrap();
        assert!(!added.required);

        let pending = snapshot.take_pending();
        assert_eq!(pending.len(), 1);
        match &pending[0] {
            PendingChange::AddColumn { table, column } => {
                assert_eq!(table, "a__account");
                assert_eq!(column.name, "isdeleted");
            }
            other => panic!("unexpected pending change: {:?}", other),
        }
    }

    #[test]
    fn test_existing_archive_diff_is_case_insensitive() {
        let mut snapshot = snapshot_with_account();
        let mut archive = Table::new("a__account");
        archive.push_column(Column::new("ID", "integer"));
        archive.push_column(Column::new("SFID", "character varying").with_size(18));
        archive.push_column(Column::new("Name", "character varying").with_size(255));
        archive.push_column(Column::new("IsDeleted", "boolean"));
        snapshot.insert(archive);

        plan_archive_table(&mut snapshot, &ArchiveRequest::new("account")).unwrap();
        assert!(snapshot.take_pending().is_empty());
    }

    #[test]
    fn test_existing_archive_never_loses_columns_or_pk() {
        let mut snapshot = snapshot_with_account();
        let mut archive = Table::new("a__account");
        archive.push_column(Column::new("sfid", "character varying").with_size(18).primary_key());
        archive.push_column(Column::new("id", "integer"));
        archive.push_column(Column::new("name", "character varying").with_size(255));
        archive.push_column(Column::new("isdeleted", "boolean"));
        // Tracking column added by an earlier run with a parent declared.
        archive.push_column(Column::new("parentextid", "character varying").with_size(18));
        snapshot.insert(archive);

        // This run declares no parent; the tracking column must survive.
        plan_archive_table(&mut snapshot, &ArchiveRequest::new("account")).unwrap();

        let archive = snapshot.get("a__account").unwrap();
        assert!(archive.has_column("parentextid"));
        assert_eq!(archive.primary_key_columns().len(), 1);
        assert!(snapshot.take_pending().is_empty());
    }

    #[test]
    fn test_rerun_is_idempotent() {
        let mut snapshot = snapshot_with_account();
        let request = ArchiveRequest::with_parent("account", "parentacct", "parentid");

        plan_archive_table(&mut snapshot, &request).unwrap();
        let first = snapshot.take_pending();
        assert!(!first.is_empty());

        let shape_after_first = snapshot.get("a__account").unwrap().clone();

        plan_archive_table(&mut snapshot, &request).unwrap();
        assert!(snapshot.take_pending().is_empty());
        assert_eq!(snapshot.get("a__account").unwrap(), &shape_after_first);
    }

    #[test]
    fn test_read_your_writes_within_batch() {
        // A table created for object N is visible when processing a later
        // duplicate of the same object in the batch.
        let mut snapshot = snapshot_with_account();
        plan_archive_table(&mut snapshot, &ArchiveRequest::new("account")).unwrap();
        snapshot.take_pending();

        plan_archive_table(&mut snapshot, &ArchiveRequest::new("account")).unwrap();
        // Second pass takes the existing-archive path and adds nothing.
        assert!(snapshot.take_pending().is_empty());
    }

    #[test]
    fn test_archive_column_superset_invariant() {
        let mut snapshot = snapshot_with_account();
        plan_archive_table(&mut snapshot, &ArchiveRequest::new("account")).unwrap();

        let live = snapshot.get("account").unwrap().clone();
        let archive = snapshot.get("a__account").unwrap();
        for column in &live.columns {
            assert!(
                archive.has_column(&column.name),
                "archive missing live column {}",
                column.name
            );
        }
    }
}
