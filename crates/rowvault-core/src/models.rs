//! Core data models for rowvault.
//!
//! The schema model (`Column`, `Table`, `SchemaSnapshot`) is an in-memory
//! picture of one live PostgreSQL schema, owned exclusively by a single
//! synchronization batch. The batch mutates it table-by-table and records
//! every structural addition as a [`PendingChange`], which the DDL emitter
//! later renders; the snapshot is discarded when the batch ends.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::naming;

// =============================================================================
// SCHEMA MODEL
// =============================================================================

/// A column definition as read from the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    /// Column name as stored in the catalog.
    pub name: String,
    /// Catalog type name (`varchar`, `integer`, `timestamp without time zone`, ...).
    pub type_name: String,
    /// Declared length for character types.
    pub size: Option<i32>,
    /// NOT NULL in the live table.
    pub required: bool,
    /// Identity/serial column.
    pub auto_increment: bool,
    /// Member of the table's primary key.
    pub primary_key: bool,
}

impl Column {
    /// Plain nullable column of the given type.
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            size: None,
            required: false,
            auto_increment: false,
            primary_key: false,
        }
    }

    /// Set the declared length.
    pub fn with_size(mut self, size: i32) -> Self {
        self.size = Some(size);
        self
    }

    /// Mark NOT NULL.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Mark identity/serial.
    pub fn auto_increment(mut self) -> Self {
        self.auto_increment = true;
        self
    }

    /// Mark as primary-key member.
    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    /// Structural copy. With `strip_constraints` the copy is a plain
    /// nullable column: not required, not auto-increment, not primary key.
    pub fn cloned(&self, strip_constraints: bool) -> Column {
        let mut copy = self.clone();
        if strip_constraints {
            copy.required = false;
            copy.auto_increment = false;
            copy.primary_key = false;
        }
        copy
    }

    /// Case-insensitive name match, the comparison used throughout.
    pub fn name_matches(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }
}

/// A secondary index (unique or not) on a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Index {
    pub name: String,
    pub unique: bool,
    pub columns: Vec<String>,
}

/// One table of the snapshot: ordered columns plus secondary indexes.
/// Primary-key membership lives on the columns themselves.
///
/// Invariant: column names are unique under case-insensitive comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub name: String,
    pub columns: Vec<Column>,
    pub indexes: Vec<Index>,
}

impl Table {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            indexes: Vec::new(),
        }
    }

    /// Look up a column by case-insensitive name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name_matches(name))
    }

    /// Whether a column exists under case-insensitive comparison.
    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    /// Append a column, preserving catalog order.
    pub fn push_column(&mut self, column: Column) {
        self.columns.push(column);
    }

    /// Columns flagged as primary-key members, in column order.
    pub fn primary_key_columns(&self) -> Vec<&Column> {
        self.columns.iter().filter(|c| c.primary_key).collect()
    }

    /// Drop every secondary index.
    pub fn clear_indexes(&mut self) {
        self.indexes.clear();
    }
}

/// Structural changes accumulated by a batch, in application order.
/// Rendered into DDL by the emitter, then drained per object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingChange {
    /// A table registered during this batch, complete with its final
    /// column set (parent-extension columns included).
    CreateTable(Table),
    /// A column appended to an existing table during this batch.
    AddColumn { table: String, column: Column },
}

/// In-memory model of one live schema, keyed by lower-cased table name.
///
/// Read once at the start of a batch and mutated in place as archive
/// tables are created or grown, so an object later in the batch sees the
/// tables created for earlier objects without re-querying the database.
/// Never shared across batches or threads.
#[derive(Debug, Clone)]
pub struct SchemaSnapshot {
    schema: String,
    tables: HashMap<String, Table>,
    pending: Vec<PendingChange>,
}

impl SchemaSnapshot {
    pub fn new(schema: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            tables: HashMap::new(),
            pending: Vec::new(),
        }
    }

    /// Schema this snapshot was read from.
    pub fn schema(&self) -> &str {
        &self.schema
    }

    /// Number of tables currently in the snapshot.
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Insert a table read from the catalog. Does not record a pending
    /// change; use [`SchemaSnapshot::register_new_table`] for tables that
    /// must still be created in the database.
    pub fn insert(&mut self, table: Table) {
        self.tables.insert(table.name.to_lowercase(), table);
    }

    /// Case-insensitive table lookup.
    pub fn get(&self, name: &str) -> Option<&Table> {
        self.tables.get(&name.to_lowercase())
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Table> {
        self.tables.get_mut(&name.to_lowercase())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tables.contains_key(&name.to_lowercase())
    }

    /// Register a table that exists only in the snapshot so far and record
    /// the matching [`PendingChange::CreateTable`].
    pub fn register_new_table(&mut self, table: Table) {
        self.pending.push(PendingChange::CreateTable(table.clone()));
        self.insert(table);
    }

    /// Append a column to an existing table and record the matching
    /// [`PendingChange::AddColumn`]. Returns false when the table is
    /// missing from the snapshot.
    pub fn add_column(&mut self, table_name: &str, column: Column) -> bool {
        match self.get_mut(table_name) {
            Some(table) => {
                let canonical = table.name.clone();
                table.push_column(column.clone());
                self.pending.push(PendingChange::AddColumn {
                    table: canonical,
                    column,
                });
                true
            }
            None => false,
        }
    }

    /// Drain the changes accumulated since the last call. The orchestrator
    /// calls this once per object, so a failed object's changes never leak
    /// into the next object's DDL.
    pub fn take_pending(&mut self) -> Vec<PendingChange> {
        std::mem::take(&mut self.pending)
    }

    /// Changes accumulated and not yet drained.
    pub fn pending(&self) -> &[PendingChange] {
        &self.pending
    }
}

// =============================================================================
// REQUEST / RESULT TYPES
// =============================================================================

/// One object of an archive-synchronization batch.
///
/// Parent propagation activates only when both `parent_object` and
/// `ref_field` are present and non-empty; otherwise archival proceeds
/// without it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiveRequest {
    #[serde(rename = "childObj")]
    pub child_object: String,
    #[serde(rename = "parentObj", default)]
    pub parent_object: Option<String>,
    #[serde(rename = "refField", default)]
    pub ref_field: Option<String>,
}

impl ArchiveRequest {
    /// Request without parent propagation.
    pub fn new(child_object: impl Into<String>) -> Self {
        Self {
            child_object: child_object.into(),
            parent_object: None,
            ref_field: None,
        }
    }

    /// Request with a parent object and reference field.
    pub fn with_parent(
        child_object: impl Into<String>,
        parent_object: impl Into<String>,
        ref_field: impl Into<String>,
    ) -> Self {
        Self {
            child_object: child_object.into(),
            parent_object: Some(parent_object.into()),
            ref_field: Some(ref_field.into()),
        }
    }

    /// The declared parent object, when non-empty.
    pub fn parent(&self) -> Option<&str> {
        self.parent_object.as_deref().filter(|p| !p.is_empty())
    }

    /// `(parent_object, ref_field)` when both are present and non-empty,
    /// i.e. when parent propagation applies.
    pub fn parent_propagation(&self) -> Option<(&str, &str)> {
        let parent = self.parent()?;
        let ref_field = self.ref_field.as_deref().filter(|r| !r.is_empty())?;
        Some((parent, ref_field))
    }

    /// Whether the child is the multi-parent kind.
    pub fn is_multi_parent(&self) -> bool {
        naming::is_multi_parent(&self.child_object)
    }
}

/// A record to delete, addressed by object name and surrogate id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordRef {
    pub object: String,
    pub id: String,
}

/// Archive-plan status row: record id plus last-modified timestamp in
/// epoch milliseconds (null when the row has none).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchivePlanStatus {
    pub record_id: String,
    pub timestamp: Option<i64>,
}

/// Final state of one batch object: committed with its generated SQL kept
/// for audit logging, or failed with the recorded message. Objects move
/// Pending → Processing → Committed | Failed; only the terminal states
/// outlive the batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ObjectOutcome {
    Committed {
        object: String,
        statements: Vec<String>,
    },
    Failed {
        object: String,
        message: String,
    },
}

impl ObjectOutcome {
    pub fn object(&self) -> &str {
        match self {
            ObjectOutcome::Committed { object, .. } => object,
            ObjectOutcome::Failed { object, .. } => object,
        }
    }

    pub fn is_committed(&self) -> bool {
        matches!(self, ObjectOutcome::Committed { .. })
    }
}

/// Ordered per-object outcomes of one batch. Every input object yields
/// exactly one outcome; committed objects stay committed even when the
/// batch as a whole reports failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchReport {
    pub outcomes: Vec<ObjectOutcome>,
}

impl BatchReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, outcome: ObjectOutcome) {
        self.outcomes.push(outcome);
    }

    /// Messages of the failed objects, in input order.
    pub fn errors(&self) -> Vec<String> {
        self.outcomes
            .iter()
            .filter_map(|o| match o {
                ObjectOutcome::Failed { message, .. } => Some(message.clone()),
                ObjectOutcome::Committed { .. } => None,
            })
            .collect()
    }

    pub fn is_success(&self) -> bool {
        self.outcomes.iter().all(ObjectOutcome::is_committed)
    }

    /// Collapse into the caller-facing result: the report itself on full
    /// success, otherwise [`crate::Error::Batch`] with one message per
    /// failed object.
    pub fn into_result(self) -> crate::Result<BatchReport> {
        let errors = self.errors();
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(crate::Error::Batch(errors))
        }
    }
}

/// Transport-facing rendering of an aggregate failure. An empty error
/// list is treated as success.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorsResponse {
    pub errors: Vec<String>,
}

impl ErrorsResponse {
    pub fn new(errors: Vec<String>) -> Self {
        Self { errors }
    }

    pub fn from_message(error: impl Into<String>) -> Self {
        Self {
            errors: vec![error.into()],
        }
    }

    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }
}

impl From<&crate::Error> for ErrorsResponse {
    fn from(err: &crate::Error) -> Self {
        match err {
            crate::Error::Batch(messages) => Self::new(messages.clone()),
            other => Self::from_message(other.to_string()),
        }
    }
}
