//! Naming rules for archive tables, tracking columns, and related objects.
//!
//! **This module is the single source of truth** for the persisted naming
//! scheme. Every generated identifier (archive tables, parent-extension
//! columns, the archive-plan table) derives from these constants; trigger
//! and function name patterns live with the trigger builders that render
//! them.

/// Prefix of every archive table: `account` archives into `a__account`.
pub const ARCHIVE_TABLE_PREFIX: &str = "a__";

/// Surrogate identifier column carried by every mirrored table.
/// Case-insensitive match; becomes the sole primary key of a new archive table.
pub const SURROGATE_ID_COLUMN: &str = "sfid";

/// Tracking column holding the parent's external id (single-parent objects).
pub const PARENT_EXT_ID_COLUMN: &str = "ParentExtID";

/// Tracking columns for multi-parent objects.
pub const PARENT_EXT_ID_1_COLUMN: &str = "ParentExtID1";
pub const PARENT_EXT_ID_2_COLUMN: &str = "ParentExtID2";
pub const PARENT_EXT_ID_3_COLUMN: &str = "ParentExtID3";

/// Declared width of the parent-extension columns (Salesforce 18-char id).
pub const PARENT_EXT_ID_SIZE: i32 = 18;

/// The one object kind associated with multiple parent relationships.
pub const MULTI_PARENT_TABLE: &str = "attachment";

/// Table consulted for archive-plan status lookups.
pub const ARCHIVE_PLAN_TABLE: &str = "cadarch__archive_plan__c";

/// Live schema mirrored from Salesforce unless configured otherwise.
pub const DEFAULT_SCHEMA: &str = "salesforce";

/// Object names are accepted up to this length at the API boundary.
/// Anything whose derived identifiers overflow the PostgreSQL limit fails
/// per-object instead of being truncated by the server.
pub const MAX_OBJECT_NAME_LEN: usize = 100;

/// Archive table name for a live table.
pub fn archive_table_name(table: &str) -> String {
    format!("{}{}", ARCHIVE_TABLE_PREFIX, table)
}

/// Whether the object kind carries three parent relationships.
pub fn is_multi_parent(table: &str) -> bool {
    table.eq_ignore_ascii_case(MULTI_PARENT_TABLE)
}

/// The tracking column set an archive table needs once a parent object is
/// declared: one column, or three for the multi-parent kind.
pub fn parent_extension_columns(multi_parent: bool) -> &'static [&'static str] {
    if multi_parent {
        &[
            PARENT_EXT_ID_1_COLUMN,
            PARENT_EXT_ID_2_COLUMN,
            PARENT_EXT_ID_3_COLUMN,
        ]
    } else {
        &[PARENT_EXT_ID_COLUMN]
    }
}
