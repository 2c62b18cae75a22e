//! Repository trait definitions.
//!
//! Implementations live in `rowvault-db`; the traits keep the engine
//! mockable and keep callers off concrete connection types.

use async_trait::async_trait;

use crate::models::{ArchivePlanStatus, ArchiveRequest, BatchReport, RecordRef};
use crate::Result;

/// Archive-table synchronization and trigger management.
#[async_trait]
pub trait ArchiveSyncRepository: Send + Sync {
    /// Synchronize archive tables and triggers for a batch of objects.
    ///
    /// Objects are processed strictly in input order against one shared
    /// schema snapshot, each inside its own transaction: a failure rolls
    /// back and records that object only, and processing continues. When
    /// any object failed the call returns [`crate::Error::Batch`] with one
    /// message per failed object; objects committed before or after the
    /// failure remain committed.
    async fn sync_objects(&self, objects: &[ArchiveRequest]) -> Result<BatchReport>;

    /// Remove the delete-archival triggers of the named tables.
    ///
    /// Per-table transactions with the same aggregation semantics as
    /// [`ArchiveSyncRepository::sync_objects`]; a trigger that never
    /// existed still counts as success.
    async fn drop_triggers(&self, tables: &[String]) -> Result<BatchReport>;
}

/// Deletion of live rows by surrogate id.
///
/// Each delete fires the installed delete-archival trigger, so this is the
/// write-side companion of the synchronization engine.
#[async_trait]
pub trait RecordRepository: Send + Sync {
    /// Delete the given records, committing per record. A record matching
    /// no row is recorded as that record's error; aggregation follows
    /// [`ArchiveSyncRepository::sync_objects`].
    async fn delete_records(&self, records: &[RecordRef]) -> Result<BatchReport>;
}

/// Archive-plan status lookups.
#[async_trait]
pub trait ArchiveStatusRepository: Send + Sync {
    /// Fetch `(record id, last-modified)` pairs from the archive-plan
    /// table for the given identifiers. Unknown identifiers yield no row.
    async fn find_by_ids(&self, ids: &[String]) -> Result<Vec<ArchivePlanStatus>>;
}
