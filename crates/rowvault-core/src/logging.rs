//! Structured logging schema and field name constants for rowvault.
//!
//! All crates use these constants for consistent structured logging fields,
//! so log aggregation tools can query by standardized field names across
//! every subsystem.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Degraded service, requires operator attention |
//! | WARN  | Per-object failure recorded into a batch error list |
//! | INFO  | Batch lifecycle (snapshot read, batch completion) |
//! | DEBUG | Generated SQL, decision points, pool metrics |
//! | TRACE | Per-statement execution |

// ─── Identity fields ───────────────────────────────────────────────────────

/// Subsystem originating the log event.
/// Values: "database", "archive"
pub const SUBSYSTEM: &str = "subsystem";

/// Component within a subsystem.
/// Examples: "pool", "snapshot", "sync", "records", "status"
pub const COMPONENT: &str = "component";

/// Logical operation name.
/// Examples: "read_snapshot", "sync_object", "drop_trigger", "delete_record"
pub const OPERATION: &str = "op";

// ─── Entity fields ─────────────────────────────────────────────────────────

/// Schema being synchronized.
pub const DB_SCHEMA: &str = "db_schema";

/// Live table or archive table affected.
pub const DB_TABLE: &str = "db_table";

// ─── Measurement fields ────────────────────────────────────────────────────

/// Wall-clock duration in milliseconds.
pub const DURATION_MS: &str = "duration_ms";

/// Number of objects in a batch.
pub const OBJECT_COUNT: &str = "object_count";

/// Number of SQL statements executed for one object.
pub const STATEMENT_COUNT: &str = "statement_count";

/// Number of tables read into a snapshot.
pub const TABLE_COUNT: &str = "table_count";

// ─── Database fields ───────────────────────────────────────────────────────

/// Number of active connections in the pool.
pub const POOL_SIZE: &str = "pool_size";

/// Number of idle connections in the pool.
pub const POOL_IDLE: &str = "pool_idle";

// ─── Outcome fields ────────────────────────────────────────────────────────

/// Boolean success/failure indicator.
pub const SUCCESS: &str = "success";

/// Error message when an operation fails.
pub const ERROR_MSG: &str = "error";
