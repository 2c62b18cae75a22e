//! # rowvault-core
//!
//! Core types, traits, and abstractions for rowvault.
//!
//! Rowvault keeps "shadow" archive tables (`a__<table>`) in sync with the
//! live tables of a Salesforce-mirrored PostgreSQL schema and installs the
//! triggers that copy deleted rows into them. This crate holds the schema
//! model, request/result types, error taxonomy, naming rules, and the
//! repository traits the database layer implements.

pub mod error;
pub mod logging;
pub mod models;
pub mod naming;
pub mod traits;

// Re-export commonly used types at crate root
pub use error::{Error, Result};
pub use models::*;
pub use naming::{archive_table_name, is_multi_parent, parent_extension_columns};
pub use traits::*;
