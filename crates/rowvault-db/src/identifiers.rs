//! Identifier validation for DDL and trigger text.
//!
//! Archive-table DDL and trigger bodies interpolate table, column, and
//! schema names directly into SQL text, so every identifier passes through
//! here first. PostgreSQL identifier rules apply: 63-byte limit,
//! letter/underscore first character, alphanumeric and underscore only.
//!
//! Object names arriving from callers are tolerated up to
//! [`naming::MAX_OBJECT_NAME_LEN`] characters; a name whose derived
//! identifiers (`a__<name>`, trigger and function names) would overflow the
//! PostgreSQL limit fails that object cleanly instead of being truncated by
//! the server.

use rowvault_core::{naming, Error, Result};

/// PostgreSQL identifier length limit in bytes.
pub const PG_IDENTIFIER_LIMIT: usize = 63;

const RESERVED_KEYWORDS: &[&str] = &[
    "pg_catalog",
    "information_schema",
    "pg_toast",
    "select",
    "insert",
    "update",
    "delete",
    "drop",
    "create",
    "alter",
    "grant",
    "revoke",
    "truncate",
];

fn check_charset(name: &str, what: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::InvalidInput(format!("{} cannot be empty", what)));
    }

    if let Some(first) = name.chars().next() {
        if !first.is_ascii_alphabetic() && first != '_' {
            return Err(Error::InvalidInput(format!(
                "{} must start with a letter or underscore, found: '{}'",
                what, first
            )));
        }
    }

    for ch in name.chars() {
        if !ch.is_ascii_alphanumeric() && ch != '_' {
            return Err(Error::InvalidInput(format!(
                "{} contains invalid character: '{}'. Only alphanumeric and underscore allowed",
                what, ch
            )));
        }
    }

    if RESERVED_KEYWORDS.contains(&name.to_lowercase().as_str()) {
        return Err(Error::InvalidInput(format!(
            "{} '{}' is a reserved SQL keyword",
            what, name
        )));
    }

    Ok(())
}

/// Validate an identifier that is used in SQL text as-is (schema names,
/// column names): PostgreSQL charset rules plus the 63-byte limit.
pub fn validate_identifier(name: &str) -> Result<()> {
    check_charset(name, "Identifier")?;
    if name.len() > PG_IDENTIFIER_LIMIT {
        return Err(Error::InvalidInput(format!(
            "Identifier exceeds {} character limit: {} characters",
            PG_IDENTIFIER_LIMIT,
            name.len()
        )));
    }
    Ok(())
}

/// Validate an object (table) name arriving from a caller. Charset rules
/// apply, but the length check is against the API tolerance; the derived
/// identifiers are checked where they are generated.
pub fn validate_object_name(name: &str) -> Result<()> {
    check_charset(name, "Object name")?;
    if name.len() > naming::MAX_OBJECT_NAME_LEN {
        return Err(Error::InvalidInput(format!(
            "Object name exceeds {} character limit: {} characters",
            naming::MAX_OBJECT_NAME_LEN,
            name.len()
        )));
    }
    Ok(())
}

/// Check that a generated identifier fits the PostgreSQL limit, failing
/// with a per-object DDL error otherwise.
pub fn ensure_generated_fits(identifier: &str) -> Result<()> {
    if identifier.len() > PG_IDENTIFIER_LIMIT {
        return Err(Error::Ddl(format!(
            "generated identifier '{}' exceeds the {}-character PostgreSQL limit",
            identifier, PG_IDENTIFIER_LIMIT
        )));
    }
    Ok(())
}
