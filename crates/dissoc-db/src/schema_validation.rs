//! Schema name validation.
//!
//! The schema namespace is interpolated into `SET LOCAL search_path`, which
//! cannot take bind parameters, so it must be a plain PostgreSQL identifier.

use dissoc_core::{Error, Result};

/// PostgreSQL truncates identifiers beyond this many bytes.
const MAX_IDENTIFIER_LEN: usize = 63;

/// Schemas that must never be selected as the study namespace.
const RESERVED: &[&str] = &[
    "pg_catalog",
    "pg_toast",
    "information_schema",
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

/// Validate a schema name: ASCII letters, digits and underscores, not starting
/// with a digit, at most 63 characters, and not a reserved name.
///
/// ```
/// use dissoc_db::validate_schema_name;
///
/// assert!(validate_schema_name("ns").is_ok());
/// assert!(validate_schema_name("ns; DROP SCHEMA ns").is_err());
/// ```
pub fn validate_schema_name(name: &str) -> Result<()> {
    let first = name
        .chars()
        .next()
        .ok_or_else(|| Error::InvalidInput("Schema name cannot be empty".to_string()))?;

    if name.len() > MAX_IDENTIFIER_LEN {
        return Err(Error::InvalidInput(format!(
            "Schema name exceeds {} character limit: {} characters",
            MAX_IDENTIFIER_LEN,
            name.len()
        )));
    }

    if !(first.is_ascii_alphabetic() || first == '_') {
        return Err(Error::InvalidInput(format!(
            "Schema name must start with a letter or underscore, found: '{}'",
            first
        )));
    }

    if let Some(bad) = name
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || *c == '_'))
    {
        return Err(Error::InvalidInput(format!(
            "Schema name contains invalid character: '{}'",
            bad
        )));
    }

    if RESERVED.contains(&name.to_ascii_lowercase().as_str()) {
        return Err(Error::InvalidInput(format!(
            "Schema name '{}' is reserved",
            name
        )));
    }

    Ok(())
}
