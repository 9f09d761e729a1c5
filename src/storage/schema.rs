//! Namespace schema definitions
//!
//! Every namespace is a `WITHOUT ROWID` table keyed by `TEXT`, so SQLite's
//! default `BINARY` collation yields byte-wise key order.

use crate::storage::traits::{StoreError, StoreResult};
use rusqlite::{params, Connection};

/// Validates a namespace name so it can be used as a table identifier
pub fn check_namespace(namespace: &str) -> StoreResult<()> {
    let valid = !namespace.is_empty()
        && namespace
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidNamespace(namespace.to_string()))
    }
}

/// SQL creating a namespace table
pub fn create_namespace_sql(namespace: &str) -> String {
    format!(
        "CREATE TABLE IF NOT EXISTS \"{}\" (
            key TEXT PRIMARY KEY NOT NULL,
            value TEXT NOT NULL
        ) WITHOUT ROWID;",
        namespace
    )
}

/// Creates the namespace table if it does not exist yet
pub fn initialize_namespace(conn: &Connection, namespace: &str) -> StoreResult<()> {
    check_namespace(namespace)?;
    conn.execute_batch(&create_namespace_sql(namespace))?;
    Ok(())
}

/// Checks whether a namespace table exists
pub fn namespace_exists(conn: &Connection, namespace: &str) -> StoreResult<bool> {
    check_namespace(namespace)?;
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
        params![namespace],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}
