//! SQLite store implementation
//!
//! This module provides a SQLite-based implementation of the OrderedStore trait.

use crate::storage::import::{parse_rank_line, ImportReport};
use crate::storage::schema::{check_namespace, initialize_namespace, namespace_exists};
use crate::storage::traits::{OrderedStore, StoreError, StoreResult};
use rusqlite::{params, Connection};
use std::io::BufRead;
use std::ops::ControlFlow;
use std::path::Path;

/// SQLite store backend
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Opens (or creates) a store database file
    ///
    /// No namespace is created here: a crawl against a database that was
    /// never populated must fail on the missing namespace.
    pub fn open(path: &Path) -> StoreResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
            PRAGMA mmap_size = 268435456;
        ",
        )?;

        Ok(Self { conn })
    }

    /// Creates an in-memory store (for testing)
    pub fn open_in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self { conn })
    }

    /// Creates the namespace if it does not exist yet
    pub fn create_namespace(&self, namespace: &str) -> StoreResult<()> {
        initialize_namespace(&self.conn, namespace)
    }

    /// Inserts or replaces a single record
    pub fn put(&self, namespace: &str, key: &str, value: &str) -> StoreResult<()> {
        check_namespace(namespace)?;
        self.conn.execute(
            &format!(
                "INSERT OR REPLACE INTO \"{}\" (key, value) VALUES (?1, ?2)",
                namespace
            ),
            params![key, value],
        )?;
        Ok(())
    }

    /// Imports `rank,domain` lines into a namespace in a single transaction
    ///
    /// The namespace is created if needed. Invalid lines are skipped and
    /// counted; blank lines are ignored.
    pub fn import_ranks<R: BufRead>(
        &mut self,
        namespace: &str,
        reader: R,
    ) -> StoreResult<ImportReport> {
        initialize_namespace(&self.conn, namespace)?;

        let mut report = ImportReport::default();
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(&format!(
                "INSERT OR REPLACE INTO \"{}\" (key, value) VALUES (?1, ?2)",
                namespace
            ))?;

            for line in reader.lines() {
                let line = line?;
                if line.trim().is_empty() {
                    continue;
                }
                match parse_rank_line(&line) {
                    Some((rank, domain)) => {
                        stmt.execute(params![rank, domain])?;
                        report.imported += 1;
                    }
                    None => {
                        tracing::debug!("Skipping malformed rank line: {}", line);
                        report.skipped += 1;
                    }
                }
            }
        }
        tx.commit()?;

        Ok(report)
    }

    fn require_namespace(&self, namespace: &str) -> StoreResult<()> {
        if namespace_exists(&self.conn, namespace)? {
            Ok(())
        } else {
            Err(StoreError::MissingNamespace(namespace.to_string()))
        }
    }
}

impl OrderedStore for SqliteStore {
    fn has_namespace(&self, namespace: &str) -> StoreResult<bool> {
        namespace_exists(&self.conn, namespace)
    }

    fn for_each(
        &self,
        namespace: &str,
        visit: &mut dyn FnMut(&str, &str) -> ControlFlow<()>,
    ) -> StoreResult<()> {
        self.require_namespace(namespace)?;

        let mut stmt = self.conn.prepare(&format!(
            "SELECT key, value FROM \"{}\" ORDER BY key",
            namespace
        ))?;
        let mut rows = stmt.query([])?;

        while let Some(row) = rows.next()? {
            let key: String = row.get(0)?;
            let value: String = row.get(1)?;
            if visit(&key, &value).is_break() {
                break;
            }
        }

        Ok(())
    }

    fn count_from(&self, namespace: &str, threshold: &str) -> StoreResult<u64> {
        self.require_namespace(namespace)?;

        let count: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM \"{}\" WHERE key >= ?1", namespace),
            params![threshold],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }
}
