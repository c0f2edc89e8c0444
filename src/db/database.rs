// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Beacon Labs

//! Serialized façade over one embedded SQLite connection.
//!
//! ## Concurrency
//!
//! The connection handle is not safe for concurrent use, so every
//! `execute`/`query` call takes a process-wide mutex (the exclusion gate).
//! Statements from different callers are totally ordered by lock
//! acquisition; callers block until the gate is free. There is no bounded
//! wait: a caller that blocks on the gate waits indefinitely.
//! TODO: add an optional lock timeout surfaced as a StorageError.
//!
//! ## Parameter binding
//!
//! Parameters are bound by 1-based positional index against `:1`, `:2`, …
//! placeholders. Value kinds are the closed [`BindValue`] enum; see
//! [`crate::db::value`].

use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use rusqlite::types::ValueRef;
use rusqlite::{Connection, Statement};

use super::value::{BindValue, ColumnValue, Row};

/// Column type name prefix that forces boolean decoding regardless of the
/// storage-reported value type (case-insensitive).
const BOOL_DECL_PREFIX: &str = "bit";

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("statement has no placeholder :{0}")]
    MissingPlaceholder(usize),

    #[error("database path error: {0}")]
    Path(#[from] std::io::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// The single shared database handle.
///
/// One instance is opened at process start and closed exactly once at
/// shutdown. All access flows through [`Database::execute`] and
/// [`Database::query`].
#[derive(Debug)]
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open the database at `path`, resolving a symbolic link to its real
    /// target first.
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let path = path.as_ref();
        let real = resolve_symlink(path);

        // Ensure parent directory exists
        if let Some(parent) = real.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(&real)?;
        tracing::info!(path = %real.display(), "opened database");
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open an in-memory database. Test use only.
    #[cfg(test)]
    pub fn open_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Execute a statement with no result set (DDL/DML).
    pub fn execute(&self, statement: &str, args: &[BindValue]) -> StorageResult<()> {
        let conn = self.lock();
        tracing::debug!(sql = %render_statement(statement, args), "execute");
        let mut stmt = conn.prepare(statement)?;
        bind_args(&mut stmt, args)?;
        stmt.raw_execute()?;
        Ok(())
    }

    /// Run a query and decode its result rows.
    ///
    /// Returns `Ok(None)` when zero rows matched, so callers can
    /// distinguish "no result" from a present-but-empty sequence.
    pub fn query(&self, statement: &str, args: &[BindValue]) -> StorageResult<Option<Vec<Row>>> {
        let conn = self.lock();
        tracing::debug!(sql = %render_statement(statement, args), "query");
        let mut stmt = conn.prepare(statement)?;
        bind_args(&mut stmt, args)?;

        // Capture names and declared types up front; the row cursor below
        // holds a mutable borrow of the statement.
        let columns: Vec<(String, bool)> = stmt
            .columns()
            .iter()
            .map(|c| {
                let is_bool = c
                    .decl_type()
                    .is_some_and(|t| t.to_ascii_lowercase().starts_with(BOOL_DECL_PREFIX));
                (c.name().to_string(), is_bool)
            })
            .collect();

        let mut result = Vec::new();
        let mut rows = stmt.raw_query();
        while let Some(row) = rows.next()? {
            let mut map = Row::with_capacity(columns.len());
            for (i, (name, force_bool)) in columns.iter().enumerate() {
                if let Some(value) = decode_column(row.get_ref(i)?, *force_bool) {
                    map.insert(name.clone(), value);
                }
            }
            result.push(map);
        }

        Ok(if result.is_empty() {
            None
        } else {
            Some(result)
        })
    }

    /// Close the connection. Called once at process shutdown.
    pub fn close(self) -> StorageResult<()> {
        let conn = self
            .conn
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner);
        conn.close().map_err(|(_, e)| StorageError::Sqlite(e))?;
        tracing::info!("database closed");
        Ok(())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Connection> {
        // A poisoned gate only means another caller panicked mid-statement;
        // the connection itself is still usable.
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Resolve a symbolic link to its target, relative links against the
/// link's parent directory. Non-links pass through unchanged.
fn resolve_symlink(path: &Path) -> PathBuf {
    match std::fs::read_link(path) {
        Ok(target) if target.is_absolute() => target,
        Ok(target) => match path.parent() {
            Some(parent) => parent.join(target),
            None => target,
        },
        Err(_) => path.to_path_buf(),
    }
}

/// Bind `args` by 1-based positional index against `:N` placeholders.
fn bind_args(stmt: &mut Statement<'_>, args: &[BindValue]) -> StorageResult<()> {
    for (i, arg) in args.iter().enumerate() {
        let position = i + 1;
        let name = format!(":{position}");
        let index = stmt
            .parameter_index(&name)?
            .ok_or(StorageError::MissingPlaceholder(position))?;
        stmt.raw_bind_parameter(index, arg)?;
    }
    Ok(())
}

/// Decode one column value, omitting nulls (and value types outside the
/// supported set) by returning `None`.
fn decode_column(value: ValueRef<'_>, force_bool: bool) -> Option<ColumnValue> {
    if force_bool {
        // Declared-type override: `bit`-typed columns decode as boolean
        // even when the storage layer reports integer affinity.
        return match value {
            ValueRef::Integer(v) => Some(ColumnValue::Bool(v > 0)),
            ValueRef::Null => None,
            other => decode_raw(other),
        };
    }
    decode_raw(value)
}

fn decode_raw(value: ValueRef<'_>) -> Option<ColumnValue> {
    match value {
        ValueRef::Integer(v) => Some(ColumnValue::Int64(v)),
        ValueRef::Text(t) => Some(ColumnValue::Text(String::from_utf8_lossy(t).into_owned())),
        ValueRef::Null | ValueRef::Real(_) | ValueRef::Blob(_) => None,
    }
}

/// Render `statement` with placeholders substituted by literal argument
/// values for the debug log. Never affects binding or execution.
fn render_statement(statement: &str, args: &[BindValue]) -> String {
    let mut sql = statement.to_string();
    for (i, arg) in args.iter().enumerate() {
        sql = sql.replace(&format!(":{}", i + 1), &arg.render());
    }
    sql
}
