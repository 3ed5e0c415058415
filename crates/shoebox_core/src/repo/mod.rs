//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define record-store data access contracts, one repository per aggregate.
//! - Isolate SQLite query details from service/business orchestration.
//!
//! # Invariants
//! - Repository writes must run model `validate()` before persistence.
//! - Soft-delete visibility is always an explicit parameter on reads, never
//!   ambient query state.
//! - Repository APIs return semantic errors (`NotFound`,
//!   `ConstraintViolation`) in addition to DB transport errors.

use crate::db::{migrations, DbError};
use crate::model::{RecordId, RecordValidationError};
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod post_repo;
pub mod product_repo;
pub mod query;
pub mod task_repo;
pub mod user_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Generic repository error for record persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(RecordValidationError),
    Db(DbError),
    /// No matching row for a mutation target.
    NotFound {
        entity: &'static str,
        id: RecordId,
    },
    /// Unique or foreign-key constraint breach reported by the engine.
    ConstraintViolation {
        entity: &'static str,
        detail: String,
    },
    /// Filter/order column not in the table's allowed set.
    UnknownColumn {
        table: &'static str,
        column: String,
    },
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Required table is missing.
    MissingRequiredTable(&'static str),
    /// Required column is missing from expected table.
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
    /// Persisted data cannot be converted to a valid read model.
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound { entity, id } => write!(f, "{entity} not found: {id}"),
            Self::ConstraintViolation { entity, detail } => {
                write!(f, "{entity} constraint violation: {detail}")
            }
            Self::UnknownColumn { table, column } => {
                write!(f, "unknown column `{column}` for table `{table}`")
            }
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "record store requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "record store requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "record store requires column `{column}` in table `{table}`")
            }
            Self::InvalidData(message) => write!(f, "invalid persisted record data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RecordValidationError> for RepoError {
    fn from(value: RecordValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Row removal strategy for delete operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteMode {
    /// Set the deletion timestamp; the row stays in storage, hidden from
    /// default reads. Degrades to `Hard` on entities without a tombstone
    /// column.
    Soft,
    /// Remove the row permanently. The identifier is never reused.
    Hard,
}

/// Maps engine-level constraint failures on write paths to the semantic
/// `ConstraintViolation` variant; everything else stays a transport error.
pub(crate) fn write_error(entity: &'static str, err: rusqlite::Error) -> RepoError {
    match &err {
        rusqlite::Error::SqliteFailure(cause, message)
            if cause.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            RepoError::ConstraintViolation {
                entity,
                detail: message.clone().unwrap_or_else(|| cause.to_string()),
            }
        }
        _ => RepoError::from(err),
    }
}

/// Verifies the connection schema is at the version this binary expects.
pub(crate) fn ensure_schema_ready(conn: &Connection) -> RepoResult<()> {
    let actual: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    let expected = migrations::latest_version();
    if actual != expected {
        return Err(RepoError::UninitializedConnection {
            expected_version: expected,
            actual_version: actual,
        });
    }
    Ok(())
}

/// Verifies the table and its required columns exist on this connection.
pub(crate) fn ensure_table_ready(
    conn: &Connection,
    table: &'static str,
    columns: &[&'static str],
) -> RepoResult<()> {
    if !table_exists(conn, table)? {
        return Err(RepoError::MissingRequiredTable(table));
    }
    for column in columns {
        if !table_has_column(conn, table, column)? {
            return Err(RepoError::MissingRequiredColumn { table, column });
        }
    }
    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}

pub(crate) fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}
