//! Repository layer abstractions and SQLite implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts for teams and children.
//! - Isolate SQL details from service/business orchestration.
//!
//! # Invariants
//! - Repositories trust pre-validated input; they only enforce uniqueness and
//!   referential rules that need storage state.
//! - "Not found" is a sentinel (`None`/`false`), never an error.
//! - Repositories refuse connections that have not been bootstrapped.

use crate::db::introspect::{table_exists, table_has_column, user_version};
use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::team::TeamId;
use chrono::NaiveDateTime;
use rusqlite::{ffi, Connection};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod child_repo;
pub mod team_repo;

pub(crate) const NOW_SQL: &str = "strftime('%Y-%m-%d %H:%M:%f', 'now')";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

pub type RepoResult<T> = Result<T, RepoError>;

/// Errors from team/child repository operations.
#[derive(Debug)]
pub enum RepoError {
    /// Underlying SQLite/bootstrap error.
    Db(DbError),
    /// Write collided with a unique column value.
    UniqueConstraintViolation { field: &'static str, value: String },
    /// Team delete refused while children still reference it.
    HasDependentChildren { team_id: TeamId, children: u32 },
    /// Child write pointed at a team that does not exist.
    UnknownTeam(TeamId),
    /// Connection schema is not at the expected bootstrapped version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
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
            Self::Db(err) => write!(f, "{err}"),
            Self::UniqueConstraintViolation { field, value } => {
                write!(f, "value `{value}` for `{field}` is already taken")
            }
            Self::HasDependentChildren { team_id, children } => write!(
                f,
                "team {team_id} still has {children} assigned children"
            ),
            Self::UnknownTeam(id) => write!(f, "team not found: {id}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => write!(f, "repository requires table `{table}`"),
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "repository requires column `{column}` in table `{table}`"
            ),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
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

/// Checks bootstrap version and required tables/columns on `conn`.
pub(crate) fn ensure_connection_ready(
    conn: &Connection,
    required: &[(&'static str, &[&'static str])],
) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version = user_version(conn)?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    for &(table, columns) in required {
        if !table_exists(conn, table)? {
            return Err(RepoError::MissingRequiredTable(table));
        }
        for &column in columns {
            if !table_has_column(conn, table, column)? {
                return Err(RepoError::MissingRequiredColumn { table, column });
            }
        }
    }

    Ok(())
}

pub(crate) fn parse_timestamp(value: &str, column: &str) -> RepoResult<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT)
        .map_err(|_| RepoError::InvalidData(format!("invalid timestamp `{value}` in {column}")))
}

pub(crate) fn parse_bool(value: i64, column: &str) -> RepoResult<bool> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(RepoError::InvalidData(format!(
            "invalid boolean value `{other}` in {column}"
        ))),
    }
}

pub(crate) fn is_unique_violation(err: &rusqlite::Error) -> bool {
    extended_code(err) == Some(ffi::SQLITE_CONSTRAINT_UNIQUE)
}

pub(crate) fn is_foreign_key_violation(err: &rusqlite::Error) -> bool {
    extended_code(err) == Some(ffi::SQLITE_CONSTRAINT_FOREIGNKEY)
}

fn extended_code(err: &rusqlite::Error) -> Option<i32> {
    match err {
        rusqlite::Error::SqliteFailure(inner, _) => Some(inner.extended_code),
        _ => None,
    }
}
