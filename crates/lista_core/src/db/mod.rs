//! SQLite storage bootstrap and schema evolution entry points.
//!
//! # Responsibility
//! - Open and configure SQLite connections for the roster core.
//! - Bring `teams`/`children` up to the current shape before any query runs.
//!
//! # Invariants
//! - Schema version is stamped via `PRAGMA user_version`.
//! - Repositories must not read/write roster data before bootstrap succeeds.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub(crate) mod introspect;
pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory, open_db_with, OpenOptions};

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    /// Database file could not be opened or is not a SQLite database.
    Connection {
        path: PathBuf,
        source: rusqlite::Error,
    },
    /// A schema bootstrap/migration step failed; the whole batch was rolled back.
    Migration {
        step: &'static str,
        source: rusqlite::Error,
    },
    /// The file was written by a newer build than this one.
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
    Sqlite(rusqlite::Error),
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Connection { path, source } => {
                write!(f, "cannot open database `{}`: {source}", path.display())
            }
            Self::Migration { step, source } => {
                write!(f, "schema migration step `{step}` failed: {source}")
            }
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "database schema version {db_version} is newer than supported {latest_supported}"
            ),
            Self::Sqlite(err) => write!(f, "{err}"),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Connection { source, .. } => Some(source),
            Self::Migration { source, .. } => Some(source),
            Self::UnsupportedSchemaVersion { .. } => None,
            Self::Sqlite(err) => Some(err),
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
